use stave_types::{
    generate_id, AutomationEvent, Delta, DeltaDescription, DeltaOp, EventKind, Note, SerializedTree,
};

use crate::vcs::diff::properties::{property_payload, VALUE};
use crate::vcs::diff::track_deltas;
use crate::vcs::{item_types, TrackedItem};

use super::find_delta_data;
use super::sequence::EventSequence;

const PROPERTY_DELTAS: [&str; 4] = [
    track_deltas::TRACK_PATH,
    track_deltas::TRACK_COLOUR,
    track_deltas::TRACK_INSTRUMENT,
    track_deltas::TRACK_MUTE,
];

const DEFAULT_COLOUR: u32 = 0xff5a_7fd0;

#[derive(Debug, Clone, PartialEq)]
pub enum TrackSequence {
    Piano(EventSequence<Note>),
    Automation(EventSequence<AutomationEvent>),
}

impl TrackSequence {
    fn kind(&self) -> EventKind {
        match self {
            TrackSequence::Piano(_) => EventKind::Note,
            TrackSequence::Automation(_) => EventKind::Automation,
        }
    }
}

/// A MIDI track: notes or controller automation plus track properties.
#[derive(Debug, Clone, PartialEq)]
pub struct MidiTrack {
    id: String,
    pub name: String,
    pub colour: u32,
    pub instrument: String,
    pub mute: bool,
    pub sequence: TrackSequence,
}

impl MidiTrack {
    pub fn piano(name: impl Into<String>) -> Self {
        Self::with_sequence(generate_id(), name, TrackSequence::Piano(EventSequence::new()))
    }

    pub fn automation(name: impl Into<String>) -> Self {
        Self::with_sequence(generate_id(), name, TrackSequence::Automation(EventSequence::new()))
    }

    /// Empty track for an item type, or `None` if the type is not a track.
    pub fn for_type(vcs_type: &str, id: impl Into<String>) -> Option<Self> {
        let sequence = match vcs_type {
            item_types::PIANO_TRACK => TrackSequence::Piano(EventSequence::new()),
            item_types::AUTOMATION_TRACK => TrackSequence::Automation(EventSequence::new()),
            _ => return None,
        };
        Some(Self::with_sequence(id.into(), "", sequence))
    }

    fn with_sequence(id: String, name: impl Into<String>, sequence: TrackSequence) -> Self {
        Self {
            id,
            name: name.into(),
            colour: DEFAULT_COLOUR,
            instrument: String::new(),
            mute: false,
            sequence,
        }
    }

    pub fn notes_mut(&mut self) -> Option<&mut EventSequence<Note>> {
        match &mut self.sequence {
            TrackSequence::Piano(notes) => Some(notes),
            TrackSequence::Automation(_) => None,
        }
    }

    pub fn automation_mut(&mut self) -> Option<&mut EventSequence<AutomationEvent>> {
        match &mut self.sequence {
            TrackSequence::Automation(events) => Some(events),
            TrackSequence::Piano(_) => None,
        }
    }
}

impl TrackedItem for MidiTrack {
    fn vcs_id(&self) -> &str {
        &self.id
    }

    fn vcs_type(&self) -> &str {
        match self.sequence {
            TrackSequence::Piano(_) => item_types::PIANO_TRACK,
            TrackSequence::Automation(_) => item_types::AUTOMATION_TRACK,
        }
    }

    fn vcs_name(&self) -> String {
        self.name.clone()
    }

    fn num_deltas(&self) -> usize {
        PROPERTY_DELTAS.len() + 1
    }

    fn delta(&self, index: usize) -> Delta {
        match PROPERTY_DELTAS.get(index) {
            Some(&delta_type) => Delta::new(DeltaDescription::new(delta_type), delta_type),
            None => {
                let kind = self.sequence.kind();
                Delta::new(DeltaDescription::new(kind.noun()), kind.delta_type(DeltaOp::Added))
            }
        }
    }

    fn delta_data(&self, index: usize) -> SerializedTree {
        match PROPERTY_DELTAS.get(index) {
            Some(&track_deltas::TRACK_PATH) => {
                property_payload(track_deltas::TRACK_PATH, self.name.as_str())
            }
            Some(&track_deltas::TRACK_COLOUR) => {
                property_payload(track_deltas::TRACK_COLOUR, self.colour)
            }
            Some(&track_deltas::TRACK_INSTRUMENT) => {
                property_payload(track_deltas::TRACK_INSTRUMENT, self.instrument.as_str())
            }
            Some(&delta_type) => property_payload(delta_type, self.mute),
            None => {
                let tag = self.sequence.kind().delta_type(DeltaOp::Added);
                match &self.sequence {
                    TrackSequence::Piano(notes) => notes.serialize(tag),
                    TrackSequence::Automation(events) => events.serialize(tag),
                }
            }
        }
    }

    fn reset_state_to(&mut self, state: &dyn TrackedItem) {
        let property = |delta_type: &str| find_delta_data(state, delta_type);

        self.name = property(track_deltas::TRACK_PATH)
            .map(|d| d.get_string(VALUE, ""))
            .unwrap_or_else(|| state.vcs_name());
        self.colour = property(track_deltas::TRACK_COLOUR)
            .map(|d| d.get_int64(VALUE, DEFAULT_COLOUR as i64) as u32)
            .unwrap_or(DEFAULT_COLOUR);
        self.instrument = property(track_deltas::TRACK_INSTRUMENT)
            .map(|d| d.get_string(VALUE, ""))
            .unwrap_or_default();
        self.mute = property(track_deltas::TRACK_MUTE)
            .map(|d| d.get_bool(VALUE, false))
            .unwrap_or(false);

        let events = property(self.sequence.kind().delta_type(DeltaOp::Added));
        match &mut self.sequence {
            TrackSequence::Piano(notes) => notes.reset_from(events.as_ref()),
            TrackSequence::Automation(auto) => auto.reset_from(events.as_ref()),
        }
    }
}
