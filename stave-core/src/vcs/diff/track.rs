use stave_types::EventKind;

use super::properties::PropertyDelta;
use super::{DiffLogic, DiffSchema};
use crate::vcs::tracked::item_types;

/// Delta types shared by every MIDI track.
pub mod track_deltas {
    pub const TRACK_PATH: &str = "trackPath";
    pub const TRACK_COLOUR: &str = "trackColour";
    pub const TRACK_INSTRUMENT: &str = "trackInstrument";
    pub const TRACK_MUTE: &str = "trackMute";
}

const TRACK_PROPERTIES: &[PropertyDelta] = &[
    PropertyDelta {
        delta_type: track_deltas::TRACK_PATH,
        description: "renamed track",
    },
    PropertyDelta {
        delta_type: track_deltas::TRACK_COLOUR,
        description: "changed track colour",
    },
    PropertyDelta {
        delta_type: track_deltas::TRACK_INSTRUMENT,
        description: "changed instrument",
    },
    PropertyDelta {
        delta_type: track_deltas::TRACK_MUTE,
        description: "toggled mute",
    },
];

/// Notes plus track properties.
pub struct PianoTrackDiffLogic;

static PIANO_SCHEMA: DiffSchema = DiffSchema {
    event_kinds: &[EventKind::Note],
    properties: TRACK_PROPERTIES,
};

impl DiffLogic for PianoTrackDiffLogic {
    fn vcs_type(&self) -> &'static str {
        item_types::PIANO_TRACK
    }

    fn schema(&self) -> &'static DiffSchema {
        &PIANO_SCHEMA
    }
}

/// Controller events plus track properties.
pub struct AutomationTrackDiffLogic;

static AUTOMATION_SCHEMA: DiffSchema = DiffSchema {
    event_kinds: &[EventKind::Automation],
    properties: TRACK_PROPERTIES,
};

impl DiffLogic for AutomationTrackDiffLogic {
    fn vcs_type(&self) -> &'static str {
        item_types::AUTOMATION_TRACK
    }

    fn schema(&self) -> &'static DiffSchema {
        &AUTOMATION_SCHEMA
    }
}
