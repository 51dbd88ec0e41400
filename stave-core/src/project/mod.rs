//! Live document objects that act as tracked items: project metadata, the
//! timeline, and MIDI tracks.

mod info;
mod sequence;
mod timeline;
mod track;

pub use info::ProjectInfo;
pub use sequence::EventSequence;
pub use timeline::ProjectTimeline;
pub use track::{MidiTrack, TrackSequence};

use stave_types::{generate_id, SerializedTree};

use crate::vcs::{item_types, TrackedItem, TrackedItemsSource};

/// Payload of the first delta of `delta_type` in `state`.
pub(crate) fn find_delta_data(state: &dyn TrackedItem, delta_type: &str) -> Option<SerializedTree> {
    (0..state.num_deltas())
        .find(|&i| state.delta(i).has_type(delta_type))
        .map(|i| state.delta_data(i))
}

/// A project document: one info item, one timeline, any number of tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub info: ProjectInfo,
    pub timeline: ProjectTimeline,
    tracks: Vec<MidiTrack>,
}

impl Project {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            info: ProjectInfo::new(title),
            timeline: ProjectTimeline::new(generate_id()),
            tracks: Vec::new(),
        }
    }

    pub fn tracks(&self) -> &[MidiTrack] {
        &self.tracks
    }

    /// Returns the new track's id.
    pub fn add_track(&mut self, track: MidiTrack) -> String {
        let id = track.vcs_id().to_string();
        self.tracks.push(track);
        id
    }

    pub fn track(&self, id: &str) -> Option<&MidiTrack> {
        self.tracks.iter().find(|t| t.vcs_id() == id)
    }

    pub fn track_mut(&mut self, id: &str) -> Option<&mut MidiTrack> {
        self.tracks.iter_mut().find(|t| t.vcs_id() == id)
    }

    pub fn remove_track(&mut self, id: &str) -> Option<MidiTrack> {
        let index = self.tracks.iter().position(|t| t.vcs_id() == id)?;
        Some(self.tracks.remove(index))
    }
}

impl TrackedItemsSource for Project {
    fn num_tracked_items(&self) -> usize {
        2 + self.tracks.len()
    }

    fn tracked_item(&self, index: usize) -> Option<&dyn TrackedItem> {
        match index {
            0 => Some(&self.info),
            1 => Some(&self.timeline),
            i => self.tracks.get(i - 2).map(|t| t as &dyn TrackedItem),
        }
    }

    fn find_tracked_item_mut(&mut self, id: &str) -> Option<&mut dyn TrackedItem> {
        if self.info.vcs_id() == id {
            return Some(&mut self.info);
        }
        if self.timeline.vcs_id() == id {
            return Some(&mut self.timeline);
        }
        self.tracks
            .iter_mut()
            .find(|t| t.vcs_id() == id)
            .map(|t| t as &mut dyn TrackedItem)
    }

    fn init_tracked_item(&mut self, vcs_type: &str, id: &str, state: &dyn TrackedItem) -> bool {
        match vcs_type {
            // singletons: a different id means history from another lineage replaces ours
            item_types::PROJECT_INFO => {
                let mut info = ProjectInfo::with_id(id, "");
                info.reset_state_to(state);
                self.info = info;
                true
            }
            item_types::PROJECT_TIMELINE => {
                let mut timeline = ProjectTimeline::new(id);
                timeline.reset_state_to(state);
                self.timeline = timeline;
                true
            }
            _ => match MidiTrack::for_type(vcs_type, id) {
                Some(mut track) => {
                    track.reset_state_to(state);
                    self.tracks.push(track);
                    true
                }
                None => false,
            },
        }
    }

    fn delete_tracked_item(&mut self, id: &str) -> bool {
        if self.remove_track(id).is_some() {
            return true;
        }
        if self.info.vcs_id() == id || self.timeline.vcs_id() == id {
            log::debug!(target: "vcs", "item {} is a project singleton, not deleting", id);
        }
        false
    }
}
