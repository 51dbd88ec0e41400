//! The capability the history engine consumes from document objects.

use stave_types::{Delta, DeltaDiff, SerializedTree};

/// Tracked-item type identifiers. Each selects a diff logic strategy.
pub mod item_types {
    pub const PROJECT_TIMELINE: &str = "ProjectTimeline";
    pub const PROJECT_INFO: &str = "ProjectInfo";
    pub const PIANO_TRACK: &str = "PianoTrack";
    pub const AUTOMATION_TRACK: &str = "AutomationTrack";
}

/// Anything that can report its state as a list of typed deltas.
///
/// Implementers must keep delta order stable within one logical snapshot,
/// and `index` must be below [`TrackedItem::num_deltas`].
pub trait TrackedItem {
    /// Stable identifier, unique within a project.
    fn vcs_id(&self) -> &str;
    /// One of [`item_types`]; selects the diff logic.
    fn vcs_type(&self) -> &str;
    /// Display name.
    fn vcs_name(&self) -> String;

    fn num_deltas(&self) -> usize;
    fn delta(&self, index: usize) -> Delta;
    fn delta_data(&self, index: usize) -> SerializedTree;

    /// Replace this item's content with the full state described by `state`.
    fn reset_state_to(&mut self, state: &dyn TrackedItem);

    /// Owned copy of the item's current deltas.
    fn snapshot(&self) -> ItemSnapshot {
        ItemSnapshot {
            id: self.vcs_id().to_string(),
            vcs_type: self.vcs_type().to_string(),
            name: self.vcs_name(),
            deltas: (0..self.num_deltas())
                .map(|i| DeltaDiff::new(self.delta(i), self.delta_data(i)))
                .collect(),
        }
    }
}

/// The document side: the set of live tracked items of a project.
pub trait TrackedItemsSource {
    fn num_tracked_items(&self) -> usize;
    fn tracked_item(&self, index: usize) -> Option<&dyn TrackedItem>;
    fn find_tracked_item_mut(&mut self, id: &str) -> Option<&mut dyn TrackedItem>;

    /// Create an item of `vcs_type` with the given id and content.
    /// Returns `false` if the source cannot host such an item.
    fn init_tracked_item(&mut self, vcs_type: &str, id: &str, state: &dyn TrackedItem) -> bool;

    fn delete_tracked_item(&mut self, id: &str) -> bool;

    fn find_tracked_item(&self, id: &str) -> Option<&dyn TrackedItem> {
        (0..self.num_tracked_items())
            .filter_map(|i| self.tracked_item(i))
            .find(|item| item.vcs_id() == id)
    }
}

/// Detached copy of a tracked item: used for revision items, head state,
/// stashes, and diffs.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSnapshot {
    pub id: String,
    pub vcs_type: String,
    pub name: String,
    pub deltas: Vec<DeltaDiff>,
}

impl ItemSnapshot {
    pub fn new(
        id: impl Into<String>,
        vcs_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            vcs_type: vcs_type.into(),
            name: name.into(),
            deltas: Vec::new(),
        }
    }

    pub fn with_deltas(mut self, deltas: Vec<DeltaDiff>) -> Self {
        self.deltas = deltas;
        self
    }

    /// Same id, type and name, no deltas.
    pub fn empty_copy(&self) -> Self {
        Self::new(self.id.as_str(), self.vcs_type.as_str(), self.name.as_str())
    }

    pub fn delta_of_type(&self, delta_type: &str) -> Option<&DeltaDiff> {
        self.deltas.iter().find(|d| d.delta.has_type(delta_type))
    }

    /// Same id, type and pairwise-equivalent deltas.
    pub fn is_equivalent_to(&self, other: &ItemSnapshot) -> bool {
        self.id == other.id
            && self.vcs_type == other.vcs_type
            && self.deltas.len() == other.deltas.len()
            && self
                .deltas
                .iter()
                .zip(other.deltas.iter())
                .all(|(a, b)| a.is_equivalent_to(b))
    }
}

impl TrackedItem for ItemSnapshot {
    fn vcs_id(&self) -> &str {
        &self.id
    }

    fn vcs_type(&self) -> &str {
        &self.vcs_type
    }

    fn vcs_name(&self) -> String {
        self.name.clone()
    }

    fn num_deltas(&self) -> usize {
        self.deltas.len()
    }

    fn delta(&self, index: usize) -> Delta {
        self.deltas[index].delta.clone()
    }

    fn delta_data(&self, index: usize) -> SerializedTree {
        self.deltas[index].data.clone()
    }

    fn reset_state_to(&mut self, state: &dyn TrackedItem) {
        self.name = state.vcs_name();
        self.deltas = (0..state.num_deltas())
            .map(|i| DeltaDiff::new(state.delta(i), state.delta_data(i)))
            .collect();
    }

    fn snapshot(&self) -> ItemSnapshot {
        self.clone()
    }
}
