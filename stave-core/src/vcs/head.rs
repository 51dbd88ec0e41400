//! The checked-out revision and the cumulative item state it stands for.

use super::diff::diff_logic_for;
use super::revision::{ItemStatus, RevisionId, RevisionItem, RevisionTree};
use super::tracked::{ItemSnapshot, TrackedItem, TrackedItemsSource};

#[derive(Debug, Clone)]
pub struct Head {
    revision: RevisionId,
    /// Full state of every item as of `revision`.
    state: Vec<ItemSnapshot>,
}

impl Head {
    /// Head at the root of `tree`.
    pub fn new(tree: &RevisionTree) -> Self {
        let root = tree.root();
        let mut state = Vec::new();
        merge_state_with(&mut state, &root.items);
        Self {
            revision: root.id.clone(),
            state,
        }
    }

    pub fn revision(&self) -> &RevisionId {
        &self.revision
    }

    pub fn state(&self) -> &[ItemSnapshot] {
        &self.state
    }

    pub fn item_state(&self, id: &str) -> Option<&ItemSnapshot> {
        self.state.iter().find(|item| item.id == id)
    }

    /// Point at `id` and rebuild the state by replaying root to `id`.
    /// Returns `false` if the revision is unknown.
    pub fn move_to(&mut self, tree: &RevisionTree, id: &RevisionId) -> bool {
        match state_at(tree, id) {
            Some(state) => {
                self.revision = id.clone();
                self.state = state;
                true
            }
            None => false,
        }
    }

    /// Advance to a child revision whose items were just committed on top
    /// of the current state.
    pub(crate) fn advance(&mut self, id: RevisionId, items: &[RevisionItem]) {
        merge_state_with(&mut self.state, items);
        self.revision = id;
    }

    /// Fold extra items into the current state without moving.
    pub(crate) fn amend(&mut self, items: &[RevisionItem]) {
        merge_state_with(&mut self.state, items);
    }

    /// Uncommitted changes of `source` relative to this head: live items
    /// that differ or are new, then head items missing from `source`.
    pub fn diff(&self, source: &dyn TrackedItemsSource) -> Vec<RevisionItem> {
        let mut result = Vec::new();

        for i in 0..source.num_tracked_items() {
            let Some(live) = source.tracked_item(i) else {
                continue;
            };
            match self.item_state(live.vcs_id()) {
                Some(state) => {
                    let diff = diff_logic_for(live.vcs_type()).create_diff(live, state);
                    if !diff.is_empty() {
                        let snapshot =
                            ItemSnapshot::new(live.vcs_id(), live.vcs_type(), live.vcs_name())
                                .with_deltas(diff.into_deltas());
                        result.push(RevisionItem::new(ItemStatus::Changed, snapshot));
                    }
                }
                None => result.push(RevisionItem::new(ItemStatus::Added, live.snapshot())),
            }
        }

        for state in &self.state {
            if source.find_tracked_item(&state.id).is_none() {
                result.push(RevisionItem::new(ItemStatus::Removed, state.clone()));
            }
        }

        result
    }

    pub fn has_changes(&self, source: &dyn TrackedItemsSource) -> bool {
        !self.diff(source).is_empty()
    }
}

/// Full item state as of revision `id`, or `None` if it is not in `tree`.
pub fn state_at(tree: &RevisionTree, id: &RevisionId) -> Option<Vec<ItemSnapshot>> {
    let path = tree.path_to(id);
    if path.is_empty() {
        return None;
    }
    let mut state = Vec::new();
    for revision in path {
        merge_state_with(&mut state, &revision.items);
    }
    Some(state)
}

/// Apply one revision's items on top of a full state.
pub(crate) fn merge_state_with(state: &mut Vec<ItemSnapshot>, items: &[RevisionItem]) {
    for item in items {
        let position = state.iter().position(|s| s.id == item.id());
        match item.status {
            ItemStatus::Added => match position {
                Some(p) => state[p] = item.snapshot.clone(),
                None => state.push(item.snapshot.clone()),
            },
            ItemStatus::Changed => {
                let base = match position {
                    Some(p) => state[p].clone(),
                    None => {
                        log::debug!(
                            target: "vcs",
                            "changed item {} has no prior state, merging from empty",
                            item.id()
                        );
                        item.snapshot.empty_copy()
                    }
                };
                let merged = diff_logic_for(&item.snapshot.vcs_type)
                    .create_merged_item(&item.snapshot, &base);
                let snapshot = item.snapshot.empty_copy().with_deltas(merged.into_deltas());
                match position {
                    Some(p) => state[p] = snapshot,
                    None => state.push(snapshot),
                }
            }
            ItemStatus::Removed => {
                if let Some(p) = position {
                    state.remove(p);
                }
            }
        }
    }
}
