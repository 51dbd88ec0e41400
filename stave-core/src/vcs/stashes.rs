use super::revision::{Revision, RevisionId};

/// Stashed changesets, kept outside the history tree, plus one quick-stash
/// slot for temporary tool edits.
#[derive(Debug, Clone, Default)]
pub struct StashesRepository {
    stashes: Vec<Revision>,
    quick_stash: Option<Revision>,
}

impl StashesRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.stashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stashes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Revision> {
        self.stashes.iter()
    }

    pub fn get(&self, id: &RevisionId) -> Option<&Revision> {
        self.stashes.iter().find(|s| &s.id == id)
    }

    /// Newest stashes go first.
    pub fn add(&mut self, stash: Revision) {
        self.stashes.insert(0, stash);
    }

    pub(crate) fn push_back(&mut self, stash: Revision) {
        self.stashes.push(stash);
    }

    pub fn remove(&mut self, id: &RevisionId) -> Option<Revision> {
        let index = self.stashes.iter().position(|s| &s.id == id)?;
        Some(self.stashes.remove(index))
    }

    pub fn has_quick_stash(&self) -> bool {
        self.quick_stash.is_some()
    }

    pub fn quick_stash(&self) -> Option<&Revision> {
        self.quick_stash.as_ref()
    }

    /// Replaces any previous quick stash.
    pub fn set_quick_stash(&mut self, stash: Revision) {
        self.quick_stash = Some(stash);
    }

    pub fn take_quick_stash(&mut self) -> Option<Revision> {
        self.quick_stash.take()
    }
}
