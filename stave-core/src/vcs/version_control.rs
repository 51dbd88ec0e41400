use std::sync::mpsc::Sender;

use crate::config::VcsSettings;
use crate::error::VcsResult;
use crate::persistence::Pack;

use super::diff::diff_logic_for;
use super::head::{self, Head};
use super::revision::{ItemStatus, Revision, RevisionId, RevisionItem, RevisionTree, SubtreeNode};
use super::stashes::StashesRepository;
use super::tracked::{ItemSnapshot, TrackedItem, TrackedItemsSource};

/// Sent after every operation that changes history or live items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsNotification {
    StateChanged,
}

/// History of one project: revision tree, head, and stashes.
///
/// Operations that select items take indices into [`VersionControl::head_diff`]
/// computed against the same `source`.
pub struct VersionControl {
    tree: RevisionTree,
    head: Head,
    stashes: StashesRepository,
    settings: VcsSettings,
    notifier: Option<Sender<VcsNotification>>,
}

impl VersionControl {
    /// Fresh history with an empty root revision.
    pub fn new(settings: VcsSettings) -> Self {
        let root = Revision::new(
            settings.initial_commit_message.clone(),
            settings.author.clone(),
            Vec::new(),
        );
        let tree = RevisionTree::new(root);
        let head = Head::new(&tree);
        Self {
            tree,
            head,
            stashes: StashesRepository::new(),
            settings,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, tx: Sender<VcsNotification>) -> Self {
        self.notifier = Some(tx);
        self
    }

    pub fn from_pack(pack: Pack, settings: VcsSettings) -> Self {
        let Pack {
            tree,
            head: head_id,
            stashes,
        } = pack;
        let mut head = Head::new(&tree);
        if !head.move_to(&tree, &head_id) {
            log::warn!(target: "vcs", "pack head {} not in tree, using root", head_id);
        }
        Self {
            tree,
            head,
            stashes,
            settings,
            notifier: None,
        }
    }

    pub fn to_pack(&self) -> Pack {
        Pack {
            tree: self.tree.clone(),
            head: self.head.revision().clone(),
            stashes: self.stashes.clone(),
        }
    }

    pub fn tree(&self) -> &RevisionTree {
        &self.tree
    }

    pub fn root(&self) -> &Revision {
        self.tree.root()
    }

    pub fn revision(&self, id: &RevisionId) -> Option<&Revision> {
        self.tree.get(id)
    }

    pub fn children(&self, id: &RevisionId) -> Vec<&Revision> {
        self.tree.children(id)
    }

    pub fn path_to(&self, id: &RevisionId) -> Vec<&Revision> {
        self.tree.path_to(id)
    }

    pub fn head(&self) -> &Head {
        &self.head
    }

    pub fn stashes(&self) -> &StashesRepository {
        &self.stashes
    }

    pub fn settings(&self) -> &VcsSettings {
        &self.settings
    }

    fn notify(&self) {
        if let Some(tx) = &self.notifier {
            let _ = tx.send(VcsNotification::StateChanged);
        }
    }

    // ============================================================
    // Inspection
    // ============================================================

    /// Uncommitted changes of `source` relative to head.
    pub fn head_diff(&self, source: &dyn TrackedItemsSource) -> Vec<RevisionItem> {
        self.head.diff(source)
    }

    pub fn has_changes(&self, source: &dyn TrackedItemsSource) -> bool {
        self.head.has_changes(source)
    }

    // ============================================================
    // History
    // ============================================================

    /// Move head without touching live items.
    pub fn move_head(&mut self, id: &RevisionId) -> bool {
        if !self.head.move_to(&self.tree, id) {
            log::debug!(target: "vcs", "move head: revision {} not found", id);
            return false;
        }
        self.notify();
        true
    }

    /// Reset every live item to its state at `id` and move head there.
    /// Uncommitted changes are discarded.
    pub fn checkout(&mut self, id: &RevisionId, source: &mut dyn TrackedItemsSource) -> bool {
        let Some(state) = head::state_at(&self.tree, id) else {
            log::debug!(target: "vcs", "checkout: revision {} not found", id);
            return false;
        };

        let stale: Vec<String> = (0..source.num_tracked_items())
            .filter_map(|i| source.tracked_item(i))
            .map(|item| item.vcs_id().to_string())
            .filter(|live_id| !state.iter().any(|s| &s.id == live_id))
            .collect();
        for live_id in stale {
            source.delete_tracked_item(&live_id);
        }
        for item in &state {
            restore_item(source, item);
        }

        self.head.move_to(&self.tree, id);
        log::info!(target: "vcs", "checked out {}", id);
        self.notify();
        true
    }

    /// Reset only `item_ids` to their state at `id`; head stays put and
    /// other items are untouched. An item absent at `id` is deleted.
    pub fn cherry_pick(
        &mut self,
        id: &RevisionId,
        item_ids: &[String],
        source: &mut dyn TrackedItemsSource,
    ) -> bool {
        let Some(state) = head::state_at(&self.tree, id) else {
            log::debug!(target: "vcs", "cherry-pick: revision {} not found", id);
            return false;
        };

        for item_id in item_ids {
            match state.iter().find(|s| &s.id == item_id) {
                Some(item) => restore_item(source, item),
                None => {
                    source.delete_tracked_item(item_id);
                }
            }
        }

        log::info!(target: "vcs", "cherry-picked {} item(s) from {}", item_ids.len(), id);
        self.notify();
        true
    }

    /// Graft a revision subtree received from elsewhere under `parent`.
    pub fn append_subtree(&mut self, subtree: SubtreeNode, parent: &RevisionId) -> VcsResult<()> {
        let added = self.tree.graft(parent, subtree)?;
        log::info!(target: "vcs", "appended {} revision(s) under {}", added, parent);
        if added > 0 {
            self.notify();
        }
        Ok(())
    }

    /// Revert the selected uncommitted changes to head state. Returns `false`
    /// if no selected item could be reverted.
    pub fn reset_changes(
        &mut self,
        selected: &[usize],
        source: &mut dyn TrackedItemsSource,
    ) -> bool {
        let changes = self.head_diff(source);
        let picked = pick(&changes, selected);
        let reverted = picked.iter().filter(|item| self.reset_item(item, source)).count();
        if reverted == 0 {
            return false;
        }
        log::debug!(target: "vcs", "reset {} of {} item(s)", reverted, picked.len());
        self.notify();
        true
    }

    pub fn reset_all_changes(&mut self, source: &mut dyn TrackedItemsSource) -> bool {
        let all: Vec<usize> = (0..self.head_diff(source).len()).collect();
        self.reset_changes(&all, source)
    }

    /// An added item the source refuses to delete is emptied instead.
    fn reset_item(&self, item: &RevisionItem, source: &mut dyn TrackedItemsSource) -> bool {
        match item.status {
            ItemStatus::Added => {
                if source.delete_tracked_item(item.id()) {
                    return true;
                }
                match source.find_tracked_item_mut(item.id()) {
                    Some(live) => {
                        live.reset_state_to(&item.snapshot.empty_copy());
                        true
                    }
                    None => false,
                }
            }
            ItemStatus::Changed | ItemStatus::Removed => match self.head.item_state(item.id()) {
                Some(state) => {
                    restore_item(source, state);
                    true
                }
                None => false,
            },
        }
    }

    /// Commit the selected changes as a child of head and move head to it.
    /// Returns `None` when nothing selected actually changed.
    pub fn commit(
        &mut self,
        selected: &[usize],
        message: &str,
        source: &dyn TrackedItemsSource,
    ) -> Option<RevisionId> {
        let changes = self.head_diff(source);
        let items = pick(&changes, selected);
        if items.is_empty() {
            log::debug!(target: "vcs", "commit: nothing to commit");
            return None;
        }

        let revision = Revision::new(message, self.settings.author.clone(), items.clone());
        let id = revision.id.clone();
        if let Err(e) = self.tree.append(self.head.revision(), revision) {
            log::error!(target: "vcs", "commit failed: {}", e);
            return None;
        }
        self.head.advance(id.clone(), &items);

        log::info!(target: "vcs", "committed {} \"{}\" ({} item(s))", id, message, items.len());
        self.notify();
        Some(id)
    }

    /// Record the full state of `item` in the head revision itself, e.g.
    /// for items that exist from the moment a project is created.
    pub fn quick_amend_item(&mut self, item: &dyn TrackedItem) {
        let amended = RevisionItem::new(ItemStatus::Added, item.snapshot());
        let head_id = self.head.revision().clone();
        if let Some(items) = self.tree.items_mut(&head_id) {
            match items.iter().position(|i| i.id() == amended.id()) {
                Some(p) => items[p] = amended.clone(),
                None => items.push(amended.clone()),
            }
        }
        self.head.amend(std::slice::from_ref(&amended));
        log::debug!(target: "vcs", "amended {} into {}", item.vcs_id(), head_id);
    }

    // ============================================================
    // Stashes
    // ============================================================

    /// Store the selected changes as a stash. Unless `keep_changes`, the
    /// stashed items are reset to head state.
    pub fn stash(
        &mut self,
        selected: &[usize],
        message: &str,
        keep_changes: bool,
        source: &mut dyn TrackedItemsSource,
    ) -> Option<RevisionId> {
        let changes = self.head_diff(source);
        let items = pick(&changes, selected);
        if items.is_empty() {
            return None;
        }

        let stash = Revision::new(message, self.settings.author.clone(), items.clone());
        let id = stash.id.clone();
        self.stashes.add(stash);

        if !keep_changes {
            for item in &items {
                self.reset_item(item, source);
            }
        }

        log::info!(target: "vcs", "stashed {} \"{}\" ({} item(s))", id, message, items.len());
        self.notify();
        Some(id)
    }

    /// Merge a stash onto the live items. Unless `keep_stash`, it is removed.
    pub fn apply_stash(
        &mut self,
        id: &RevisionId,
        keep_stash: bool,
        source: &mut dyn TrackedItemsSource,
    ) -> bool {
        let stash = match self.stashes.get(id) {
            Some(stash) => stash.clone(),
            None => {
                log::debug!(target: "vcs", "apply stash: {} not found", id);
                return false;
            }
        };

        apply_items(&stash.items, source);
        if !keep_stash {
            self.stashes.remove(id);
        }

        log::info!(target: "vcs", "applied stash {} \"{}\"", id, stash.message);
        self.notify();
        true
    }

    pub fn has_quick_stash(&self) -> bool {
        self.stashes.has_quick_stash()
    }

    /// Stash every change into the quick-stash slot and reset to head.
    pub fn quick_stash_all(&mut self, source: &mut dyn TrackedItemsSource) -> bool {
        let items = self.head_diff(source);
        if items.is_empty() {
            return false;
        }

        let stash = Revision::new(
            self.settings.quick_stash_message.clone(),
            self.settings.author.clone(),
            items.clone(),
        );
        self.stashes.set_quick_stash(stash);
        for item in &items {
            self.reset_item(item, source);
        }

        log::debug!(target: "vcs", "quick-stashed {} item(s)", items.len());
        self.notify();
        true
    }

    /// Re-apply and clear the quick stash.
    pub fn apply_quick_stash(&mut self, source: &mut dyn TrackedItemsSource) -> bool {
        let Some(stash) = self.stashes.take_quick_stash() else {
            return false;
        };
        apply_items(&stash.items, source);
        log::debug!(target: "vcs", "applied quick stash");
        self.notify();
        true
    }
}

fn pick(changes: &[RevisionItem], selected: &[usize]) -> Vec<RevisionItem> {
    let mut indices: Vec<usize> = selected.iter().copied().filter(|&i| i < changes.len()).collect();
    indices.sort_unstable();
    indices.dedup();
    indices.into_iter().map(|i| changes[i].clone()).collect()
}

/// Make the live item `state.id` hold exactly `state`, creating it if needed.
fn restore_item(source: &mut dyn TrackedItemsSource, state: &ItemSnapshot) {
    match source.find_tracked_item_mut(&state.id) {
        Some(live) => live.reset_state_to(state),
        None => {
            if !source.init_tracked_item(&state.vcs_type, &state.id, state) {
                log::warn!(
                    target: "vcs",
                    "cannot create item {} of type {}",
                    state.id,
                    state.vcs_type
                );
            }
        }
    }
}

/// Merge stashed items onto the live items.
fn apply_items(items: &[RevisionItem], source: &mut dyn TrackedItemsSource) {
    for item in items {
        match item.status {
            ItemStatus::Added => restore_item(source, &item.snapshot),
            ItemStatus::Removed => {
                source.delete_tracked_item(item.id());
            }
            ItemStatus::Changed => {
                let base = match source.find_tracked_item(item.id()) {
                    Some(live) => live.snapshot(),
                    None => item.snapshot.empty_copy(),
                };
                let merged = diff_logic_for(&item.snapshot.vcs_type)
                    .create_merged_item(&item.snapshot, &base);
                let state = item.snapshot.empty_copy().with_deltas(merged.into_deltas());
                restore_item(source, &state);
            }
        }
    }
}
