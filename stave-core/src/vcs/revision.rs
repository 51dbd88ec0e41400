//! Revisions and the history tree that owns them.
//!
//! Revisions live in an arena; parent and child links are indices into it,
//! so the tree never owns a node twice and parent links are non-owning.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{VcsError, VcsResult};

use super::tracked::ItemSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RevisionId(String);

impl RevisionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RevisionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RevisionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a tracked item relates to the state of the parent revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    /// New item; the snapshot is its full state.
    Added,
    /// The snapshot holds diff deltas against the parent state.
    Changed,
    /// Item deleted; the snapshot holds its last known state.
    Removed,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Added => "added",
            ItemStatus::Changed => "changed",
            ItemStatus::Removed => "removed",
        }
    }

    pub fn parse(s: &str) -> Option<ItemStatus> {
        match s {
            "added" => Some(ItemStatus::Added),
            "changed" => Some(ItemStatus::Changed),
            "removed" => Some(ItemStatus::Removed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevisionItem {
    pub status: ItemStatus,
    pub snapshot: ItemSnapshot,
}

impl RevisionItem {
    pub fn new(status: ItemStatus, snapshot: ItemSnapshot) -> Self {
        Self { status, snapshot }
    }

    pub fn id(&self) -> &str {
        &self.snapshot.id
    }
}

/// One committed changeset, or a stash.
#[derive(Debug, Clone, PartialEq)]
pub struct Revision {
    pub id: RevisionId,
    pub message: String,
    pub author: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub items: Vec<RevisionItem>,
}

impl Revision {
    pub fn new(
        message: impl Into<String>,
        author: impl Into<String>,
        items: Vec<RevisionItem>,
    ) -> Self {
        Self {
            id: RevisionId::generate(),
            message: message.into(),
            author: author.into(),
            timestamp: now_millis(),
            items,
        }
    }

    pub fn item(&self, id: &str) -> Option<&RevisionItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[derive(Debug, Clone)]
struct Node {
    revision: Revision,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Detached copy of a revision and its descendants, as exchanged with
/// other replicas.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtreeNode {
    pub revision: Revision,
    pub children: Vec<SubtreeNode>,
}

impl SubtreeNode {
    pub fn leaf(revision: Revision) -> Self {
        Self {
            revision,
            children: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        1 + self.children.iter().map(SubtreeNode::len).sum::<usize>()
    }
}

/// Rooted history tree. Nodes are appended, never removed.
#[derive(Debug, Clone)]
pub struct RevisionTree {
    nodes: Vec<Node>,
    index: HashMap<RevisionId, usize>,
}

impl RevisionTree {
    pub fn new(root: Revision) -> Self {
        let mut index = HashMap::new();
        index.insert(root.id.clone(), 0);
        Self {
            nodes: vec![Node {
                revision: root,
                parent: None,
                children: Vec::new(),
            }],
            index,
        }
    }

    /// Build a tree from a detached root. Fails on repeated ids.
    pub fn from_subtree(root: SubtreeNode) -> VcsResult<Self> {
        let SubtreeNode { revision, children } = root;
        let mut tree = Self::new(revision);
        let mut pending: Vec<(RevisionId, SubtreeNode)> = children
            .into_iter()
            .rev()
            .map(|c| (tree.root().id.clone(), c))
            .collect();

        while let Some((parent, node)) = pending.pop() {
            let SubtreeNode { revision, children } = node;
            let id = revision.id.clone();
            tree.append(&parent, revision)?;
            pending.extend(children.into_iter().rev().map(|c| (id.clone(), c)));
        }
        Ok(tree)
    }

    pub fn root(&self) -> &Revision {
        &self.nodes[0].revision
    }

    pub fn get(&self, id: &RevisionId) -> Option<&Revision> {
        self.index.get(id).map(|&i| &self.nodes[i].revision)
    }

    pub fn contains(&self, id: &RevisionId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add `revision` as the last child of `parent`.
    pub fn append(&mut self, parent: &RevisionId, revision: Revision) -> VcsResult<()> {
        let parent_index = *self
            .index
            .get(parent)
            .ok_or_else(|| VcsError::NotFound(format!("revision {}", parent)))?;
        if self.index.contains_key(&revision.id) {
            return Err(VcsError::HistoryCorrupted(format!(
                "duplicate revision id {}",
                revision.id
            )));
        }

        let index = self.nodes.len();
        self.index.insert(revision.id.clone(), index);
        self.nodes.push(Node {
            revision,
            parent: Some(parent_index),
            children: Vec::new(),
        });
        self.nodes[parent_index].children.push(index);
        Ok(())
    }

    pub fn parent(&self, id: &RevisionId) -> Option<&Revision> {
        let &i = self.index.get(id)?;
        self.nodes[i].parent.map(|p| &self.nodes[p].revision)
    }

    pub fn children(&self, id: &RevisionId) -> Vec<&Revision> {
        match self.index.get(id) {
            Some(&i) => self.nodes[i]
                .children
                .iter()
                .map(|&c| &self.nodes[c].revision)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Revisions from the root down to `id`, inclusive. Empty if unknown.
    pub fn path_to(&self, id: &RevisionId) -> Vec<&Revision> {
        let mut path = Vec::new();
        let mut cursor = self.index.get(id).copied();
        while let Some(i) = cursor {
            path.push(&self.nodes[i].revision);
            cursor = self.nodes[i].parent;
        }
        path.reverse();
        path
    }

    /// Pre-order walk with depth, children in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Revision)> + '_ {
        let mut stack = vec![(0usize, 0usize)];
        std::iter::from_fn(move || {
            let (index, depth) = stack.pop()?;
            let node = &self.nodes[index];
            for &child in node.children.iter().rev() {
                stack.push((child, depth + 1));
            }
            Some((depth, &node.revision))
        })
    }

    pub(crate) fn items_mut(&mut self, id: &RevisionId) -> Option<&mut Vec<RevisionItem>> {
        let &i = self.index.get(id)?;
        Some(&mut self.nodes[i].revision.items)
    }

    pub fn subtree(&self, id: &RevisionId) -> Option<SubtreeNode> {
        self.index.get(id).map(|&i| self.subtree_at(i))
    }

    fn subtree_at(&self, index: usize) -> SubtreeNode {
        let node = &self.nodes[index];
        SubtreeNode {
            revision: node.revision.clone(),
            children: node.children.iter().map(|&c| self.subtree_at(c)).collect(),
        }
    }

    /// Attach `subtree` under `parent`. Revisions already present under the
    /// same parent are merged; one present under a different parent means
    /// the two histories disagree and nothing is changed. Returns the number
    /// of revisions added.
    pub fn graft(&mut self, parent: &RevisionId, subtree: SubtreeNode) -> VcsResult<usize> {
        let parent_index = *self
            .index
            .get(parent)
            .ok_or_else(|| VcsError::NotFound(format!("revision {}", parent)))?;

        let mut seen = HashSet::new();
        self.check_graft(parent_index, &subtree, &mut seen)?;
        Ok(self.apply_graft(parent_index, subtree))
    }

    fn check_graft<'a>(
        &self,
        parent: usize,
        node: &'a SubtreeNode,
        seen: &mut HashSet<&'a RevisionId>,
    ) -> VcsResult<()> {
        let id = &node.revision.id;
        if !seen.insert(id) {
            return Err(VcsError::HistoryCorrupted(format!(
                "revision {} appears twice in subtree",
                id
            )));
        }

        if let Some(&existing) = self.index.get(id) {
            if self.nodes[existing].parent != Some(parent) {
                return Err(VcsError::HistoryCorrupted(format!(
                    "revision {} already exists under a different parent",
                    id
                )));
            }
            for child in &node.children {
                self.check_graft(existing, child, seen)?;
            }
        } else {
            for child in &node.children {
                self.check_new_branch(child, seen)?;
            }
        }
        Ok(())
    }

    fn check_new_branch<'a>(
        &self,
        node: &'a SubtreeNode,
        seen: &mut HashSet<&'a RevisionId>,
    ) -> VcsResult<()> {
        let id = &node.revision.id;
        if !seen.insert(id) || self.index.contains_key(id) {
            return Err(VcsError::HistoryCorrupted(format!(
                "revision {} would get a second parent",
                id
            )));
        }
        for child in &node.children {
            self.check_new_branch(child, seen)?;
        }
        Ok(())
    }

    fn apply_graft(&mut self, parent: usize, node: SubtreeNode) -> usize {
        let SubtreeNode { revision, children } = node;
        let (index, mut added) = match self.index.get(&revision.id) {
            Some(&existing) => (existing, 0),
            None => {
                let index = self.nodes.len();
                self.index.insert(revision.id.clone(), index);
                self.nodes.push(Node {
                    revision,
                    parent: Some(parent),
                    children: Vec::new(),
                });
                self.nodes[parent].children.push(index);
                (index, 1)
            }
        };
        for child in children {
            added += self.apply_graft(index, child);
        }
        added
    }
}
