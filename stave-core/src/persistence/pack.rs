//! Tree form of a whole history: the in-memory persistence boundary.
//!
//! ```text
//! vcs
//! ├── tree
//! │   └── revision {id, message, author, timestamp}
//! │       ├── item {id, type, name, status}
//! │       │   └── delta {type, description, count}
//! │       │       └── <payload>
//! │       └── revision ...
//! ├── head {id}
//! ├── stashes
//! │   └── revision ...
//! └── quickStash
//!     └── revision ...
//! ```

use stave_types::{Delta, DeltaDescription, DeltaDiff, SerializedTree};

use crate::error::{VcsError, VcsResult};
use crate::vcs::{
    ItemSnapshot, ItemStatus, Revision, RevisionId, RevisionItem, RevisionTree, StashesRepository,
    SubtreeNode,
};

pub mod tags {
    pub const VCS: &str = "vcs";
    pub const TREE: &str = "tree";
    pub const HEAD: &str = "head";
    pub const STASHES: &str = "stashes";
    pub const QUICK_STASH: &str = "quickStash";
    pub const REVISION: &str = "revision";
    pub const ITEM: &str = "item";
    pub const DELTA: &str = "delta";
}

const ID: &str = "id";
const MESSAGE: &str = "message";
const AUTHOR: &str = "author";
const TIMESTAMP: &str = "timestamp";
const TYPE: &str = "type";
const NAME: &str = "name";
const STATUS: &str = "status";
const DESCRIPTION: &str = "description";
const COUNT: &str = "count";

/// Revision tree, head position and stashes of one project.
#[derive(Debug, Clone)]
pub struct Pack {
    pub tree: RevisionTree,
    pub head: RevisionId,
    pub stashes: StashesRepository,
}

impl Pack {
    pub fn serialize(&self) -> SerializedTree {
        let mut root = SerializedTree::new(tags::VCS);

        let mut tree = SerializedTree::new(tags::TREE);
        if let Some(subtree) = self.tree.subtree(&self.tree.root().id) {
            tree.append_child(serialize_subtree(&subtree));
        }
        root.append_child(tree);

        root.append_child(SerializedTree::new(tags::HEAD).with_property(ID, self.head.as_str()));

        let mut stashes = SerializedTree::new(tags::STASHES);
        for stash in self.stashes.iter() {
            stashes.append_child(serialize_revision(stash));
        }
        root.append_child(stashes);

        let mut quick = SerializedTree::new(tags::QUICK_STASH);
        if let Some(stash) = self.stashes.quick_stash() {
            quick.append_child(serialize_revision(stash));
        }
        root.append_child(quick);

        root
    }

    /// Rebuild a pack. Structural problems (no single root, repeated ids,
    /// dangling head) are [`VcsError::HistoryCorrupted`]; malformed item
    /// payloads fall back to defaults.
    pub fn deserialize(root: &SerializedTree) -> VcsResult<Pack> {
        if !root.has_type(tags::VCS) {
            return Err(corrupted(format!("unexpected root node '{}'", root.type_tag())));
        }

        let tree_node = root
            .child_with_type(tags::TREE)
            .ok_or_else(|| corrupted("missing revision tree"))?;
        let mut roots = tree_node.children_with_type(tags::REVISION);
        let root_revision = roots.next().ok_or_else(|| corrupted("revision tree has no root"))?;
        if roots.next().is_some() {
            return Err(corrupted("revision tree has more than one root"));
        }
        let tree = RevisionTree::from_subtree(deserialize_subtree(root_revision)?)?;

        let head_id = root
            .child_with_type(tags::HEAD)
            .and_then(|h| h.property(ID))
            .and_then(|v| v.as_str())
            .map(RevisionId::from)
            .ok_or_else(|| corrupted("missing head"))?;
        if !tree.contains(&head_id) {
            return Err(corrupted(format!("head {} is not in the revision tree", head_id)));
        }

        let mut stashes = StashesRepository::new();
        if let Some(node) = root.child_with_type(tags::STASHES) {
            for stash in node.children_with_type(tags::REVISION) {
                stashes.push_back(deserialize_revision(stash)?);
            }
        }
        if let Some(stash) = root
            .child_with_type(tags::QUICK_STASH)
            .and_then(|q| q.child_with_type(tags::REVISION))
        {
            stashes.set_quick_stash(deserialize_revision(stash)?);
        }

        Ok(Pack {
            tree,
            head: head_id,
            stashes,
        })
    }
}

fn corrupted(why: impl Into<String>) -> VcsError {
    VcsError::HistoryCorrupted(why.into())
}

/// A revision node with its descendants nested as `revision` children.
pub fn serialize_subtree(node: &SubtreeNode) -> SerializedTree {
    let mut tree = serialize_revision(&node.revision);
    for child in &node.children {
        tree.append_child(serialize_subtree(child));
    }
    tree
}

pub fn deserialize_subtree(tree: &SerializedTree) -> VcsResult<SubtreeNode> {
    Ok(SubtreeNode {
        revision: deserialize_revision(tree)?,
        children: tree
            .children_with_type(tags::REVISION)
            .map(deserialize_subtree)
            .collect::<VcsResult<Vec<_>>>()?,
    })
}

fn serialize_revision(revision: &Revision) -> SerializedTree {
    let mut tree = SerializedTree::new(tags::REVISION)
        .with_property(ID, revision.id.as_str())
        .with_property(MESSAGE, revision.message.as_str())
        .with_property(AUTHOR, revision.author.as_str())
        .with_property(TIMESTAMP, revision.timestamp);

    for item in &revision.items {
        let mut node = SerializedTree::new(tags::ITEM)
            .with_property(ID, item.snapshot.id.as_str())
            .with_property(TYPE, item.snapshot.vcs_type.as_str())
            .with_property(NAME, item.snapshot.name.as_str())
            .with_property(STATUS, item.status.as_str());
        for delta in &item.snapshot.deltas {
            node.append_child(serialize_delta(delta));
        }
        tree.append_child(node);
    }
    tree
}

fn serialize_delta(delta: &DeltaDiff) -> SerializedTree {
    let description = delta.delta.description();
    SerializedTree::new(tags::DELTA)
        .with_property(TYPE, delta.delta_type())
        .with_property(DESCRIPTION, description.text.as_str())
        .with_property(COUNT, description.num_changes)
        .with_child(delta.data.clone())
}

/// Child `revision` nodes are not read here.
fn deserialize_revision(tree: &SerializedTree) -> VcsResult<Revision> {
    let id = tree.get_string(ID, "");
    if id.is_empty() {
        return Err(corrupted("revision without id"));
    }

    let mut items = Vec::new();
    for node in tree.children_with_type(tags::ITEM) {
        let item_id = node.get_string(ID, "");
        let status_text = node.get_string(STATUS, "");
        let Some(status) = ItemStatus::parse(&status_text) else {
            log::warn!(
                target: "pack",
                "revision {}: item {} has unknown status '{}', skipping",
                id,
                item_id,
                status_text
            );
            continue;
        };

        let deltas = node
            .children_with_type(tags::DELTA)
            .map(deserialize_delta)
            .collect();
        let snapshot =
            ItemSnapshot::new(item_id, node.get_string(TYPE, ""), node.get_string(NAME, ""))
                .with_deltas(deltas);
        items.push(RevisionItem::new(status, snapshot));
    }

    Ok(Revision {
        id: RevisionId::from(id),
        message: tree.get_string(MESSAGE, ""),
        author: tree.get_string(AUTHOR, ""),
        timestamp: tree.get_int64(TIMESTAMP, 0),
        items,
    })
}

fn deserialize_delta(node: &SerializedTree) -> DeltaDiff {
    let delta_type = node.get_string(TYPE, "");
    let description =
        DeltaDescription::with_count(node.get_string(DESCRIPTION, ""), node.get_int64(COUNT, 0));
    let data = node
        .child(0)
        .cloned()
        .unwrap_or_else(|| SerializedTree::new(delta_type.as_str()));
    DeltaDiff::new(Delta::new(description, delta_type), data)
}
