//! JSON encoding of revision subtrees exchanged between replicas.

use stave_types::SerializedTree;

use crate::error::{VcsError, VcsResult};
use crate::vcs::SubtreeNode;

use super::pack::{deserialize_subtree, serialize_subtree, tags};

pub fn encode_subtree(node: &SubtreeNode) -> VcsResult<String> {
    Ok(serde_json::to_string_pretty(&serialize_subtree(node))?)
}

pub fn decode_subtree(json: &str) -> VcsResult<SubtreeNode> {
    let tree: SerializedTree = serde_json::from_str(json)?;
    if !tree.has_type(tags::REVISION) {
        return Err(VcsError::HistoryCorrupted(format!(
            "subtree root is '{}', not a revision",
            tree.type_tag()
        )));
    }
    deserialize_subtree(&tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcs::diff::properties::property_delta;
    use crate::vcs::{ItemSnapshot, ItemStatus, Revision, RevisionItem};

    #[test]
    fn subtree_survives_json() {
        let item = ItemSnapshot::new("info", "ProjectInfo", "Info")
            .with_deltas(vec![property_delta("projectTitle", "Demo")]);
        let node = SubtreeNode {
            revision: Revision::new(
                "first",
                "ada",
                vec![RevisionItem::new(ItemStatus::Added, item)],
            ),
            children: vec![SubtreeNode::leaf(Revision::new("second", "ada", Vec::new()))],
        };
        let json = encode_subtree(&node).unwrap();
        assert_eq!(decode_subtree(&json).unwrap(), node);
    }

    #[test]
    fn non_revision_root_is_rejected() {
        let json = serde_json::to_string(&SerializedTree::new("vcs")).unwrap();
        assert!(matches!(decode_subtree(&json), Err(VcsError::HistoryCorrupted(_))));
        assert!(matches!(decode_subtree("{not json"), Err(VcsError::Json(_))));
    }
}
