//! Sequence events that diff logic matches by id: timeline annotations,
//! time signatures, key signatures, and track notes/automation events.

mod annotation;
mod automation;
mod key_signature;
mod note;
mod time_signature;

pub use annotation::AnnotationEvent;
pub use automation::AutomationEvent;
pub use key_signature::{KeySignatureEvent, Scale};
pub use note::Note;
pub use time_signature::TimeSignatureEvent;

use crate::tree::SerializedTree;

/// Common shape of every id-matched sequence event.
pub trait SequenceEvent: Clone {
    /// Type tag of the serialized node.
    const TAG: &'static str;

    fn id(&self) -> &str;
    fn beat(&self) -> f32;

    /// Whether the semantically relevant fields differ. Ids are not compared.
    fn has_same_content(&self, other: &Self) -> bool;

    fn serialize(&self) -> SerializedTree;

    /// Permissive read: missing or malformed properties fall back to defaults.
    fn deserialize(tree: &SerializedTree) -> Self;
}

/// Fresh identifier for a new event.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Order used for every event collection: by beat, then by id.
pub fn compare_events<E: SequenceEvent>(a: &E, b: &E) -> std::cmp::Ordering {
    a.beat().total_cmp(&b.beat()).then_with(|| a.id().cmp(b.id()))
}

pub fn sort_events<E: SequenceEvent>(events: &mut [E]) {
    events.sort_by(compare_events);
}

/// Read every child with the event's tag, sorted by [`compare_events`].
pub fn deserialize_events<E: SequenceEvent>(tree: &SerializedTree) -> Vec<E> {
    let mut events: Vec<E> = tree.children_with_type(E::TAG).map(E::deserialize).collect();
    sort_events(&mut events);
    events
}

/// Serialize events as children of a node tagged `tag`, in the given order.
pub fn serialize_events<'a, E: SequenceEvent + 'a>(
    tag: &str,
    events: impl IntoIterator<Item = &'a E>,
) -> SerializedTree {
    let mut tree = SerializedTree::new(tag);
    for event in events {
        tree.append_child(event.serialize());
    }
    tree
}

/// What a delta does to an event collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeltaOp {
    Added,
    Removed,
    Changed,
}

impl DeltaOp {
    pub const ALL: [DeltaOp; 3] = [DeltaOp::Added, DeltaOp::Removed, DeltaOp::Changed];

    pub fn verb(&self) -> &'static str {
        match self {
            DeltaOp::Added => "added",
            DeltaOp::Removed => "removed",
            DeltaOp::Changed => "changed",
        }
    }
}

/// Closed set of id-matched event collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Annotation,
    TimeSignature,
    KeySignature,
    Note,
    Automation,
}

struct KindNames {
    tag: &'static str,
    noun: &'static str,
    added: &'static str,
    removed: &'static str,
    changed: &'static str,
}

static KIND_NAMES: [(EventKind, KindNames); 5] = [
    (
        EventKind::Annotation,
        KindNames {
            tag: AnnotationEvent::TAG,
            noun: "annotations",
            added: "annotationsAdded",
            removed: "annotationsRemoved",
            changed: "annotationsChanged",
        },
    ),
    (
        EventKind::TimeSignature,
        KindNames {
            tag: TimeSignatureEvent::TAG,
            noun: "time signatures",
            added: "timeSignaturesAdded",
            removed: "timeSignaturesRemoved",
            changed: "timeSignaturesChanged",
        },
    ),
    (
        EventKind::KeySignature,
        KindNames {
            tag: KeySignatureEvent::TAG,
            noun: "key signatures",
            added: "keySignaturesAdded",
            removed: "keySignaturesRemoved",
            changed: "keySignaturesChanged",
        },
    ),
    (
        EventKind::Note,
        KindNames {
            tag: Note::TAG,
            noun: "notes",
            added: "notesAdded",
            removed: "notesRemoved",
            changed: "notesChanged",
        },
    ),
    (
        EventKind::Automation,
        KindNames {
            tag: AutomationEvent::TAG,
            noun: "events",
            added: "automationEventsAdded",
            removed: "automationEventsRemoved",
            changed: "automationEventsChanged",
        },
    ),
];

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Annotation,
        EventKind::TimeSignature,
        EventKind::KeySignature,
        EventKind::Note,
        EventKind::Automation,
    ];

    fn names(&self) -> &'static KindNames {
        // KIND_NAMES is indexed in declaration order
        &KIND_NAMES[*self as usize].1
    }

    /// Type tag of a single serialized event of this kind.
    pub fn event_tag(&self) -> &'static str {
        self.names().tag
    }

    /// Plural noun used in delta descriptions.
    pub fn noun(&self) -> &'static str {
        self.names().noun
    }

    pub fn delta_type(&self, op: DeltaOp) -> &'static str {
        let names = self.names();
        match op {
            DeltaOp::Added => names.added,
            DeltaOp::Removed => names.removed,
            DeltaOp::Changed => names.changed,
        }
    }

    /// Resolve a delta type identifier into its collection kind and operation.
    pub fn from_delta_type(delta_type: &str) -> Option<(EventKind, DeltaOp)> {
        KIND_NAMES.iter().find_map(|(kind, names)| {
            if delta_type == names.added {
                Some((*kind, DeltaOp::Added))
            } else if delta_type == names.removed {
                Some((*kind, DeltaOp::Removed))
            } else if delta_type == names.changed {
                Some((*kind, DeltaOp::Changed))
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_table_is_in_declaration_order() {
        for kind in EventKind::ALL {
            assert_eq!(KIND_NAMES[kind as usize].0, kind);
        }
    }

    #[test]
    fn delta_types_resolve_back_to_kind_and_op() {
        for kind in EventKind::ALL {
            for op in DeltaOp::ALL {
                assert_eq!(EventKind::from_delta_type(kind.delta_type(op)), Some((kind, op)));
            }
        }
        assert_eq!(EventKind::from_delta_type("trackPath"), None);
    }

    #[test]
    fn deserialized_events_are_sorted_by_beat_then_id() {
        let tree = serialize_events(
            "annotationsAdded",
            &[
                AnnotationEvent::new("b", 8.0, "Chorus"),
                AnnotationEvent::new("z", 0.0, "Intro"),
                AnnotationEvent::new("a", 8.0, "Bridge"),
            ],
        );
        let events: Vec<AnnotationEvent> = deserialize_events(&tree);
        let ids: Vec<&str> = events.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["z", "a", "b"]);
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(generate_id(), generate_id());
    }
}
