//! Id-matched event collections: fine-grained diff and the three merge
//! primitives. Every function builds a fresh output from read-only inputs.

use std::collections::HashSet;

use stave_types::{
    deserialize_events, serialize_events, sort_events, AnnotationEvent, AutomationEvent, Delta,
    DeltaDescription, DeltaDiff, DeltaOp, EventKind, KeySignatureEvent, Note, SequenceEvent,
    SerializedTree, TimeSignatureEvent,
};

/// Result of comparing two event collections by id.
#[derive(Debug, Clone, PartialEq)]
pub struct EventChanges<E> {
    /// In changes, not in state.
    pub added: Vec<E>,
    /// In state, not in changes.
    pub removed: Vec<E>,
    /// In both with different content; holds the changes' copy.
    pub changed: Vec<E>,
}

impl<E> EventChanges<E> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

pub fn diff_events<E: SequenceEvent>(state: &[E], changes: &[E]) -> EventChanges<E> {
    let mut result = EventChanges {
        added: Vec::new(),
        removed: Vec::new(),
        changed: Vec::new(),
    };

    for state_event in state {
        match changes.iter().find(|c| c.id() == state_event.id()) {
            Some(changes_event) => {
                if !state_event.has_same_content(changes_event) {
                    result.changed.push(changes_event.clone());
                }
            }
            None => result.removed.push(state_event.clone()),
        }
    }

    let state_ids: HashSet<&str> = state.iter().map(|e| e.id()).collect();
    result.added = changes
        .iter()
        .filter(|c| !state_ids.contains(c.id()))
        .cloned()
        .collect();

    result
}

/// Union by id: state entries first, then changes entries not yet present.
pub fn merge_added<E: SequenceEvent>(state: &[E], changes: &[E]) -> Vec<E> {
    let mut seen: HashSet<&str> = state.iter().map(|e| e.id()).collect();
    let mut result = state.to_vec();
    for event in changes {
        if seen.insert(event.id()) {
            result.push(event.clone());
        }
    }
    result
}

/// State entries whose id does not appear in changes.
pub fn merge_removed<E: SequenceEvent>(state: &[E], changes: &[E]) -> Vec<E> {
    let removed: HashSet<&str> = changes.iter().map(|e| e.id()).collect();
    state
        .iter()
        .filter(|e| !removed.contains(e.id()))
        .cloned()
        .collect()
}

/// State entries with every id-matched entry replaced by the changes copy.
/// A changes entry with no counterpart in state is skipped.
pub fn merge_changed<E: SequenceEvent>(state: &[E], changes: &[E]) -> Vec<E> {
    for event in changes {
        if !state.iter().any(|s| s.id() == event.id()) {
            log::warn!(
                target: "vcs",
                "changed {} {} not found in state, skipping",
                E::TAG,
                event.id()
            );
        }
    }

    state
        .iter()
        .map(|s| {
            changes
                .iter()
                .find(|c| c.id() == s.id())
                .unwrap_or(s)
                .clone()
        })
        .collect()
}

fn serialize_changes<E: SequenceEvent>(kind: EventKind, op: DeltaOp, events: &[E]) -> DeltaDiff {
    let delta_type = kind.delta_type(op);
    let description = DeltaDescription::with_count(
        format!("{} {{x}} {}", op.verb(), kind.noun()),
        events.len() as i64,
    );
    DeltaDiff::new(
        Delta::new(description, delta_type),
        serialize_events(delta_type, events),
    )
}

/// Zero to three deltas (added, removed, changed) describing how `changes`
/// differs from `state`. An absent state means everything is added.
pub fn create_event_diffs<E: SequenceEvent>(
    kind: EventKind,
    state: Option<&SerializedTree>,
    changes: &SerializedTree,
) -> Vec<DeltaDiff> {
    let state_events: Vec<E> = state.map(deserialize_events).unwrap_or_default();
    let changes_events: Vec<E> = deserialize_events(changes);
    let diff = diff_events(&state_events, &changes_events);

    let mut result = Vec::new();
    if !diff.added.is_empty() {
        result.push(serialize_changes(kind, DeltaOp::Added, &diff.added));
    }
    if !diff.removed.is_empty() {
        result.push(serialize_changes(kind, DeltaOp::Removed, &diff.removed));
    }
    if !diff.changed.is_empty() {
        result.push(serialize_changes(kind, DeltaOp::Changed, &diff.changed));
    }
    result
}

/// Apply one delta payload onto a full-state payload. The output is tagged
/// as the kind's full-state (`...Added`) delta and sorted by beat.
pub fn merge_event_tree<E: SequenceEvent>(
    kind: EventKind,
    op: DeltaOp,
    state: &SerializedTree,
    changes: &SerializedTree,
) -> SerializedTree {
    let state_events: Vec<E> = deserialize_events(state);
    let changes_events: Vec<E> = deserialize_events(changes);
    let mut merged = match op {
        DeltaOp::Added => merge_added(&state_events, &changes_events),
        DeltaOp::Removed => merge_removed(&state_events, &changes_events),
        DeltaOp::Changed => merge_changed(&state_events, &changes_events),
    };
    sort_events(&mut merged);
    serialize_events(kind.delta_type(DeltaOp::Added), &merged)
}

/// Per-kind function set, so callers dispatch on [`EventKind`] once.
pub(crate) struct KindOps {
    pub create_diffs: fn(EventKind, Option<&SerializedTree>, &SerializedTree) -> Vec<DeltaDiff>,
    pub merge: fn(EventKind, DeltaOp, &SerializedTree, &SerializedTree) -> SerializedTree,
}

// indexed in EventKind declaration order
static KIND_OPS: [KindOps; 5] = [
    KindOps {
        create_diffs: create_event_diffs::<AnnotationEvent>,
        merge: merge_event_tree::<AnnotationEvent>,
    },
    KindOps {
        create_diffs: create_event_diffs::<TimeSignatureEvent>,
        merge: merge_event_tree::<TimeSignatureEvent>,
    },
    KindOps {
        create_diffs: create_event_diffs::<KeySignatureEvent>,
        merge: merge_event_tree::<KeySignatureEvent>,
    },
    KindOps {
        create_diffs: create_event_diffs::<Note>,
        merge: merge_event_tree::<Note>,
    },
    KindOps {
        create_diffs: create_event_diffs::<AutomationEvent>,
        merge: merge_event_tree::<AutomationEvent>,
    },
];

pub(crate) fn kind_ops(kind: EventKind) -> &'static KindOps {
    &KIND_OPS[kind as usize]
}
