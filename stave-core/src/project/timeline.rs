use stave_types::{
    AnnotationEvent, Delta, DeltaDescription, DeltaOp, EventKind, KeySignatureEvent, SerializedTree,
    TimeSignatureEvent,
};

use crate::vcs::{item_types, TrackedItem};

use super::find_delta_data;
use super::sequence::EventSequence;

const KINDS: [EventKind; 3] = [
    EventKind::Annotation,
    EventKind::TimeSignature,
    EventKind::KeySignature,
];

/// Annotations, time signatures and key signatures of a project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectTimeline {
    id: String,
    pub annotations: EventSequence<AnnotationEvent>,
    pub time_signatures: EventSequence<TimeSignatureEvent>,
    pub key_signatures: EventSequence<KeySignatureEvent>,
}

impl ProjectTimeline {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            annotations: EventSequence::new(),
            time_signatures: EventSequence::new(),
            key_signatures: EventSequence::new(),
        }
    }
}

impl TrackedItem for ProjectTimeline {
    fn vcs_id(&self) -> &str {
        &self.id
    }

    fn vcs_type(&self) -> &str {
        item_types::PROJECT_TIMELINE
    }

    fn vcs_name(&self) -> String {
        "Timeline".to_string()
    }

    fn num_deltas(&self) -> usize {
        KINDS.len()
    }

    fn delta(&self, index: usize) -> Delta {
        let kind = KINDS[index];
        Delta::new(DeltaDescription::new(kind.noun()), kind.delta_type(DeltaOp::Added))
    }

    fn delta_data(&self, index: usize) -> SerializedTree {
        let tag = KINDS[index].delta_type(DeltaOp::Added);
        match KINDS[index] {
            EventKind::Annotation => self.annotations.serialize(tag),
            EventKind::TimeSignature => self.time_signatures.serialize(tag),
            _ => self.key_signatures.serialize(tag),
        }
    }

    fn reset_state_to(&mut self, state: &dyn TrackedItem) {
        let full = |kind: EventKind| find_delta_data(state, kind.delta_type(DeltaOp::Added));
        self.annotations.reset_from(full(EventKind::Annotation).as_ref());
        self.time_signatures.reset_from(full(EventKind::TimeSignature).as_ref());
        self.key_signatures.reset_from(full(EventKind::KeySignature).as_ref());
    }
}
