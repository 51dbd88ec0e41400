use stave_types::{
    AnnotationEvent, DeltaDiff, EventKind, KeySignatureEvent, SerializedTree, TimeSignatureEvent,
};

use super::events::create_event_diffs;
use super::{DiffLogic, DiffSchema};
use crate::vcs::tracked::item_types;

/// Annotations, time signatures and key signatures of the project timeline.
pub struct ProjectTimelineDiffLogic;

static TIMELINE_SCHEMA: DiffSchema = DiffSchema {
    event_kinds: &[
        EventKind::Annotation,
        EventKind::TimeSignature,
        EventKind::KeySignature,
    ],
    properties: &[],
};

impl DiffLogic for ProjectTimelineDiffLogic {
    fn vcs_type(&self) -> &'static str {
        item_types::PROJECT_TIMELINE
    }

    fn schema(&self) -> &'static DiffSchema {
        &TIMELINE_SCHEMA
    }
}

pub fn create_annotations_diffs(
    state: Option<&SerializedTree>,
    changes: &SerializedTree,
) -> Vec<DeltaDiff> {
    create_event_diffs::<AnnotationEvent>(EventKind::Annotation, state, changes)
}

pub fn create_time_signatures_diffs(
    state: Option<&SerializedTree>,
    changes: &SerializedTree,
) -> Vec<DeltaDiff> {
    create_event_diffs::<TimeSignatureEvent>(EventKind::TimeSignature, state, changes)
}

pub fn create_key_signatures_diffs(
    state: Option<&SerializedTree>,
    changes: &SerializedTree,
) -> Vec<DeltaDiff> {
    create_event_diffs::<KeySignatureEvent>(EventKind::KeySignature, state, changes)
}
