//! Per tracked-item-type diff and merge strategies.
//!
//! A strategy is described by a [`DiffSchema`]: the id-matched event
//! collections it understands plus its scalar property deltas. Every other
//! delta type is carried opaquely: diffed wholesale and merged by
//! replacement, so items written by a newer version survive a round trip.

pub mod events;
mod info;
pub mod properties;
mod timeline;
mod track;

pub use info::{project_info_deltas, ProjectInfoDiffLogic};
pub use timeline::{
    create_annotations_diffs, create_key_signatures_diffs, create_time_signatures_diffs,
    ProjectTimelineDiffLogic,
};
pub use track::{track_deltas, AutomationTrackDiffLogic, PianoTrackDiffLogic};

use stave_types::{
    Delta, DeltaDescription, DeltaDiff, DeltaOp, EventKind, SerializedTree, HEAD_STATE_DESCRIPTION,
};

use self::events::kind_ops;
use self::properties::{create_property_diff, PropertyDelta};
use super::tracked::{item_types, TrackedItem};

/// Ordered set of deltas produced by a diff or merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diff {
    deltas: Vec<DeltaDiff>,
}

impl Diff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_delta(&mut self, delta: Delta, data: SerializedTree) {
        self.deltas.push(DeltaDiff::new(delta, data));
    }

    pub fn apply_deltas(&mut self, deltas: impl IntoIterator<Item = DeltaDiff>) {
        self.deltas.extend(deltas);
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn deltas(&self) -> &[DeltaDiff] {
        &self.deltas
    }

    pub fn delta_of_type(&self, delta_type: &str) -> Option<&DeltaDiff> {
        self.deltas.iter().find(|d| d.delta.has_type(delta_type))
    }

    pub fn into_deltas(self) -> Vec<DeltaDiff> {
        self.deltas
    }
}

/// What a strategy knows how to diff finely.
#[derive(Debug)]
pub struct DiffSchema {
    pub event_kinds: &'static [EventKind],
    pub properties: &'static [PropertyDelta],
}

impl DiffSchema {
    /// Event kind of a delta type, if this schema handles it.
    fn kind_of(&self, delta_type: &str) -> Option<(EventKind, DeltaOp)> {
        EventKind::from_delta_type(delta_type).filter(|(kind, _)| self.event_kinds.contains(kind))
    }
}

pub trait DiffLogic {
    /// The tracked-item type this strategy serves.
    fn vcs_type(&self) -> &'static str;

    fn schema(&self) -> &'static DiffSchema;

    /// Compare the live `target` against `initial_state`; both are in
    /// full-state form (one `...Added` delta per collection).
    ///
    /// Only delta types the target reports are compared. A delta type that
    /// exists in `initial_state` but is absent from `target` produces no
    /// output, so items must report every delta they own, even when empty.
    fn create_diff(&self, target: &dyn TrackedItem, initial_state: &dyn TrackedItem) -> Diff {
        create_diff(self.schema(), target, initial_state)
    }

    /// Apply the changes in `target` on top of the full state
    /// `initial_state`, producing a new full state.
    fn create_merged_item(
        &self,
        target: &dyn TrackedItem,
        initial_state: &dyn TrackedItem,
    ) -> Diff {
        create_merged_item(self.schema(), target, initial_state)
    }
}

/// Strategy for item types with no dedicated logic.
pub struct OpaqueDiffLogic;

static OPAQUE_SCHEMA: DiffSchema = DiffSchema {
    event_kinds: &[],
    properties: &[],
};

impl DiffLogic for OpaqueDiffLogic {
    fn vcs_type(&self) -> &'static str {
        ""
    }

    fn schema(&self) -> &'static DiffSchema {
        &OPAQUE_SCHEMA
    }
}

/// Strategy for a tracked-item type.
pub fn diff_logic_for(vcs_type: &str) -> &'static dyn DiffLogic {
    match vcs_type {
        item_types::PROJECT_TIMELINE => &ProjectTimelineDiffLogic,
        item_types::PROJECT_INFO => &ProjectInfoDiffLogic,
        item_types::PIANO_TRACK => &PianoTrackDiffLogic,
        item_types::AUTOMATION_TRACK => &AutomationTrackDiffLogic,
        other => {
            log::debug!(target: "vcs", "no diff logic for item type '{}', diffing opaquely", other);
            &OpaqueDiffLogic
        }
    }
}

fn find_delta(item: &dyn TrackedItem, delta_type: &str) -> Option<usize> {
    (0..item.num_deltas()).find(|&i| item.delta(i).has_type(delta_type))
}

fn head_state_delta(kind: EventKind) -> Delta {
    Delta::new(
        DeltaDescription::new(HEAD_STATE_DESCRIPTION),
        kind.delta_type(DeltaOp::Added),
    )
}

pub(crate) fn create_diff(
    schema: &DiffSchema,
    target: &dyn TrackedItem,
    initial_state: &dyn TrackedItem,
) -> Diff {
    let mut diff = Diff::new();

    for i in 0..target.num_deltas() {
        let my_delta = target.delta(i);
        let my_data = target.delta_data(i);

        let state_data = find_delta(initial_state, my_delta.delta_type())
            .map(|j| initial_state.delta_data(j));

        let has_changed = match &state_data {
            Some(state_data) => !my_data.is_equivalent_to(state_data),
            None => true,
        };

        if !has_changed {
            continue;
        }

        match schema.kind_of(my_delta.delta_type()) {
            Some((kind, DeltaOp::Added)) => {
                let ops = kind_ops(kind);
                diff.apply_deltas((ops.create_diffs)(kind, state_data.as_ref(), &my_data));
            }
            _ => {
                diff.apply_deltas([create_property_diff(schema.properties, &my_delta, &my_data)]);
            }
        }
    }

    diff
}

/// Fold every delta of `kind` found in `target` onto `base`, in
/// added → removed → changed order. `None` if `target` has none.
fn merge_kind(
    kind: EventKind,
    base: &SerializedTree,
    target: &dyn TrackedItem,
) -> Option<SerializedTree> {
    let mut changes: Vec<(DeltaOp, SerializedTree)> = (0..target.num_deltas())
        .filter_map(|j| {
            let delta = target.delta(j);
            match EventKind::from_delta_type(delta.delta_type()) {
                Some((k, op)) if k == kind => Some((op, target.delta_data(j))),
                _ => None,
            }
        })
        .collect();

    if changes.is_empty() {
        return None;
    }

    changes.sort_by_key(|(op, _)| *op);

    let ops = kind_ops(kind);
    let merged = changes
        .iter()
        .fold(base.clone(), |acc, (op, data)| (ops.merge)(kind, *op, &acc, data));
    Some(merged)
}

pub(crate) fn create_merged_item(
    schema: &DiffSchema,
    target: &dyn TrackedItem,
    initial_state: &dyn TrackedItem,
) -> Diff {
    let mut diff = Diff::new();
    let mut merged_kinds: Vec<EventKind> = Vec::new();
    let mut merged_types: Vec<String> = Vec::new();

    // every state delta gets the target's changes of the same kind merged in,
    // or passes through unchanged when the target has none
    for i in 0..initial_state.num_deltas() {
        let state_delta = initial_state.delta(i);
        let state_data = initial_state.delta_data(i);

        match schema.kind_of(state_delta.delta_type()) {
            Some((kind, _)) => {
                if merged_kinds.contains(&kind) {
                    log::debug!(
                        target: "vcs",
                        "duplicate {} collection in state, ignoring",
                        kind.noun()
                    );
                    continue;
                }
                merged_kinds.push(kind);

                match merge_kind(kind, &state_data, target) {
                    Some(merged) => diff.apply_delta(head_state_delta(kind), merged),
                    None => diff.apply_delta(state_delta, state_data),
                }
            }
            None => {
                let delta_type = state_delta.delta_type().to_string();
                if merged_types.contains(&delta_type) {
                    continue;
                }

                let replacement = (0..target.num_deltas())
                    .rev()
                    .find(|&j| target.delta(j).has_type(&delta_type));

                match replacement {
                    Some(j) => diff.apply_delta(target.delta(j), target.delta_data(j)),
                    None => diff.apply_delta(state_delta, state_data),
                }
                merged_types.push(delta_type);
            }
        }
    }

    // collections the state predates (history written before the kind
    // existed) are merged starting from an empty collection
    for &kind in schema.event_kinds {
        if merged_kinds.contains(&kind) {
            continue;
        }
        let empty = SerializedTree::new(kind.delta_type(DeltaOp::Added));
        if let Some(merged) = merge_kind(kind, &empty, target) {
            merged_kinds.push(kind);
            diff.apply_delta(head_state_delta(kind), merged);
        }
    }

    for j in 0..target.num_deltas() {
        let delta = target.delta(j);
        if schema.kind_of(delta.delta_type()).is_some() {
            continue;
        }
        let delta_type = delta.delta_type().to_string();
        if merged_types.contains(&delta_type) {
            continue;
        }
        let latest = (0..target.num_deltas())
            .rev()
            .find(|&k| target.delta(k).has_type(&delta_type))
            .unwrap_or(j);
        diff.apply_delta(target.delta(latest), target.delta_data(latest));
        merged_types.push(delta_type);
    }

    diff
}
