use super::SequenceEvent;
use crate::tree::SerializedTree;

pub const DEFAULT_CURVATURE: f32 = 0.5;

/// A controller value change on an automation track.
#[derive(Debug, Clone, PartialEq)]
pub struct AutomationEvent {
    pub id: String,
    pub beat: f32,
    pub value: f32,
    pub curvature: f32,
}

impl AutomationEvent {
    pub fn new(id: impl Into<String>, beat: f32, value: f32) -> Self {
        Self {
            id: id.into(),
            beat,
            value,
            curvature: DEFAULT_CURVATURE,
        }
    }
}

impl SequenceEvent for AutomationEvent {
    const TAG: &'static str = "auto";

    fn id(&self) -> &str {
        &self.id
    }

    fn beat(&self) -> f32 {
        self.beat
    }

    fn has_same_content(&self, other: &Self) -> bool {
        self.beat == other.beat && self.value == other.value && self.curvature == other.curvature
    }

    fn serialize(&self) -> SerializedTree {
        SerializedTree::new(Self::TAG)
            .with_property("id", self.id.as_str())
            .with_property("beat", self.beat)
            .with_property("value", self.value)
            .with_property("curve", self.curvature)
    }

    fn deserialize(tree: &SerializedTree) -> Self {
        Self {
            id: tree.get_string("id", ""),
            beat: tree.get_float("beat", 0.0),
            value: tree.get_float("value", 0.0),
            curvature: tree.get_float("curve", DEFAULT_CURVATURE),
        }
    }
}
