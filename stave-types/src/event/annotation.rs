use super::SequenceEvent;
use crate::tree::SerializedTree;

pub const DEFAULT_ANNOTATION_COLOUR: u32 = 0xffff_ffff;

/// A text marker on the project timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationEvent {
    pub id: String,
    pub beat: f32,
    pub length: f32,
    /// ARGB
    pub colour: u32,
    pub description: String,
}

impl AnnotationEvent {
    pub fn new(id: impl Into<String>, beat: f32, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            beat,
            length: 0.0,
            colour: DEFAULT_ANNOTATION_COLOUR,
            description: description.into(),
        }
    }

    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self.clone()
        }
    }

    pub fn with_beat(&self, beat: f32) -> Self {
        Self {
            beat,
            ..self.clone()
        }
    }
}

impl SequenceEvent for AnnotationEvent {
    const TAG: &'static str = "annotation";

    fn id(&self) -> &str {
        &self.id
    }

    fn beat(&self) -> f32 {
        self.beat
    }

    fn has_same_content(&self, other: &Self) -> bool {
        self.beat == other.beat
            && self.length == other.length
            && self.colour == other.colour
            && self.description == other.description
    }

    fn serialize(&self) -> SerializedTree {
        SerializedTree::new(Self::TAG)
            .with_property("id", self.id.as_str())
            .with_property("beat", self.beat)
            .with_property("len", self.length)
            .with_property("colour", self.colour)
            .with_property("text", self.description.as_str())
    }

    fn deserialize(tree: &SerializedTree) -> Self {
        let legacy_length = tree.get_float("length", 0.0);
        let legacy_text = tree.get_string("description", "");
        Self {
            id: tree.get_string("id", ""),
            beat: tree.get_float("beat", 0.0),
            length: tree.get_float("len", legacy_length),
            colour: tree.get_int64("colour", DEFAULT_ANNOTATION_COLOUR as i64) as u32,
            description: tree.get_string("text", &legacy_text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let mut event = AnnotationEvent::new("a1", 4.5, "Verse");
        event.length = 2.0;
        event.colour = 0xff33_6699;
        let restored = AnnotationEvent::deserialize(&event.serialize());
        assert_eq!(restored, event);
        assert!(restored.serialize().is_equivalent_to(&event.serialize()));
    }

    #[test]
    fn legacy_keys_are_read() {
        let tree = SerializedTree::new("annotation")
            .with_property("id", "old")
            .with_property("beat", 2.0f32)
            .with_property("length", 3.0f32)
            .with_property("description", "Legacy");
        let event = AnnotationEvent::deserialize(&tree);
        assert_eq!(event.length, 3.0);
        assert_eq!(event.description, "Legacy");
        assert_eq!(event.colour, DEFAULT_ANNOTATION_COLOUR);
    }

    #[test]
    fn content_comparison_ignores_id() {
        let a = AnnotationEvent::new("a", 0.0, "Verse");
        let b = AnnotationEvent::new("b", 0.0, "Verse");
        assert!(a.has_same_content(&b));
        assert!(!a.has_same_content(&a.with_description("Verse 1")));
        assert!(!a.has_same_content(&a.with_beat(1.0)));
    }
}
