use super::SequenceEvent;
use crate::tree::SerializedTree;

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: String,
    pub beat: f32,
    pub key: i32,
    pub length: f32,
    pub velocity: f32,
}

impl Note {
    pub fn new(id: impl Into<String>, beat: f32, key: i32, length: f32) -> Self {
        Self {
            id: id.into(),
            beat,
            key,
            length,
            velocity: 0.5,
        }
    }
}

impl SequenceEvent for Note {
    const TAG: &'static str = "note";

    fn id(&self) -> &str {
        &self.id
    }

    fn beat(&self) -> f32 {
        self.beat
    }

    fn has_same_content(&self, other: &Self) -> bool {
        self.beat == other.beat
            && self.key == other.key
            && self.length == other.length
            && self.velocity == other.velocity
    }

    fn serialize(&self) -> SerializedTree {
        SerializedTree::new(Self::TAG)
            .with_property("id", self.id.as_str())
            .with_property("beat", self.beat)
            .with_property("key", self.key)
            .with_property("len", self.length)
            .with_property("vol", self.velocity)
    }

    fn deserialize(tree: &SerializedTree) -> Self {
        Self {
            id: tree.get_string("id", ""),
            beat: tree.get_float("beat", 0.0),
            key: tree.get_int("key", 60),
            length: tree.get_float("len", 1.0),
            velocity: tree.get_float("vol", 0.5).clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let mut note = Note::new("n1", 1.0, 64, 0.5);
        note.velocity = 0.8;
        assert_eq!(Note::deserialize(&note.serialize()), note);
    }

    #[test]
    fn out_of_range_velocity_is_clamped() {
        let tree = SerializedTree::new("note").with_property("vol", 3.0f32);
        assert_eq!(Note::deserialize(&tree).velocity, 1.0);
    }
}
