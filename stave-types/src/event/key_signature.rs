use super::SequenceEvent;
use crate::tree::SerializedTree;

const SCALE_TAG: &str = "scale";

/// A named set of semitone offsets from the root key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scale {
    pub name: String,
    pub keys: Vec<i32>,
}

impl Default for Scale {
    fn default() -> Self {
        Self::major()
    }
}

impl Scale {
    pub fn new(name: impl Into<String>, keys: Vec<i32>) -> Self {
        Self {
            name: name.into(),
            keys,
        }
    }

    pub fn major() -> Self {
        Self::new("Major", vec![0, 2, 4, 5, 7, 9, 11])
    }

    pub fn minor() -> Self {
        Self::new("Minor", vec![0, 2, 3, 5, 7, 8, 10])
    }

    /// Two scales are the same if they contain the same keys, whatever they
    /// are called.
    pub fn is_equivalent_to(&self, other: &Scale) -> bool {
        self.keys == other.keys
    }

    pub fn serialize(&self) -> SerializedTree {
        let keys = self
            .keys
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        SerializedTree::new(SCALE_TAG)
            .with_property("name", self.name.as_str())
            .with_property("keys", keys)
    }

    /// Unparseable key lists fall back to the major scale.
    pub fn deserialize(tree: &SerializedTree) -> Self {
        let fallback = Self::major();
        let keys: Option<Vec<i32>> = tree
            .property("keys")
            .map(|v| v.to_text())
            .and_then(|s| {
                s.split_whitespace()
                    .map(|k| k.parse::<i32>().ok())
                    .collect::<Option<Vec<i32>>>()
            });
        match keys {
            Some(keys) if !keys.is_empty() => Self {
                name: tree.get_string("name", ""),
                keys,
            },
            _ => fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeySignatureEvent {
    pub id: String,
    pub beat: f32,
    pub root_key: i32,
    pub scale: Scale,
}

impl KeySignatureEvent {
    pub fn new(id: impl Into<String>, beat: f32, root_key: i32, scale: Scale) -> Self {
        Self {
            id: id.into(),
            beat,
            root_key,
            scale,
        }
    }
}

impl SequenceEvent for KeySignatureEvent {
    const TAG: &'static str = "keySignature";

    fn id(&self) -> &str {
        &self.id
    }

    fn beat(&self) -> f32 {
        self.beat
    }

    fn has_same_content(&self, other: &Self) -> bool {
        self.beat == other.beat
            && self.root_key == other.root_key
            && self.scale.is_equivalent_to(&other.scale)
    }

    fn serialize(&self) -> SerializedTree {
        SerializedTree::new(Self::TAG)
            .with_property("id", self.id.as_str())
            .with_property("beat", self.beat)
            .with_property("key", self.root_key)
            .with_child(self.scale.serialize())
    }

    fn deserialize(tree: &SerializedTree) -> Self {
        let legacy_root = tree.get_int("rootKey", 0);
        Self {
            id: tree.get_string("id", ""),
            beat: tree.get_float("beat", 0.0),
            root_key: tree.get_int("key", legacy_root),
            scale: tree
                .child_with_type(SCALE_TAG)
                .map(Scale::deserialize)
                .unwrap_or_default(),
        }
    }
}
