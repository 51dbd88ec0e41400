use super::SequenceEvent;
use crate::tree::SerializedTree;

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSignatureEvent {
    pub id: String,
    pub beat: f32,
    pub numerator: i32,
    pub denominator: i32,
}

impl TimeSignatureEvent {
    pub fn new(id: impl Into<String>, beat: f32, numerator: i32, denominator: i32) -> Self {
        Self {
            id: id.into(),
            beat,
            numerator,
            denominator,
        }
    }
}

/// Parse a legacy `"n/d"` meter string.
fn parse_meter(meter: &str) -> Option<(i32, i32)> {
    let (n, d) = meter.split_once('/')?;
    Some((n.trim().parse().ok()?, d.trim().parse().ok()?))
}

impl SequenceEvent for TimeSignatureEvent {
    const TAG: &'static str = "timeSignature";

    fn id(&self) -> &str {
        &self.id
    }

    fn beat(&self) -> f32 {
        self.beat
    }

    fn has_same_content(&self, other: &Self) -> bool {
        self.beat == other.beat
            && self.numerator == other.numerator
            && self.denominator == other.denominator
    }

    fn serialize(&self) -> SerializedTree {
        SerializedTree::new(Self::TAG)
            .with_property("id", self.id.as_str())
            .with_property("beat", self.beat)
            .with_property("numerator", self.numerator)
            .with_property("denominator", self.denominator)
    }

    fn deserialize(tree: &SerializedTree) -> Self {
        let (legacy_num, legacy_denom) = tree
            .property("meter")
            .and_then(|m| parse_meter(&m.to_text()))
            .unwrap_or((4, 4));
        Self {
            id: tree.get_string("id", ""),
            beat: tree.get_float("beat", 0.0),
            numerator: tree.get_int("numerator", legacy_num),
            denominator: tree.get_int("denominator", legacy_denom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let event = TimeSignatureEvent::new("ts1", 16.0, 3, 4);
        assert_eq!(TimeSignatureEvent::deserialize(&event.serialize()), event);
    }

    #[test]
    fn legacy_meter_string() {
        let tree = SerializedTree::new("timeSignature")
            .with_property("id", "ts")
            .with_property("meter", "7/8");
        let event = TimeSignatureEvent::deserialize(&tree);
        assert_eq!((event.numerator, event.denominator), (7, 8));
    }

    #[test]
    fn missing_fields_default_to_common_time() {
        let event = TimeSignatureEvent::deserialize(&SerializedTree::new("timeSignature"));
        assert_eq!((event.numerator, event.denominator), (4, 4));
        assert_eq!(event.beat, 0.0);
        assert!(event.id.is_empty());
    }
}
