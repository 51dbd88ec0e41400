//! Scalar property deltas (track name, colour, project title, ...). These
//! diff wholesale and merge by replacement.

use stave_types::{Delta, DeltaDescription, DeltaDiff, SerializedTree};

/// Property name holding the value inside a property delta payload.
pub const VALUE: &str = "value";

/// A delta type carrying one scalar property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDelta {
    pub delta_type: &'static str,
    pub description: &'static str,
}

/// Payload for a property delta: a node tagged with the delta type and a
/// single `value` property.
pub fn property_payload(delta_type: &str, value: impl Into<stave_types::Value>) -> SerializedTree {
    SerializedTree::new(delta_type).with_property(VALUE, value)
}

pub fn property_delta(delta_type: &str, value: impl Into<stave_types::Value>) -> DeltaDiff {
    DeltaDiff::new(
        Delta::new(DeltaDescription::new(delta_type), delta_type),
        property_payload(delta_type, value),
    )
}

/// The new payload, wrapped in a delta carrying the property's description.
/// Unknown delta types keep their own description.
pub fn create_property_diff(
    known: &[PropertyDelta],
    delta: &Delta,
    data: &SerializedTree,
) -> DeltaDiff {
    let description = known
        .iter()
        .find(|p| delta.has_type(p.delta_type))
        .map(|p| DeltaDescription::new(p.description))
        .unwrap_or_else(|| delta.description().clone());
    DeltaDiff::new(Delta::new(description, delta.delta_type()), data.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: [PropertyDelta; 1] = [PropertyDelta {
        delta_type: "trackPath",
        description: "renamed track",
    }];

    #[test]
    fn known_property_gets_its_description() {
        let current = property_delta("trackPath", "Lead");
        let diff = create_property_diff(&KNOWN, &current.delta, &current.data);
        assert_eq!(diff.delta.description().to_string(), "renamed track");
        assert!(diff.data.is_equivalent_to(&current.data));
    }

    #[test]
    fn unknown_property_keeps_own_description() {
        let current = DeltaDiff::new(
            Delta::new(DeltaDescription::new("tempo changed"), "tempo"),
            property_payload("tempo", 120),
        );
        let diff = create_property_diff(&KNOWN, &current.delta, &current.data);
        assert_eq!(diff.delta.description().to_string(), "tempo changed");
        assert_eq!(diff.data.get_int(VALUE, 0), 120);
    }
}
