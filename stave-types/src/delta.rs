//! Delta descriptors: named, typed units of change belonging to a tracked item.

use serde::{Deserialize, Serialize};

use crate::tree::SerializedTree;

/// Description used for merged full-state deltas.
pub const HEAD_STATE_DESCRIPTION: &str = "head state";

/// Human-readable description of a delta plus the number of affected entities.
/// A `{x}` placeholder in `text` is substituted with `num_changes` on display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaDescription {
    pub text: String,
    pub num_changes: i64,
}

impl DeltaDescription {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            num_changes: 0,
        }
    }

    pub fn with_count(text: impl Into<String>, num_changes: i64) -> Self {
        Self {
            text: text.into(),
            num_changes,
        }
    }
}

impl std::fmt::Display for DeltaDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text.replace("{x}", &self.num_changes.to_string()))
    }
}

/// A typed unit of change. The type identifier (e.g. `annotationsAdded`)
/// tells which diff routine understands the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    description: DeltaDescription,
    delta_type: String,
}

impl Delta {
    pub fn new(description: DeltaDescription, delta_type: impl Into<String>) -> Self {
        Self {
            description,
            delta_type: delta_type.into(),
        }
    }

    pub fn description(&self) -> &DeltaDescription {
        &self.description
    }

    pub fn delta_type(&self) -> &str {
        &self.delta_type
    }

    pub fn has_type(&self, delta_type: &str) -> bool {
        self.delta_type == delta_type
    }
}

/// A delta paired with its serialized payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaDiff {
    pub delta: Delta,
    pub data: SerializedTree,
}

impl DeltaDiff {
    pub fn new(delta: Delta, data: SerializedTree) -> Self {
        Self { delta, data }
    }

    pub fn delta_type(&self) -> &str {
        self.delta.delta_type()
    }

    /// Same delta type and equivalent payload. Descriptions are not compared.
    pub fn is_equivalent_to(&self, other: &DeltaDiff) -> bool {
        self.delta.delta_type == other.delta.delta_type && self.data.is_equivalent_to(&other.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_substitutes_count() {
        let d = DeltaDescription::with_count("added {x} annotations", 3);
        assert_eq!(d.to_string(), "added 3 annotations");
        assert_eq!(DeltaDescription::new("head state").to_string(), "head state");
    }

    #[test]
    fn equivalence_ignores_description() {
        let data = SerializedTree::new("annotationsAdded");
        let description = DeltaDescription::with_count("added {x} annotations", 1);
        let a = DeltaDiff::new(Delta::new(description, "annotationsAdded"), data.clone());
        let b = DeltaDiff::new(
            Delta::new(DeltaDescription::new(HEAD_STATE_DESCRIPTION), "annotationsAdded"),
            data,
        );
        assert!(a.is_equivalent_to(&b));
        assert!(a.delta.has_type("annotationsAdded"));
    }
}
