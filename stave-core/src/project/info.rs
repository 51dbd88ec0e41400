use stave_types::{generate_id, Delta, DeltaDescription, SerializedTree};

use crate::vcs::diff::project_info_deltas as deltas;
use crate::vcs::diff::properties::{property_payload, VALUE};
use crate::vcs::{item_types, TrackedItem};

use super::find_delta_data;

const PROPERTY_DELTAS: [&str; 4] = [
    deltas::PROJECT_TITLE,
    deltas::PROJECT_AUTHOR,
    deltas::PROJECT_DESCRIPTION,
    deltas::PROJECT_LICENSE,
];

/// Project metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectInfo {
    id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub license: String,
}

impl ProjectInfo {
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(generate_id(), title)
    }

    pub fn with_id(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: String::new(),
            description: String::new(),
            license: String::new(),
        }
    }

    fn field(&self, delta_type: &str) -> &str {
        match delta_type {
            deltas::PROJECT_TITLE => &self.title,
            deltas::PROJECT_AUTHOR => &self.author,
            deltas::PROJECT_DESCRIPTION => &self.description,
            _ => &self.license,
        }
    }
}

impl TrackedItem for ProjectInfo {
    fn vcs_id(&self) -> &str {
        &self.id
    }

    fn vcs_type(&self) -> &str {
        item_types::PROJECT_INFO
    }

    fn vcs_name(&self) -> String {
        "Project info".to_string()
    }

    fn num_deltas(&self) -> usize {
        PROPERTY_DELTAS.len()
    }

    fn delta(&self, index: usize) -> Delta {
        let delta_type = PROPERTY_DELTAS[index];
        Delta::new(DeltaDescription::new(delta_type), delta_type)
    }

    fn delta_data(&self, index: usize) -> SerializedTree {
        let delta_type = PROPERTY_DELTAS[index];
        property_payload(delta_type, self.field(delta_type))
    }

    fn reset_state_to(&mut self, state: &dyn TrackedItem) {
        let read = |delta_type: &str| {
            find_delta_data(state, delta_type)
                .map(|d| d.get_string(VALUE, ""))
                .unwrap_or_default()
        };
        self.title = read(deltas::PROJECT_TITLE);
        self.author = read(deltas::PROJECT_AUTHOR);
        self.description = read(deltas::PROJECT_DESCRIPTION);
        self.license = read(deltas::PROJECT_LICENSE);
    }
}
