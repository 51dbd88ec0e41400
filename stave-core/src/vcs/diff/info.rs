use super::properties::PropertyDelta;
use super::{DiffLogic, DiffSchema};
use crate::vcs::tracked::item_types;

pub mod project_info_deltas {
    pub const PROJECT_TITLE: &str = "projectTitle";
    pub const PROJECT_AUTHOR: &str = "projectAuthor";
    pub const PROJECT_DESCRIPTION: &str = "projectDescription";
    pub const PROJECT_LICENSE: &str = "projectLicense";
}

/// Project metadata: title, author, description, license.
pub struct ProjectInfoDiffLogic;

static INFO_SCHEMA: DiffSchema = DiffSchema {
    event_kinds: &[],
    properties: &[
        PropertyDelta {
            delta_type: project_info_deltas::PROJECT_TITLE,
            description: "renamed project",
        },
        PropertyDelta {
            delta_type: project_info_deltas::PROJECT_AUTHOR,
            description: "changed author",
        },
        PropertyDelta {
            delta_type: project_info_deltas::PROJECT_DESCRIPTION,
            description: "changed description",
        },
        PropertyDelta {
            delta_type: project_info_deltas::PROJECT_LICENSE,
            description: "changed license",
        },
    ],
};

impl DiffLogic for ProjectInfoDiffLogic {
    fn vcs_type(&self) -> &'static str {
        item_types::PROJECT_INFO
    }

    fn schema(&self) -> &'static DiffSchema {
        &INFO_SCHEMA
    }
}
