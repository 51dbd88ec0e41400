//! The history engine: tracked items, per-type diff logic, the revision
//! tree, head, stashes, and the [`VersionControl`] façade over them.

pub mod diff;
pub mod head;
pub mod revision;
pub mod stashes;
pub mod tracked;
mod version_control;

pub use diff::{diff_logic_for, Diff, DiffLogic};
pub use head::Head;
pub use revision::{ItemStatus, Revision, RevisionId, RevisionItem, RevisionTree, SubtreeNode};
pub use stashes::StashesRepository;
pub use tracked::{item_types, ItemSnapshot, TrackedItem, TrackedItemsSource};
pub use version_control::{VcsNotification, VersionControl};
