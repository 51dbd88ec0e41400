#![allow(dead_code)]

use stave_core::config::VcsSettings;
use stave_core::project::{MidiTrack, Project};
use stave_core::vcs::{ItemSnapshot, RevisionId, TrackedItem, TrackedItemsSource, VersionControl};
use stave_types::Note;

pub fn settings() -> VcsSettings {
    VcsSettings {
        author: "tester".to_string(),
        ..VcsSettings::default()
    }
}

/// Fresh history whose root revision holds the project's initial items.
pub fn new_project() -> (VersionControl, Project) {
    let mut vcs = VersionControl::new(settings());
    let project = Project::new("Demo");
    vcs.quick_amend_item(&project.info);
    vcs.quick_amend_item(&project.timeline);
    (vcs, project)
}

pub fn commit_all(
    vcs: &mut VersionControl,
    project: &Project,
    message: &str,
) -> Option<RevisionId> {
    let all: Vec<usize> = (0..vcs.head_diff(project).len()).collect();
    vcs.commit(&all, message, project)
}

pub fn lead_track() -> MidiTrack {
    let mut track = MidiTrack::piano("Lead");
    if let Some(notes) = track.notes_mut() {
        notes.insert(Note::new("n1", 0.0, 60, 1.0));
        notes.insert(Note::new("n2", 1.0, 64, 1.0));
        notes.insert(Note::new("n3", 2.0, 67, 1.0));
    }
    track
}

pub fn snapshots(project: &Project) -> Vec<ItemSnapshot> {
    (0..project.num_tracked_items())
        .filter_map(|i| project.tracked_item(i))
        .map(|item| item.snapshot())
        .collect()
}

/// Every snapshot has a live item with equivalent content, and vice versa.
pub fn assert_matches_snapshots(project: &Project, expected: &[ItemSnapshot]) {
    assert_eq!(project.num_tracked_items(), expected.len());
    for snapshot in expected {
        let live = project
            .find_tracked_item(&snapshot.id)
            .unwrap_or_else(|| panic!("item {} missing", snapshot.id));
        assert!(
            live.snapshot().is_equivalent_to(snapshot),
            "item {} differs",
            snapshot.id
        );
    }
}
