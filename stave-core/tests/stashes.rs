mod common;

use stave_core::vcs::ItemStatus;
use stave_types::{AnnotationEvent, Note};

use common::{assert_matches_snapshots, commit_all, lead_track, new_project, snapshots};

#[test]
fn test_stash_then_apply_restores_exact_state() {
    let (mut vcs, mut project) = new_project();
    let track_id = project.add_track(lead_track());
    project.timeline.annotations.insert(AnnotationEvent::new("a1", 0.0, "Verse"));
    commit_all(&mut vcs, &project, "base").unwrap();
    let committed = snapshots(&project);

    // edits across every kind of change
    if let Some(track) = project.track_mut(&track_id) {
        track.name = "Lead 2".into();
        track.mute = true;
        if let Some(notes) = track.notes_mut() {
            notes.remove("n1");
            notes.update(Note::new("n2", 1.0, 65, 0.5));
            notes.insert(Note::new("n9", 4.0, 72, 2.0));
        }
    }
    project.timeline.annotations.update(AnnotationEvent::new("a1", 0.0, "Verse 1"));
    project.timeline.annotations.insert(AnnotationEvent::new("a2", 8.0, "Chorus"));
    project.info.title = "Work in progress".into();
    project.add_track(lead_track());
    let edited = snapshots(&project);

    let all: Vec<usize> = (0..vcs.head_diff(&project).len()).collect();
    assert_eq!(all.len(), 4);
    let stash = vcs.stash(&all, "wip", false, &mut project).unwrap();

    assert_matches_snapshots(&project, &committed);
    assert!(!vcs.has_changes(&project));
    assert_eq!(vcs.stashes().len(), 1);

    assert!(vcs.apply_stash(&stash, false, &mut project));
    assert_matches_snapshots(&project, &edited);
    assert!(vcs.stashes().is_empty());
    assert!(!vcs.apply_stash(&stash, false, &mut project));
}

#[test]
fn test_stash_keep_changes_leaves_live_items() {
    let (mut vcs, mut project) = new_project();
    project.add_track(lead_track());
    let before = snapshots(&project);

    let stash = vcs.stash(&[0], "keep", true, &mut project).unwrap();
    assert_matches_snapshots(&project, &before);

    assert!(vcs.apply_stash(&stash, true, &mut project));
    assert_eq!(vcs.stashes().len(), 1);
    assert_matches_snapshots(&project, &before);
}

#[test]
fn test_stash_without_changes_is_noop() {
    let (mut vcs, mut project) = new_project();
    assert!(vcs.stash(&[0], "empty", false, &mut project).is_none());
    assert!(vcs.stashes().is_empty());
}

#[test]
fn test_stashed_removal_round_trip() {
    let (mut vcs, mut project) = new_project();
    let track_id = project.add_track(lead_track());
    commit_all(&mut vcs, &project, "lead").unwrap();

    project.remove_track(&track_id);
    let changes = vcs.head_diff(&project);
    assert_eq!(changes[0].status, ItemStatus::Removed);

    let stash = vcs.stash(&[0], "drop lead", false, &mut project).unwrap();
    assert!(project.track(&track_id).is_some());

    assert!(vcs.apply_stash(&stash, false, &mut project));
    assert!(project.track(&track_id).is_none());
}

#[test]
fn test_stash_applies_onto_newer_head() {
    let (mut vcs, mut project) = new_project();
    let track_id = project.add_track(lead_track());
    commit_all(&mut vcs, &project, "lead").unwrap();

    if let Some(notes) = project.track_mut(&track_id).and_then(|t| t.notes_mut()) {
        notes.insert(Note::new("n5", 5.0, 60, 1.0));
    }
    let stash = vcs.stash(&[0], "extra note", false, &mut project).unwrap();

    project.timeline.annotations.insert(AnnotationEvent::new("a1", 0.0, "Intro"));
    commit_all(&mut vcs, &project, "intro").unwrap();

    assert!(vcs.apply_stash(&stash, false, &mut project));
    let track = project.track(&track_id).unwrap();
    let ids: Vec<&str> = match &track.sequence {
        stave_core::project::TrackSequence::Piano(notes) => {
            notes.events().iter().map(|n| n.id.as_str()).collect()
        }
        _ => Vec::new(),
    };
    assert_eq!(ids, vec!["n1", "n2", "n3", "n5"]);
    assert_eq!(project.timeline.annotations.len(), 1);
}

#[test]
fn test_quick_stash_round_trip() {
    let (mut vcs, mut project) = new_project();
    assert!(!vcs.quick_stash_all(&mut project));
    project.info.title = "Preview".into();
    project.add_track(lead_track());
    let edited = snapshots(&project);

    assert!(vcs.quick_stash_all(&mut project));
    assert!(vcs.has_quick_stash());
    assert_eq!(project.info.title, "Demo");
    assert!(project.tracks().is_empty());
    assert_eq!(
        vcs.stashes().quick_stash().map(|s| s.message.as_str()),
        Some("Quick stash")
    );

    assert!(vcs.apply_quick_stash(&mut project));
    assert!(!vcs.has_quick_stash());
    assert_matches_snapshots(&project, &edited);
    assert!(!vcs.apply_quick_stash(&mut project));
}
