mod common;

use std::collections::HashSet;
use std::sync::mpsc;

use stave_core::persistence::exchange::{decode_subtree, encode_subtree};
use stave_core::project::Project;
use stave_core::vcs::{ItemStatus, RevisionId, TrackedItem, VcsNotification, VersionControl};
use stave_core::VcsError;
use stave_types::{AnnotationEvent, Note};

use common::{commit_all, lead_track, new_project, snapshots};

#[test]
fn test_fresh_project_has_no_changes() {
    let (vcs, project) = new_project();
    assert!(!vcs.has_changes(&project));
    assert_eq!(vcs.root().message, "Project created");
    assert_eq!(vcs.root().items.len(), 2);
}

#[test]
fn test_commit_without_changes_is_noop() {
    let (mut vcs, project) = new_project();
    assert!(commit_all(&mut vcs, &project, "nothing").is_none());
    assert!(vcs.commit(&[7], "out of range", &project).is_none());
    assert_eq!(vcs.tree().len(), 1);
}

#[test]
fn test_commit_moves_head_and_records_status() {
    let (mut vcs, mut project) = new_project();
    project.timeline.annotations.insert(AnnotationEvent::new("a1", 0.0, "Verse"));
    let track_id = project.add_track(lead_track());

    let changes = vcs.head_diff(&project);
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].status, ItemStatus::Changed);
    assert_eq!(changes[1].status, ItemStatus::Added);
    assert_eq!(changes[1].id(), track_id);

    let id = commit_all(&mut vcs, &project, "first ideas").unwrap();
    assert_eq!(vcs.head().revision(), &id);
    assert_eq!(vcs.revision(&id).map(|r| r.author.as_str()), Some("tester"));
    assert_eq!(vcs.tree().parent(&id).map(|r| &r.id), Some(&vcs.root().id));
    assert!(!vcs.has_changes(&project));

    let timeline_delta = &changes[0].snapshot.deltas[0];
    assert_eq!(timeline_delta.delta.description().to_string(), "added 1 annotations");
}

#[test]
fn test_commit_selected_items_only() {
    let (mut vcs, mut project) = new_project();
    project.info.title = "Renamed".into();
    project.add_track(lead_track());

    let changes = vcs.head_diff(&project);
    assert_eq!(changes.len(), 2);
    vcs.commit(&[1], "track only", &project).unwrap();

    let remaining = vcs.head_diff(&project);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id(), project.info.vcs_id());
}

#[test]
fn test_checkout_restores_each_revision() {
    let (mut vcs, mut project) = new_project();
    project.timeline.annotations.insert(AnnotationEvent::new("a1", 0.0, "Verse"));
    let first = commit_all(&mut vcs, &project, "verse").unwrap();
    let at_first = snapshots(&project);

    project.timeline.annotations.update(AnnotationEvent::new("a1", 0.0, "Verse 1"));
    project.timeline.annotations.insert(AnnotationEvent::new("a2", 8.0, "Chorus"));
    let track_id = project.add_track(lead_track());
    let second = commit_all(&mut vcs, &project, "chorus and lead").unwrap();
    let at_second = snapshots(&project);
    let lead = project.track(&track_id).cloned();

    assert!(vcs.checkout(&first, &mut project));
    common::assert_matches_snapshots(&project, &at_first);
    assert!(project.track(&track_id).is_none());
    assert_eq!(vcs.head().revision(), &first);
    assert!(!vcs.has_changes(&project));

    assert!(vcs.checkout(&second, &mut project));
    common::assert_matches_snapshots(&project, &at_second);
    assert_eq!(project.track(&track_id).cloned(), lead);

    assert!(!vcs.checkout(&RevisionId::from("missing"), &mut project));
    assert_eq!(vcs.head().revision(), &second);
}

#[test]
fn test_checkout_discards_uncommitted_edits() {
    let (mut vcs, mut project) = new_project();
    project.add_track(lead_track());
    let id = commit_all(&mut vcs, &project, "lead").unwrap();

    project.info.title = "Scratch".into();
    project.add_track(lead_track());
    assert!(vcs.checkout(&id, &mut project));
    assert_eq!(project.info.title, "Demo");
    assert_eq!(project.tracks().len(), 1);
}

#[test]
fn test_cherry_pick_only_touches_selected_items() {
    let (mut vcs, mut project) = new_project();
    project.timeline.annotations.insert(AnnotationEvent::new("a1", 0.0, "Intro"));
    let first = commit_all(&mut vcs, &project, "intro").unwrap();

    project.info.title = "Album cut".into();
    let track_id = project.add_track(lead_track());
    let second = commit_all(&mut vcs, &project, "lead").unwrap();

    assert!(vcs.checkout(&first, &mut project));
    assert!(vcs.cherry_pick(&second, &[track_id.clone()], &mut project));

    assert!(project.track(&track_id).is_some());
    assert_eq!(project.info.title, "Demo");
    assert_eq!(vcs.head().revision(), &first);

    let changes = vcs.head_diff(&project);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].status, ItemStatus::Added);

    assert!(!vcs.cherry_pick(&RevisionId::from("missing"), &[track_id], &mut project));
}

#[test]
fn test_cherry_pick_of_absent_item_deletes_it() {
    let (mut vcs, mut project) = new_project();
    let root = vcs.root().id.clone();
    let track_id = project.add_track(lead_track());
    commit_all(&mut vcs, &project, "lead").unwrap();

    assert!(vcs.cherry_pick(&root, &[track_id.clone()], &mut project));
    assert!(project.track(&track_id).is_none());
}

#[test]
fn test_reset_all_changes() {
    let (mut vcs, mut project) = new_project();
    let track_id = project.add_track(lead_track());
    commit_all(&mut vcs, &project, "lead").unwrap();
    let committed = snapshots(&project);

    project.info.title = "Changed".into();
    if let Some(notes) = project.track_mut(&track_id).and_then(|t| t.notes_mut()) {
        notes.remove("n2");
        notes.insert(Note::new("n4", 3.0, 72, 1.0));
    }
    project.add_track(lead_track());

    assert!(vcs.reset_all_changes(&mut project));
    common::assert_matches_snapshots(&project, &committed);
    assert!(!vcs.reset_all_changes(&mut project));
}

#[test]
fn test_reset_empties_items_that_cannot_be_deleted() {
    let mut vcs = VersionControl::new(common::settings());
    let mut project = Project::new("Demo");
    project
        .timeline
        .annotations
        .insert(AnnotationEvent::new("a1", 0.0, "Verse"));

    assert!(vcs.reset_all_changes(&mut project));
    assert!(project.timeline.annotations.is_empty());
    assert!(project.info.title.is_empty());
}

#[test]
fn test_reset_recreates_removed_item() {
    let (mut vcs, mut project) = new_project();
    let track_id = project.add_track(lead_track());
    commit_all(&mut vcs, &project, "lead").unwrap();
    let lead = project.track(&track_id).cloned();

    project.remove_track(&track_id);
    let changes = vcs.head_diff(&project);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].status, ItemStatus::Removed);

    assert!(vcs.reset_changes(&[0], &mut project));
    assert_eq!(project.track(&track_id).cloned(), lead);
}

#[test]
fn test_move_head_leaves_live_items() {
    let (mut vcs, mut project) = new_project();
    let root = vcs.root().id.clone();
    project.add_track(lead_track());
    commit_all(&mut vcs, &project, "lead").unwrap();

    assert!(vcs.move_head(&root));
    assert_eq!(project.tracks().len(), 1);
    assert!(vcs.has_changes(&project));
    assert!(!vcs.move_head(&RevisionId::from("missing")));
}

#[test]
fn test_history_stays_a_tree() {
    let (mut vcs, mut project) = new_project();
    let mut ids = Vec::new();

    for i in 0..3 {
        project
            .timeline
            .annotations
            .insert(AnnotationEvent::new(format!("m{}", i), i as f32 * 4.0, "marker"));
        ids.push(commit_all(&mut vcs, &project, &format!("marker {}", i)).unwrap());
    }

    // branch off the first commit twice
    for branch in 0..2 {
        assert!(vcs.checkout(&ids[0], &mut project));
        project.info.title = format!("Branch {}", branch);
        ids.push(commit_all(&mut vcs, &project, "branch").unwrap());
    }
    assert!(vcs.cherry_pick(&ids[2], &[project.timeline.vcs_id().to_string()], &mut project));
    ids.push(commit_all(&mut vcs, &project, "picked markers").unwrap());

    let tree = vcs.tree();
    assert_eq!(tree.len(), ids.len() + 1);
    assert_eq!(vcs.children(&ids[0]).len(), 3);

    let mut seen = HashSet::new();
    for (_, revision) in tree.iter() {
        assert!(seen.insert(revision.id.clone()), "revision visited twice");
        if revision.id != tree.root().id {
            let parent = tree.parent(&revision.id).expect("non-root revision has a parent");
            let siblings = tree.children(&parent.id);
            assert_eq!(siblings.iter().filter(|r| r.id == revision.id).count(), 1);
        }
    }
    assert_eq!(seen.len(), tree.len());
}

#[test]
fn test_quick_amend_replaces_head_entry() {
    let (mut vcs, mut project) = new_project();
    project.info.title = "Final title".into();
    vcs.quick_amend_item(&project.info);

    assert!(!vcs.has_changes(&project));
    assert_eq!(vcs.root().items.len(), 2);
}

#[test]
fn test_notifications_follow_mutations() {
    let (tx, rx) = mpsc::channel();
    let (vcs, mut project) = new_project();
    let mut vcs = VersionControl::from_pack(vcs.to_pack(), common::settings()).with_notifier(tx);

    project.add_track(lead_track());
    let id = commit_all(&mut vcs, &project, "lead").unwrap();
    assert_eq!(rx.try_recv(), Ok(VcsNotification::StateChanged));

    assert!(vcs.checkout(&id, &mut project));
    assert_eq!(rx.try_recv(), Ok(VcsNotification::StateChanged));

    assert!(commit_all(&mut vcs, &project, "nothing").is_none());
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_append_subtree_from_another_replica() {
    let (mut local, mut project) = new_project();
    let mut remote = VersionControl::from_pack(local.to_pack(), common::settings());
    let root = local.root().id.clone();

    project.add_track(lead_track());
    let shared = commit_all(&mut local, &project, "lead").unwrap();
    project.info.title = "Remix".into();
    commit_all(&mut local, &project, "remix").unwrap();

    let json = encode_subtree(&local.tree().subtree(&shared).unwrap()).unwrap();
    remote.append_subtree(decode_subtree(&json).unwrap(), &root).unwrap();
    assert_eq!(remote.tree().len(), 3);
    assert_eq!(remote.path_to(&local.head().revision().clone()).len(), 3);

    // receiving the same subtree again changes nothing
    remote.append_subtree(decode_subtree(&json).unwrap(), &root).unwrap();
    assert_eq!(remote.tree().len(), 3);

    let elsewhere = remote.tree().subtree(&shared).unwrap();
    let err = remote
        .append_subtree(elsewhere, local.head().revision())
        .unwrap_err();
    assert!(matches!(err, VcsError::HistoryCorrupted(_)));

    assert!(remote.checkout(local.head().revision(), &mut project));
    assert_eq!(project.info.title, "Remix");
}
