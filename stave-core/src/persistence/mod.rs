//! Persisting history: the [`Pack`] tree form, SQLite storage, and JSON
//! subtree exchange.

mod blob;
pub mod exchange;
pub mod load;
pub mod pack;
pub mod save;
pub mod schema;

pub use pack::Pack;

use std::path::Path;

use rusqlite::Connection as SqlConnection;

use crate::config::StorageOptions;
use crate::error::{VcsError, VcsResult};

/// Save a pack to a SQLite database, replacing its previous contents.
///
/// Runs inside one transaction, so an interrupted save leaves the previous
/// history intact.
pub fn save_pack(path: &Path, pack: &Pack, options: &StorageOptions) -> VcsResult<()> {
    let conn = SqlConnection::open(path)?;
    if options.wal {
        conn.pragma_update(None, "journal_mode", "WAL")?;
    }

    let tx = conn.unchecked_transaction()?;
    schema::create_tables(&tx)?;
    save::save_relational(&tx, pack)?;
    tx.commit()?;

    log::debug!(target: "pack", "saved {} revision(s) to {}", pack.tree.len(), path.display());
    Ok(())
}

pub fn load_pack(path: &Path) -> VcsResult<Pack> {
    let conn = SqlConnection::open(path)?;

    let has_schema_version: bool = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
        [],
        |row| row.get::<_, i64>(0),
    )? > 0;
    if !has_schema_version {
        return Err(VcsError::NotFound(format!("history in {}", path.display())));
    }

    let pack = load::load_relational(&conn)?;
    log::debug!(target: "pack", "loaded {} revision(s) from {}", pack.tree.len(), path.display());
    Ok(pack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcs::diff::properties::property_delta;
    use crate::vcs::{
        ItemSnapshot, ItemStatus, Revision, RevisionId, RevisionItem, RevisionTree,
        StashesRepository,
    };
    use stave_types::{serialize_events, AnnotationEvent, Delta, DeltaDescription, DeltaDiff};

    fn revision(id: &str, items: Vec<RevisionItem>) -> Revision {
        let mut r = Revision::new(format!("message {}", id), "ada", items);
        r.id = RevisionId::from(id);
        r
    }

    fn sample_pack() -> Pack {
        let description = DeltaDescription::with_count("added {x} annotations", 1);
        let annotations =
            serialize_events("annotationsAdded", &[AnnotationEvent::new("a1", 0.0, "Verse")]);
        let timeline = ItemSnapshot::new("timeline", "ProjectTimeline", "Timeline").with_deltas(
            vec![DeltaDiff::new(Delta::new(description, "annotationsAdded"), annotations)],
        );
        let info = ItemSnapshot::new("info", "ProjectInfo", "Info")
            .with_deltas(vec![property_delta("projectTitle", "Demo")]);

        let mut tree = RevisionTree::new(revision(
            "root",
            vec![
                RevisionItem::new(ItemStatus::Added, timeline.clone()),
                RevisionItem::new(ItemStatus::Added, info),
            ],
        ));
        let changed = RevisionItem::new(ItemStatus::Changed, timeline.clone());
        tree.append(&"root".into(), revision("a", vec![changed])).unwrap();
        tree.append(&"a".into(), revision("b", Vec::new())).unwrap();
        let removed = RevisionItem::new(ItemStatus::Removed, timeline);
        tree.append(&"root".into(), revision("c", vec![removed])).unwrap();

        let mut stashes = StashesRepository::new();
        stashes.add(revision("s2", Vec::new()));
        stashes.add(revision("s1", Vec::new()));
        stashes.set_quick_stash(revision("q", Vec::new()));

        Pack {
            tree,
            head: "b".into(),
            stashes,
        }
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.stave");
        let pack = sample_pack();

        save_pack(&path, &pack, &StorageOptions::default()).unwrap();
        let loaded = load_pack(&path).unwrap();

        assert!(loaded.serialize().is_equivalent_to(&pack.serialize()));
        assert_eq!(loaded.head.as_str(), "b");
        let stash_ids: Vec<&str> = loaded.stashes.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(stash_ids, vec!["s1", "s2"]);
    }

    #[test]
    fn saving_twice_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.stave");
        let mut pack = sample_pack();
        save_pack(&path, &pack, &StorageOptions { wal: false }).unwrap();

        pack.tree.append(&"c".into(), revision("d", Vec::new())).unwrap();
        pack.head = "d".into();
        save_pack(&path, &pack, &StorageOptions { wal: false }).unwrap();

        let loaded = load_pack(&path).unwrap();
        assert_eq!(loaded.tree.len(), 5);
        assert_eq!(loaded.head.as_str(), "d");
    }

    #[test]
    fn loading_an_empty_database_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.stave");
        assert!(matches!(load_pack(&path), Err(VcsError::NotFound(_))));
    }

    #[test]
    fn missing_parent_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.stave");
        save_pack(&path, &sample_pack(), &StorageOptions::default()).unwrap();

        let conn = SqlConnection::open(&path).unwrap();
        conn.execute("UPDATE revisions SET parent_id = 'ghost' WHERE id = 'b'", [])
            .unwrap();
        drop(conn);

        assert!(matches!(load_pack(&path), Err(VcsError::HistoryCorrupted(_))));
    }

    #[test]
    fn cycle_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.stave");
        save_pack(&path, &sample_pack(), &StorageOptions::default()).unwrap();

        let conn = SqlConnection::open(&path).unwrap();
        conn.execute("UPDATE revisions SET parent_id = 'b' WHERE id = 'a'", [])
            .unwrap();
        drop(conn);

        assert!(matches!(load_pack(&path), Err(VcsError::HistoryCorrupted(_))));
    }

    #[test]
    fn second_root_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.stave");
        save_pack(&path, &sample_pack(), &StorageOptions::default()).unwrap();

        let conn = SqlConnection::open(&path).unwrap();
        conn.execute("UPDATE revisions SET parent_id = NULL WHERE id = 'c'", [])
            .unwrap();
        drop(conn);

        assert!(matches!(load_pack(&path), Err(VcsError::HistoryCorrupted(_))));
    }

    #[test]
    fn newer_schema_version_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.stave");
        save_pack(&path, &sample_pack(), &StorageOptions::default()).unwrap();

        let conn = SqlConnection::open(&path).unwrap();
        conn.execute("UPDATE schema_version SET version = 99", []).unwrap();
        drop(conn);

        let err = load_pack(&path).unwrap_err();
        assert!(matches!(err, VcsError::HistoryCorrupted(_)));
        assert!(err.is_fatal());
    }
}
