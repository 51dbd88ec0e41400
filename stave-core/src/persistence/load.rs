use std::collections::HashMap;

use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult};
use stave_types::{Delta, DeltaDescription, DeltaDiff, SerializedTree};

use crate::error::{VcsError, VcsResult};
use crate::vcs::{
    ItemSnapshot, ItemStatus, Revision, RevisionId, RevisionItem, RevisionTree, StashesRepository,
};

use super::blob::decode_payload;
use super::pack::Pack;
use super::schema::{KIND_HISTORY, KIND_QUICK_STASH, KIND_STASH, SCHEMA_VERSION};

struct RevisionRow {
    id: String,
    parent_id: Option<String>,
    kind: String,
    position: i64,
    revision: Revision,
}

/// Load a pack from relational tables, checking that the history rows
/// form a single rooted tree.
pub fn load_relational(conn: &Connection) -> VcsResult<Pack> {
    let version: Option<i32> = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
        .optional()?
        .flatten();
    if let Some(version) = version {
        if version > SCHEMA_VERSION {
            return Err(VcsError::HistoryCorrupted(format!(
                "history format version {} is newer than supported ({})",
                version, SCHEMA_VERSION
            )));
        }
    }

    let mut items = load_items(conn)?;
    let mut rows = load_revisions(conn)?;
    for row in &mut rows {
        row.revision.items = items.remove(&row.id).unwrap_or_default();
    }

    let (history, rest): (Vec<RevisionRow>, Vec<RevisionRow>) =
        rows.into_iter().partition(|r| r.kind == KIND_HISTORY);
    let tree = build_tree(history)?;

    let head: Option<String> = conn
        .query_row("SELECT revision_id FROM head WHERE id = 1", [], |row| row.get(0))
        .optional()?;
    let head = head
        .map(RevisionId::from)
        .ok_or_else(|| VcsError::HistoryCorrupted("missing head".into()))?;
    if !tree.contains(&head) {
        return Err(VcsError::HistoryCorrupted(format!(
            "head {} is not in the revision tree",
            head
        )));
    }

    let mut stashes = StashesRepository::new();
    let (mut stash_rows, quick_rows): (Vec<RevisionRow>, Vec<RevisionRow>) =
        rest.into_iter().partition(|r| r.kind == KIND_STASH);
    stash_rows.sort_by_key(|r| r.position);
    for row in stash_rows {
        stashes.push_back(row.revision);
    }
    for row in quick_rows {
        if row.kind == KIND_QUICK_STASH {
            stashes.set_quick_stash(row.revision);
        } else {
            log::warn!(
                target: "pack",
                "revision {} has unknown kind '{}', skipping",
                row.id,
                row.kind
            );
        }
    }

    Ok(Pack {
        tree,
        head,
        stashes,
    })
}

fn build_tree(rows: Vec<RevisionRow>) -> VcsResult<RevisionTree> {
    let total = rows.len();
    let mut roots = Vec::new();
    let mut children: HashMap<String, Vec<RevisionRow>> = HashMap::new();
    for row in rows {
        match row.parent_id.clone() {
            Some(parent) => children.entry(parent).or_default().push(row),
            None => roots.push(row),
        }
    }

    if roots.len() != 1 {
        return Err(VcsError::HistoryCorrupted(format!(
            "expected one root revision, found {}",
            roots.len()
        )));
    }
    let root = roots.remove(0);
    let root_id = root.id.clone();
    let mut tree = RevisionTree::new(root.revision);

    let mut pending = vec![root_id];
    while let Some(parent) = pending.pop() {
        let Some(mut kids) = children.remove(&parent) else {
            continue;
        };
        kids.sort_by_key(|r| r.position);
        for row in kids {
            pending.push(row.id.clone());
            tree.append(&RevisionId::from(parent.as_str()), row.revision)?;
        }
    }

    // rows never reached from the root point at a missing parent or a cycle
    if tree.len() < total {
        let parent = children.keys().next().cloned().unwrap_or_default();
        return Err(VcsError::HistoryCorrupted(format!(
            "revision parent {} is missing or part of a cycle",
            parent
        )));
    }
    Ok(tree)
}

fn load_revisions(conn: &Connection) -> SqlResult<Vec<RevisionRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, parent_id, kind, position, message, author, timestamp
         FROM revisions ORDER BY kind, position",
    )?;
    let rows = stmt
        .query_map([], |row| {
            let id: String = row.get(0)?;
            Ok(RevisionRow {
                id: id.clone(),
                parent_id: row.get(1)?,
                kind: row.get(2)?,
                position: row.get(3)?,
                revision: Revision {
                    id: RevisionId::from(id),
                    message: row.get(4)?,
                    author: row.get(5)?,
                    timestamp: row.get(6)?,
                    items: Vec::new(),
                },
            })
        })?
        .collect::<SqlResult<_>>()?;
    Ok(rows)
}

/// Items of every revision, keyed by revision id, in stored order.
fn load_items(conn: &Connection) -> VcsResult<HashMap<String, Vec<RevisionItem>>> {
    let mut deltas = load_deltas(conn)?;

    let mut stmt = conn.prepare(
        "SELECT revision_id, position, item_id, item_type, name, status
         FROM revision_items ORDER BY revision_id, position",
    )?;
    let rows: Vec<(String, i64, String, String, String, String)> = stmt
        .query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?
        .collect::<SqlResult<_>>()?;

    let mut items: HashMap<String, Vec<RevisionItem>> = HashMap::new();
    for (revision_id, position, item_id, item_type, name, status) in rows {
        let item_deltas = deltas
            .remove(&(revision_id.clone(), position))
            .unwrap_or_default();
        let Some(status) = ItemStatus::parse(&status) else {
            log::warn!(
                target: "pack",
                "revision {}: item {} has unknown status '{}', skipping",
                revision_id,
                item_id,
                status
            );
            continue;
        };
        let snapshot = ItemSnapshot::new(item_id, item_type, name).with_deltas(item_deltas);
        items
            .entry(revision_id)
            .or_default()
            .push(RevisionItem::new(status, snapshot));
    }
    Ok(items)
}

fn load_deltas(conn: &Connection) -> VcsResult<HashMap<(String, i64), Vec<DeltaDiff>>> {
    let mut stmt = conn.prepare(
        "SELECT revision_id, item_position, delta_type, description, num_changes, payload
         FROM item_deltas ORDER BY revision_id, item_position, position",
    )?;
    let rows: Vec<(String, i64, String, String, i64, Vec<u8>)> = stmt
        .query_map(params![], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?
        .collect::<SqlResult<_>>()?;

    let mut deltas: HashMap<(String, i64), Vec<DeltaDiff>> = HashMap::new();
    for (revision_id, item_position, delta_type, description, num_changes, payload) in rows {
        let data = match decode_payload(&payload) {
            Ok(data) => data,
            Err(e) => {
                log::warn!(
                    target: "pack",
                    "revision {}: unreadable {} payload ({}), using empty",
                    revision_id,
                    delta_type,
                    e
                );
                SerializedTree::new(delta_type.as_str())
            }
        };
        let delta = Delta::new(DeltaDescription::with_count(description, num_changes), delta_type);
        deltas
            .entry((revision_id, item_position))
            .or_default()
            .push(DeltaDiff::new(delta, data));
    }
    Ok(deltas)
}
