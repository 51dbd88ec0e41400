use rusqlite::{params, Connection};

use crate::error::VcsResult;
use crate::vcs::{Revision, RevisionTree, StashesRepository};

use super::blob::encode_payload;
use super::pack::Pack;
use super::schema::{self, KIND_HISTORY, KIND_QUICK_STASH, KIND_STASH, SCHEMA_VERSION};

/// Save a pack to relational tables. Performs DELETE-all + INSERT-current.
pub fn save_relational(conn: &Connection, pack: &Pack) -> VcsResult<()> {
    schema::delete_all_data(conn)?;

    conn.execute(
        "INSERT INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
        params![SCHEMA_VERSION],
    )?;

    save_history(conn, &pack.tree)?;
    save_stashes(conn, &pack.stashes)?;

    conn.execute(
        "INSERT INTO head (id, revision_id) VALUES (1, ?1)",
        params![pack.head.as_str()],
    )?;

    Ok(())
}

// ============================================================
// History
// ============================================================

fn save_history(conn: &Connection, tree: &RevisionTree) -> VcsResult<()> {
    let mut stack: Vec<(Option<&str>, usize, &Revision)> = vec![(None, 0, tree.root())];

    while let Some((parent, position, revision)) = stack.pop() {
        save_revision(conn, revision, parent, KIND_HISTORY, position)?;
        for (pos, child) in tree.children(&revision.id).into_iter().enumerate().rev() {
            stack.push((Some(revision.id.as_str()), pos, child));
        }
    }
    Ok(())
}

fn save_stashes(conn: &Connection, stashes: &StashesRepository) -> VcsResult<()> {
    for (pos, stash) in stashes.iter().enumerate() {
        save_revision(conn, stash, None, KIND_STASH, pos)?;
    }
    if let Some(stash) = stashes.quick_stash() {
        save_revision(conn, stash, None, KIND_QUICK_STASH, 0)?;
    }
    Ok(())
}

fn save_revision(
    conn: &Connection,
    revision: &Revision,
    parent: Option<&str>,
    kind: &str,
    position: usize,
) -> VcsResult<()> {
    conn.execute(
        "INSERT INTO revisions (id, parent_id, kind, position, message, author, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            revision.id.as_str(),
            parent,
            kind,
            position as i64,
            revision.message,
            revision.author,
            revision.timestamp,
        ],
    )?;

    for (item_pos, item) in revision.items.iter().enumerate() {
        conn.execute(
            "INSERT INTO revision_items (revision_id, position, item_id, item_type, name, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                revision.id.as_str(),
                item_pos as i64,
                item.snapshot.id,
                item.snapshot.vcs_type,
                item.snapshot.name,
                item.status.as_str(),
            ],
        )?;

        for (delta_pos, delta) in item.snapshot.deltas.iter().enumerate() {
            let description = delta.delta.description();
            conn.execute(
                "INSERT INTO item_deltas (revision_id, item_position, position, delta_type,
                                          description, num_changes, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    revision.id.as_str(),
                    item_pos as i64,
                    delta_pos as i64,
                    delta.delta_type(),
                    description.text,
                    description.num_changes,
                    encode_payload(&delta.data)?,
                ],
            )?;
        }
    }
    Ok(())
}
