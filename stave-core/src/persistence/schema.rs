use rusqlite::{Connection, Result as SqlResult};

/// Schema version of the history database.
pub const SCHEMA_VERSION: i32 = 1;

/// `revisions.kind` values.
pub const KIND_HISTORY: &str = "history";
pub const KIND_STASH: &str = "stash";
pub const KIND_QUICK_STASH: &str = "quick_stash";

pub fn create_tables(conn: &Connection) -> SqlResult<()> {
    conn.execute_batch(SCHEMA_SQL)
}

/// Delete all data from all tables (preserving schema).
pub fn delete_all_data(conn: &Connection) -> SqlResult<()> {
    conn.execute_batch(DELETE_ALL_SQL)
}

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

-- history revisions form a tree through parent_id; stashes have none
CREATE TABLE IF NOT EXISTS revisions (
    id TEXT PRIMARY KEY,
    parent_id TEXT,
    kind TEXT NOT NULL,
    position INTEGER NOT NULL,
    message TEXT NOT NULL,
    author TEXT NOT NULL DEFAULT '',
    timestamp INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS revision_items (
    revision_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    item_id TEXT NOT NULL,
    item_type TEXT NOT NULL,
    name TEXT NOT NULL,
    status TEXT NOT NULL,
    PRIMARY KEY (revision_id, position)
);

CREATE TABLE IF NOT EXISTS item_deltas (
    revision_id TEXT NOT NULL,
    item_position INTEGER NOT NULL,
    position INTEGER NOT NULL,
    delta_type TEXT NOT NULL,
    description TEXT NOT NULL,
    num_changes INTEGER NOT NULL,
    payload BLOB NOT NULL,
    PRIMARY KEY (revision_id, item_position, position)
);

CREATE TABLE IF NOT EXISTS head (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    revision_id TEXT NOT NULL
);
";

const DELETE_ALL_SQL: &str = "
DELETE FROM schema_version;
DELETE FROM revisions;
DELETE FROM revision_items;
DELETE FROM item_deltas;
DELETE FROM head;
";
