//! SQL schema for the Stemma SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS trees (
    tree_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL CHECK (length(name) > 0),
    owner       TEXT NOT NULL,   -- hyphenated uuid of the creating user
    created_at  TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

-- parent_id and spouse_id are advisory links without foreign keys: the
-- display layer must stay usable over partially inconsistent data, and
-- cascade deletion is applied as one closure per transaction above this
-- table rather than row by row.
CREATE TABLE IF NOT EXISTS members (
    member_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    tree_id     INTEGER NOT NULL REFERENCES trees(tree_id),
    name        TEXT NOT NULL CHECK (length(name) > 0),
    dob         TEXT,            -- ISO 8601 calendar date
    gender      TEXT,            -- opaque; no enumeration enforced
    photo_url   TEXT,
    parent_id   INTEGER,
    spouse_id   INTEGER,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS members_tree_idx   ON members(tree_id);
CREATE INDEX IF NOT EXISTS members_parent_idx ON members(parent_id);
CREATE INDEX IF NOT EXISTS trees_owner_idx    ON trees(owner);

PRAGMA user_version = 1;
";
