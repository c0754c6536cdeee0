//! SQL schema for the urgencias SQLite store.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per worksheet: its header and current revision.
CREATE TABLE IF NOT EXISTS worksheets (
    name         TEXT PRIMARY KEY,
    revision     INTEGER NOT NULL CHECK (revision > 0),
    columns_json TEXT NOT NULL      -- JSON array of header strings
);

-- Worksheet rows, replaced wholesale on every write.
CREATE TABLE IF NOT EXISTS worksheet_rows (
    worksheet  TEXT NOT NULL REFERENCES worksheets(name),
    position   INTEGER NOT NULL,    -- 0-based row order
    cells_json TEXT NOT NULL,       -- JSON array of string-or-null
    PRIMARY KEY (worksheet, position)
);

PRAGMA user_version = 1;
";
