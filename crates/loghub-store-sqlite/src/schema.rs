//! SQL schema for the loghub SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS imports (
    import_id             TEXT PRIMARY KEY,
    kind                  TEXT NOT NULL,   -- 'file' | 'service'
    format                TEXT NOT NULL,
    status                TEXT NOT NULL,   -- 'pending' | 'done' | 'cancelled'
    checksum              TEXT NOT NULL,   -- hex SHA-256 of the raw payload
    file_name             TEXT,
    station_callsign      TEXT,
    notes                 TEXT,
    accepted_count        INTEGER NOT NULL DEFAULT 0,
    rejected_count        INTEGER NOT NULL DEFAULT 0,
    committed_count       INTEGER NOT NULL DEFAULT 0,
    commit_rejected_count INTEGER NOT NULL DEFAULT 0,
    payload               BLOB NOT NULL,   -- zstd-compressed upload
    created_at            TEXT NOT NULL,
    updated_at            TEXT NOT NULL,
    completed_at          TEXT
);

-- Staged rows live only while their import is pending.
CREATE TABLE IF NOT EXISTS staged_entries (
    entry_id    TEXT PRIMARY KEY,
    import_id   TEXT NOT NULL REFERENCES imports(import_id) ON DELETE CASCADE,
    position    INTEGER NOT NULL,   -- record index within the payload
    callsign    TEXT NOT NULL,
    qso_json    TEXT NOT NULL,
    extras_json TEXT NOT NULL
);

-- Committed entries outlive their import.
CREATE TABLE IF NOT EXISTS log_entries (
    entry_id   TEXT PRIMARY KEY,
    import_id  TEXT REFERENCES imports(import_id) ON DELETE SET NULL,
    callsign   TEXT NOT NULL,
    qso_date   TEXT NOT NULL,   -- YYYYMMDD
    time_on    TEXT NOT NULL,   -- HHMMSS
    band       TEXT NOT NULL,
    mode       TEXT NOT NULL,
    qso_json   TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS log_entry_extras (
    entry_id  TEXT PRIMARY KEY REFERENCES log_entries(entry_id) ON DELETE CASCADE,
    data_json TEXT NOT NULL DEFAULT '{}'
);

CREATE TABLE IF NOT EXISTS remote_entries (
    provider   TEXT NOT NULL,
    remote_id  TEXT NOT NULL,
    callsign   TEXT NOT NULL,
    frequency  REAL,
    mode       TEXT NOT NULL,
    timestamp  TEXT,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (provider, remote_id)
);

CREATE INDEX IF NOT EXISTS staged_import_idx ON staged_entries(import_id, position);
CREATE INDEX IF NOT EXISTS log_callsign_idx  ON log_entries(callsign);
CREATE INDEX IF NOT EXISTS log_when_idx      ON log_entries(qso_date, time_on);
CREATE INDEX IF NOT EXISTS log_import_idx    ON log_entries(import_id);

PRAGMA user_version = 1;
";
