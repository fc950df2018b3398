//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. The QSO and its extras are
//! stored as compact JSON; the columns used for filtering and ordering are
//! denormalized beside them. UUIDs are stored as hyphenated lowercase
//! strings.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use loghub_core::{
  import::{Import, ImportKind, ImportStatus, StagedEntry},
  log::LogEntry,
  qso::{Extras, Qso},
  remote::RemoteEntry,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_status(s: &str) -> Result<ImportStatus> {
  ImportStatus::from_str(s).map_err(|_| Error::Decode(format!("unknown import status: {s:?}")))
}

pub fn decode_kind(s: &str) -> Result<ImportKind> {
  ImportKind::from_str(s).map_err(|_| Error::Decode(format!("unknown import kind: {s:?}")))
}

// ─── QSO payloads ────────────────────────────────────────────────────────────

/// A QSO ready for insertion: JSON payloads plus the denormalized columns.
pub struct EncodedQso {
  pub callsign:    String,
  pub qso_date:    String,
  pub time_on:     String,
  pub band:        String,
  pub mode:        String,
  pub qso_json:    String,
  pub extras_json: String,
}

impl EncodedQso {
  pub fn new(qso: &Qso, extras: &Extras) -> Result<Self> {
    Ok(Self {
      callsign:    qso.callsign.clone(),
      qso_date:    qso.get("QSO_DATE").unwrap_or_default(),
      time_on:     qso.get("TIME_ON").unwrap_or_default(),
      band:        qso.band.clone(),
      mode:        qso.mode.clone(),
      qso_json:    serde_json::to_string(qso)?,
      extras_json: serde_json::to_string(extras)?,
    })
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawImport::from_row`].
pub const IMPORT_COLUMNS: &str = "import_id, kind, format, status, checksum, file_name, \
   station_callsign, notes, accepted_count, rejected_count, committed_count, \
   commit_rejected_count, created_at, updated_at, completed_at";

/// Raw values read directly from an `imports` row.
pub struct RawImport {
  pub import_id:             String,
  pub kind:                  String,
  pub format:                String,
  pub status:                String,
  pub checksum:              String,
  pub file_name:             Option<String>,
  pub station_callsign:      Option<String>,
  pub notes:                 Option<String>,
  pub accepted_count:        u32,
  pub rejected_count:        u32,
  pub committed_count:       u32,
  pub commit_rejected_count: u32,
  pub created_at:            String,
  pub updated_at:            String,
  pub completed_at:          Option<String>,
}

impl RawImport {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      import_id:             row.get(0)?,
      kind:                  row.get(1)?,
      format:                row.get(2)?,
      status:                row.get(3)?,
      checksum:              row.get(4)?,
      file_name:             row.get(5)?,
      station_callsign:      row.get(6)?,
      notes:                 row.get(7)?,
      accepted_count:        row.get(8)?,
      rejected_count:        row.get(9)?,
      committed_count:       row.get(10)?,
      commit_rejected_count: row.get(11)?,
      created_at:            row.get(12)?,
      updated_at:            row.get(13)?,
      completed_at:          row.get(14)?,
    })
  }

  pub fn into_import(self) -> Result<Import> {
    Ok(Import {
      import_id:             decode_uuid(&self.import_id)?,
      kind:                  decode_kind(&self.kind)?,
      format:                self.format,
      status:                decode_status(&self.status)?,
      checksum:              self.checksum,
      file_name:             self.file_name,
      station_callsign:      self.station_callsign,
      notes:                 self.notes,
      accepted_count:        self.accepted_count,
      rejected_count:        self.rejected_count,
      committed_count:       self.committed_count,
      commit_rejected_count: self.commit_rejected_count,
      created_at:            decode_dt(&self.created_at)?,
      updated_at:            decode_dt(&self.updated_at)?,
      completed_at:          self.completed_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw values read directly from a `staged_entries` row.
pub struct RawStaged {
  pub entry_id:    String,
  pub import_id:   String,
  pub qso_json:    String,
  pub extras_json: String,
}

impl RawStaged {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry_id:    row.get(0)?,
      import_id:   row.get(1)?,
      qso_json:    row.get(2)?,
      extras_json: row.get(3)?,
    })
  }

  pub fn into_staged(self) -> Result<StagedEntry> {
    Ok(StagedEntry {
      entry_id:  decode_uuid(&self.entry_id)?,
      import_id: decode_uuid(&self.import_id)?,
      qso:       serde_json::from_str(&self.qso_json)?,
      extras:    serde_json::from_str(&self.extras_json)?,
    })
  }
}

/// Column list matching [`RawLogEntry::from_row`]; expects `log_entries e`
/// left-joined with `log_entry_extras x`.
pub const LOG_ENTRY_COLUMNS: &str =
  "e.entry_id, e.import_id, e.qso_json, x.data_json, e.created_at, e.updated_at";

/// Raw values read from a `log_entries` row joined with its extras.
pub struct RawLogEntry {
  pub entry_id:    String,
  pub import_id:   Option<String>,
  pub qso_json:    String,
  pub extras_json: Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawLogEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry_id:    row.get(0)?,
      import_id:   row.get(1)?,
      qso_json:    row.get(2)?,
      extras_json: row.get(3)?,
      created_at:  row.get(4)?,
      updated_at:  row.get(5)?,
    })
  }

  pub fn into_entry(self) -> Result<LogEntry> {
    let extras = match self.extras_json {
      Some(json) => serde_json::from_str(&json)?,
      None => Extras::new(),
    };
    Ok(LogEntry {
      entry_id: decode_uuid(&self.entry_id)?,
      import_id: self.import_id.as_deref().map(decode_uuid).transpose()?,
      qso: serde_json::from_str(&self.qso_json)?,
      extras,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `remote_entries` row.
pub struct RawRemote {
  pub provider:   String,
  pub remote_id:  String,
  pub callsign:   String,
  pub frequency:  Option<f64>,
  pub mode:       String,
  pub timestamp:  Option<String>,
  pub updated_at: String,
}

impl RawRemote {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      provider:   row.get(0)?,
      remote_id:  row.get(1)?,
      callsign:   row.get(2)?,
      frequency:  row.get(3)?,
      mode:       row.get(4)?,
      timestamp:  row.get(5)?,
      updated_at: row.get(6)?,
    })
  }

  pub fn into_remote(self) -> Result<RemoteEntry> {
    Ok(RemoteEntry {
      provider:   self.provider,
      remote_id:  self.remote_id,
      callsign:   self.callsign,
      frequency:  self.frequency,
      mode:       self.mode,
      timestamp:  self.timestamp,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
