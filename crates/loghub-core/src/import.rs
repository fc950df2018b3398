//! The import entity and its lifecycle types.
//!
//! An import starts `pending`, owns its staged entries, and transitions
//! exactly once to `done` (finalize) or `cancelled` (cancel). Both are
//! terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{
  catalog::CatalogWarning,
  classify::ClassifiedRecord,
  qso::{Extras, Qso},
  validate::Violation,
};

// ─── Status and kind ─────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ImportStatus {
  Pending,
  Done,
  Cancelled,
}

impl ImportStatus {
  pub fn is_terminal(self) -> bool { !matches!(self, Self::Pending) }
}

/// Where the payload came from: an uploaded file or a service push (N1MM).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ImportKind {
  File,
  Service,
}

// ─── Import ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Import {
  pub import_id:             Uuid,
  pub kind:                  ImportKind,
  /// Payload format, e.g. `adif` or `n1mm`.
  pub format:                String,
  pub status:                ImportStatus,
  /// Hex SHA-256 of the raw payload.
  pub checksum:              String,
  pub file_name:             Option<String>,
  pub station_callsign:      Option<String>,
  pub notes:                 Option<String>,
  /// Records that passed the staging gate.
  pub accepted_count:        u32,
  /// Records dropped at staging.
  pub rejected_count:        u32,
  /// Entries promoted to the log by finalize.
  pub committed_count:       u32,
  /// Staged entries skipped at finalize because they failed validation.
  pub commit_rejected_count: u32,
  pub created_at:            DateTime<Utc>,
  pub updated_at:            DateTime<Utc>,
  pub completed_at:          Option<DateTime<Utc>>,
}

/// Everything a store needs to persist a freshly parsed import.
#[derive(Debug, Clone)]
pub struct NewImport {
  pub kind:             ImportKind,
  pub format:           String,
  pub checksum:         String,
  pub file_name:        Option<String>,
  pub station_callsign: Option<String>,
  pub notes:            Option<String>,
  /// zstd-compressed raw payload.
  pub payload:          Vec<u8>,
  pub rejected_count:   u32,
  pub staged:           Vec<ClassifiedRecord>,
}

/// Caller-supplied metadata for a new import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
  pub kind:             ImportKind,
  pub format:           String,
  #[serde(default)]
  pub file_name:        Option<String>,
  #[serde(default)]
  pub station_callsign: Option<String>,
  #[serde(default)]
  pub notes:            Option<String>,
}

impl ImportRequest {
  /// An uploaded ADIF file.
  pub fn adif_file(file_name: Option<String>) -> Self {
    Self {
      kind: ImportKind::File,
      format: "adif".to_owned(),
      file_name,
      station_callsign: None,
      notes: None,
    }
  }
}

// ─── Staged entries ──────────────────────────────────────────────────────────

/// A parsed but unconfirmed QSO bound to a pending import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedEntry {
  pub entry_id:  Uuid,
  pub import_id: Uuid,
  pub qso:       Qso,
  pub extras:    Extras,
}

// ─── Reports ─────────────────────────────────────────────────────────────────

/// A staged entry that failed commit-time validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
  pub entry_id:   Uuid,
  pub callsign:   String,
  pub violations: Vec<Violation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeReport {
  pub import:    Import,
  pub committed: u32,
  pub rejected:  Vec<Rejection>,
}

/// One staged entry as a reviewer sees it.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewItem {
  pub entry:      StagedEntry,
  /// What finalize would reject this entry for, if anything.
  pub violations: Vec<Violation>,
  pub warnings:   Vec<CatalogWarning>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewReport {
  pub import: Import,
  pub items:  Vec<ReviewItem>,
}

impl ReviewReport {
  /// Number of staged entries finalize would commit.
  pub fn committable(&self) -> usize {
    self.items.iter().filter(|i| i.violations.is_empty()).count()
  }
}
