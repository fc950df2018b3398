//! Committed log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::qso::{Extras, Qso};

/// A validated, committed QSO. The extras live in a one-to-one side table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
  pub entry_id:   Uuid,
  /// The import that produced this entry. Cleared if the import is deleted;
  /// `None` for manual entries.
  pub import_id:  Option<Uuid>,
  pub qso:        Qso,
  pub extras:     Extras,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Parameters for [`LogStore::list_entries`](crate::store::LogStore::list_entries).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryQuery {
  /// Exact callsign match, case-insensitive.
  pub callsign:  Option<String>,
  pub band:      Option<String>,
  pub import_id: Option<Uuid>,
  pub limit:     Option<usize>,
  pub offset:    Option<usize>,
}
