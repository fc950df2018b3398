//! Error types for `loghub-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::{import::ImportStatus, validate::Violation};

#[derive(Debug, Error)]
pub enum Error {
  #[error("import not found: {0}")]
  ImportNotFound(Uuid),

  #[error("log entry not found: {0}")]
  EntryNotFound(Uuid),

  /// An import lifecycle operation was attempted outside `pending`.
  #[error("cannot {operation} import {import_id}: status is {status}")]
  InvalidState {
    import_id: Uuid,
    status:    ImportStatus,
    operation: &'static str,
  },

  #[error(
    "validation failed: {}",
    .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
  )]
  Validation(Vec<Violation>),

  #[error("unknown provider: {0:?}")]
  UnknownProvider(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// `true` for the "no such import / entry" family.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::ImportNotFound(_) | Self::EntryNotFound(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
