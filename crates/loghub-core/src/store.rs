//! The `LogStore` trait.
//!
//! Implemented by storage backends (e.g. `loghub-store-sqlite`). The import
//! service, the sync engine and the HTTP layer depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  import::{FinalizeReport, Import, NewImport, StagedEntry},
  log::{EntryQuery, LogEntry},
  qso::{Extras, Qso},
  remote::{RemoteEntry, RemoteUpsert, UpsertOutcome},
};

/// Backend errors must be able to expose the domain error they carry, so
/// generic layers can tell a state conflict from a database failure.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn as_core(&self) -> Option<&crate::Error>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a loghub store backend.
///
/// `finalize_import`, `cancel_import`, `delete_import` and
/// `upsert_remote_entries` are each atomic: either every mutation they make
/// is visible afterwards, or none is.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait LogStore: Send + Sync {
  type Error: StoreError;

  // ── Imports ───────────────────────────────────────────────────────────

  /// Persist a new `pending` import together with its staged entries.
  fn create_import(
    &self,
    input: NewImport,
  ) -> impl Future<Output = Result<Import, Self::Error>> + Send + '_;

  fn get_import(
    &self,
    import_id: Uuid,
  ) -> impl Future<Output = Result<Option<Import>, Self::Error>> + Send + '_;

  /// All imports, newest first.
  fn list_imports(
    &self,
  ) -> impl Future<Output = Result<Vec<Import>, Self::Error>> + Send + '_;

  /// The compressed payload stored with an import.
  fn import_payload(
    &self,
    import_id: Uuid,
  ) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send + '_;

  /// Staged entries of an import in file order.
  fn staged_entries(
    &self,
    import_id: Uuid,
  ) -> impl Future<Output = Result<Vec<StagedEntry>, Self::Error>> + Send + '_;

  /// Promote every staged entry that passes validation, skip the rest, drop
  /// the staged rows and mark the import `done`.
  ///
  /// Fails with [`crate::Error::InvalidState`] unless the import is
  /// `pending` at the moment of the status update.
  fn finalize_import(
    &self,
    import_id: Uuid,
  ) -> impl Future<Output = Result<FinalizeReport, Self::Error>> + Send + '_;

  /// Drop the staged rows and mark the import `cancelled`.
  fn cancel_import(
    &self,
    import_id: Uuid,
  ) -> impl Future<Output = Result<Import, Self::Error>> + Send + '_;

  /// Remove an import and its staged rows. Committed entries survive with
  /// their import link cleared.
  fn delete_import(
    &self,
    import_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Log entries ───────────────────────────────────────────────────────

  /// Validate and commit a single entry with no import.
  fn add_entry(
    &self,
    qso: Qso,
    extras: Extras,
  ) -> impl Future<Output = Result<LogEntry, Self::Error>> + Send + '_;

  fn get_entry(
    &self,
    entry_id: Uuid,
  ) -> impl Future<Output = Result<Option<LogEntry>, Self::Error>> + Send + '_;

  /// Committed entries ordered by QSO date and time.
  fn list_entries<'a>(
    &'a self,
    query: &'a EntryQuery,
  ) -> impl Future<Output = Result<Vec<LogEntry>, Self::Error>> + Send + 'a;

  // ── Remote entries ────────────────────────────────────────────────────

  /// Insert or overwrite remote entries keyed on `(provider, remote_id)`.
  /// Rows whose fields already match are left untouched.
  fn upsert_remote_entries(
    &self,
    provider: String,
    entries: Vec<RemoteUpsert>,
  ) -> impl Future<Output = Result<UpsertOutcome, Self::Error>> + Send + '_;

  fn list_remote_entries(
    &self,
    provider: Option<String>,
  ) -> impl Future<Output = Result<Vec<RemoteEntry>, Self::Error>> + Send + '_;
}
