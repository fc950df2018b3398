//! [`ImportService`]: the staged-import lifecycle over any [`LogStore`].

use std::sync::Arc;

use loghub_core::{
  catalog::TagCatalog,
  import::{
    FinalizeReport, Import, ImportKind, ImportRequest, NewImport, ReviewItem, ReviewReport,
  },
  log::{EntryQuery, LogEntry},
  qso::{Extras, Qso},
  store::LogStore,
  validate::validate,
};
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::{
  error::{Error, Result},
  staging::stage,
};

/// zstd level used for retained payloads.
const COMPRESSION_LEVEL: i32 = 3;

/// Hex SHA-256 of `bytes`.
pub fn checksum(bytes: &[u8]) -> String {
  let mut hasher = Sha256::new();
  hasher.update(bytes);
  hex::encode(hasher.finalize())
}

fn clean(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

pub struct ImportService<S> {
  store:   Arc<S>,
  catalog: Arc<TagCatalog>,
}

impl<S> Clone for ImportService<S> {
  fn clone(&self) -> Self {
    Self {
      store:   Arc::clone(&self.store),
      catalog: Arc::clone(&self.catalog),
    }
  }
}

impl<S: LogStore> ImportService<S> {
  pub fn new(store: Arc<S>, catalog: Arc<TagCatalog>) -> Self { Self { store, catalog } }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn catalog(&self) -> &TagCatalog { &self.catalog }

  // ── Creation ──────────────────────────────────────────────────────────────

  /// Stage an uploaded ADIF payload as a new `pending` import.
  ///
  /// Invalid UTF-8 is replaced rather than rejected so that the rest of the
  /// file still stages; the untouched bytes are retained with the import.
  pub async fn create_import(&self, raw: &[u8], request: ImportRequest) -> Result<Import> {
    let text = String::from_utf8_lossy(raw);
    self.ingest(raw, &text, request).await
  }

  /// Stage one N1MM Logger+ contact broadcast as a `service` import.
  pub async fn create_n1mm_import(
    &self,
    xml: &str,
    station_callsign: Option<String>,
  ) -> Result<Import> {
    let adif = loghub_adif::n1mm::contact_to_adif(xml)?;
    let request = ImportRequest {
      kind: ImportKind::Service,
      format: "n1mm".to_owned(),
      file_name: None,
      station_callsign,
      notes: None,
    };
    self.ingest(xml.as_bytes(), &adif, request).await
  }

  async fn ingest(&self, raw: &[u8], text: &str, request: ImportRequest) -> Result<Import> {
    let station_callsign = clean(request.station_callsign).map(|c| c.to_uppercase());
    let staging = stage(text, &self.catalog, station_callsign.as_deref());

    let input = NewImport {
      kind: request.kind,
      format: request.format,
      checksum: checksum(raw),
      file_name: clean(request.file_name),
      station_callsign,
      notes: clean(request.notes),
      payload: zstd::encode_all(raw, COMPRESSION_LEVEL).map_err(Error::Compression)?,
      rejected_count: staging.rejected,
      staged: staging.staged,
    };
    let import = self.store.create_import(input).await.map_err(Error::from_store)?;

    info!(
      import_id = %import.import_id,
      kind = %import.kind,
      format = %import.format,
      accepted = import.accepted_count,
      rejected = import.rejected_count,
      "import created"
    );
    Ok(import)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub async fn get(&self, import_id: Uuid) -> Result<Import> {
    self
      .store
      .get_import(import_id)
      .await
      .map_err(Error::from_store)?
      .ok_or(Error::Core(loghub_core::Error::ImportNotFound(import_id)))
  }

  pub async fn list(&self) -> Result<Vec<Import>> {
    self.store.list_imports().await.map_err(Error::from_store)
  }

  /// The original uploaded bytes.
  pub async fn payload(&self, import_id: Uuid) -> Result<Vec<u8>> {
    let compressed = self
      .store
      .import_payload(import_id)
      .await
      .map_err(Error::from_store)?
      .ok_or(Error::Core(loghub_core::Error::ImportNotFound(import_id)))?;
    zstd::decode_all(compressed.as_slice()).map_err(Error::Compression)
  }

  /// What finalize would do right now, entry by entry. Mutates nothing.
  pub async fn review(&self, import_id: Uuid) -> Result<ReviewReport> {
    let import = self.get(import_id).await?;
    let staged = self
      .store
      .staged_entries(import_id)
      .await
      .map_err(Error::from_store)?;

    let items = staged
      .into_iter()
      .map(|entry| {
        let violations = validate(&entry.qso).err().unwrap_or_default();
        let warnings = entry
          .extras
          .iter()
          .filter_map(|(tag, value)| self.catalog.check(tag, value))
          .collect();
        ReviewItem {
          entry,
          violations,
          warnings,
        }
      })
      .collect();

    Ok(ReviewReport { import, items })
  }

  // ── Transitions ───────────────────────────────────────────────────────────

  pub async fn finalize(&self, import_id: Uuid) -> Result<FinalizeReport> {
    self
      .store
      .finalize_import(import_id)
      .await
      .map_err(Error::from_store)
  }

  pub async fn cancel(&self, import_id: Uuid) -> Result<Import> {
    self
      .store
      .cancel_import(import_id)
      .await
      .map_err(Error::from_store)
  }

  pub async fn delete(&self, import_id: Uuid) -> Result<()> {
    self
      .store
      .delete_import(import_id)
      .await
      .map_err(Error::from_store)
  }

  // ── Log ───────────────────────────────────────────────────────────────────

  /// Log one contact by hand, outside any import.
  pub async fn add_entry(&self, qso: Qso, extras: Extras) -> Result<LogEntry> {
    self.store.add_entry(qso, extras).await.map_err(Error::from_store)
  }

  pub async fn get_entry(&self, entry_id: Uuid) -> Result<LogEntry> {
    self
      .store
      .get_entry(entry_id)
      .await
      .map_err(Error::from_store)?
      .ok_or(Error::Core(loghub_core::Error::EntryNotFound(entry_id)))
  }

  pub async fn entries(&self, query: &EntryQuery) -> Result<Vec<LogEntry>> {
    self.store.list_entries(query).await.map_err(Error::from_store)
  }

  /// The committed log matching `query` as an ADIF document.
  pub async fn export(&self, query: &EntryQuery) -> Result<String> {
    let entries = self.entries(query).await?;
    info!(entries = entries.len(), "log exported");
    Ok(loghub_adif::export_entries(&entries))
  }
}
