//! [`SqliteStore`], the SQLite implementation of [`LogStore`].

use std::path::Path;

use chrono::Utc;
use loghub_core::{
  import::{FinalizeReport, Import, ImportStatus, NewImport, Rejection, StagedEntry},
  log::{EntryQuery, LogEntry},
  qso::{Extras, Qso},
  remote::{RemoteEntry, RemoteUpsert, UpsertOutcome},
  store::LogStore,
  validate::validate,
};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    EncodedQso, IMPORT_COLUMNS, LOG_ENTRY_COLUMNS, RawImport, RawLogEntry, RawRemote,
    RawStaged, decode_status, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

/// Staged rows are written in batches of this many records.
const STAGING_BATCH: usize = 500;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A loghub store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Transaction bodies ──────────────────────────────────────────────────────
//
// These run on the connection thread. Each opens one transaction; returning
// early with `Err` drops it, which rolls everything back.

fn load_import(conn: &rusqlite::Connection, id: &str) -> Result<Option<Import>> {
  let raw = conn
    .query_row(
      &format!("SELECT {IMPORT_COLUMNS} FROM imports WHERE import_id = ?1"),
      rusqlite::params![id],
      RawImport::from_row,
    )
    .optional()?;
  raw.map(RawImport::into_import).transpose()
}

/// Move a `pending` import to `to`. The conditional `WHERE` makes a second
/// finalize or cancel of the same import fail instead of running twice.
fn claim_pending(
  conn: &rusqlite::Connection,
  import_id: Uuid,
  to: ImportStatus,
  operation: &'static str,
  now: &str,
) -> Result<()> {
  let id = encode_uuid(import_id);
  let changed = conn.execute(
    "UPDATE imports SET status = ?2, updated_at = ?3, completed_at = ?3
     WHERE import_id = ?1 AND status = 'pending'",
    rusqlite::params![id, to.as_ref(), now],
  )?;
  if changed == 1 {
    return Ok(());
  }

  let status: Option<String> = conn
    .query_row(
      "SELECT status FROM imports WHERE import_id = ?1",
      rusqlite::params![id],
      |r| r.get(0),
    )
    .optional()?;
  let err = match status {
    None => loghub_core::Error::ImportNotFound(import_id),
    Some(s) => loghub_core::Error::InvalidState {
      import_id,
      status: decode_status(&s)?,
      operation,
    },
  };
  Err(err.into())
}

fn insert_log_entry(
  conn: &rusqlite::Connection,
  entry_id: &str,
  import_id: Option<&str>,
  enc: &EncodedQso,
  now: &str,
) -> Result<()> {
  conn.execute(
    "INSERT INTO log_entries (
       entry_id, import_id, callsign, qso_date, time_on, band, mode,
       qso_json, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
    rusqlite::params![
      entry_id,
      import_id,
      enc.callsign,
      enc.qso_date,
      enc.time_on,
      enc.band,
      enc.mode,
      enc.qso_json,
      now,
    ],
  )?;
  conn.execute(
    "INSERT INTO log_entry_extras (entry_id, data_json) VALUES (?1, ?2)",
    rusqlite::params![entry_id, enc.extras_json],
  )?;
  Ok(())
}

fn create_import_tx(conn: &mut rusqlite::Connection, input: NewImport) -> Result<Import> {
  let now = Utc::now();
  let now_str = encode_dt(now);
  let import_id = Uuid::new_v4();
  let id = encode_uuid(import_id);

  let staged = input
    .staged
    .iter()
    .map(|rec| -> Result<(String, EncodedQso)> {
      Ok((encode_uuid(Uuid::new_v4()), EncodedQso::new(&rec.qso, &rec.extras)?))
    })
    .collect::<Result<Vec<_>>>()?;
  let accepted_count = u32::try_from(staged.len()).unwrap_or(u32::MAX);

  let tx = conn.transaction()?;
  tx.execute(
    "INSERT INTO imports (
       import_id, kind, format, status, checksum, file_name, station_callsign,
       notes, accepted_count, rejected_count, payload, created_at, updated_at
     ) VALUES (?1, ?2, ?3, 'pending', ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
    rusqlite::params![
      id,
      input.kind.as_ref(),
      input.format,
      input.checksum,
      input.file_name,
      input.station_callsign,
      input.notes,
      accepted_count,
      input.rejected_count,
      input.payload,
      now_str,
    ],
  )?;

  {
    let mut stmt = tx.prepare_cached(
      "INSERT INTO staged_entries (
         entry_id, import_id, position, callsign, qso_json, extras_json
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for (batch, chunk) in staged.chunks(STAGING_BATCH).enumerate() {
      for (offset, (entry_id, enc)) in chunk.iter().enumerate() {
        let position = (batch * STAGING_BATCH + offset) as i64;
        stmt.execute(rusqlite::params![
          entry_id,
          id,
          position,
          enc.callsign,
          enc.qso_json,
          enc.extras_json,
        ])?;
      }
      debug!(%import_id, batch, rows = chunk.len(), "staged batch written");
    }
  }
  tx.commit()?;

  Ok(Import {
    import_id,
    kind: input.kind,
    format: input.format,
    status: ImportStatus::Pending,
    checksum: input.checksum,
    file_name: input.file_name,
    station_callsign: input.station_callsign,
    notes: input.notes,
    accepted_count,
    rejected_count: input.rejected_count,
    committed_count: 0,
    commit_rejected_count: 0,
    created_at: now,
    updated_at: now,
    completed_at: None,
  })
}

fn add_entry_tx(
  conn: &mut rusqlite::Connection,
  id: &str,
  enc: &EncodedQso,
  now: &str,
) -> Result<()> {
  let tx = conn.transaction()?;
  insert_log_entry(&tx, id, None, enc, now)?;
  tx.commit()?;
  Ok(())
}

fn load_staged(conn: &rusqlite::Connection, id: &str) -> Result<Vec<StagedEntry>> {
  let mut stmt = conn.prepare(
    "SELECT entry_id, import_id, qso_json, extras_json
     FROM staged_entries WHERE import_id = ?1 ORDER BY position",
  )?;
  let raws = stmt
    .query_map(rusqlite::params![id], RawStaged::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawStaged::into_staged).collect()
}

fn finalize_tx(conn: &mut rusqlite::Connection, import_id: Uuid) -> Result<FinalizeReport> {
  let id = encode_uuid(import_id);
  let now = encode_dt(Utc::now());

  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  claim_pending(&tx, import_id, ImportStatus::Done, "finalize", &now)?;

  let mut committed = 0u32;
  let mut rejected = Vec::new();
  for entry in load_staged(&tx, &id)? {
    match validate(&entry.qso) {
      Ok(qso) => {
        let enc = EncodedQso::new(&qso, &entry.extras)?;
        insert_log_entry(&tx, &encode_uuid(entry.entry_id), Some(&id), &enc, &now)?;
        committed += 1;
      }
      Err(violations) => {
        warn!(
          %import_id,
          entry_id = %entry.entry_id,
          callsign = %entry.qso.callsign,
          violations = violations.len(),
          "staged entry failed validation; not committed"
        );
        rejected.push(Rejection {
          entry_id: entry.entry_id,
          callsign: entry.qso.callsign,
          violations,
        });
      }
    }
  }

  tx.execute(
    "DELETE FROM staged_entries WHERE import_id = ?1",
    rusqlite::params![id],
  )?;
  tx.execute(
    "UPDATE imports SET committed_count = ?2, commit_rejected_count = ?3
     WHERE import_id = ?1",
    rusqlite::params![id, committed, u32::try_from(rejected.len()).unwrap_or(u32::MAX)],
  )?;
  let import = load_import(&tx, &id)?.ok_or(loghub_core::Error::ImportNotFound(import_id))?;
  tx.commit()?;

  Ok(FinalizeReport {
    import,
    committed,
    rejected,
  })
}

fn cancel_tx(conn: &mut rusqlite::Connection, import_id: Uuid) -> Result<Import> {
  let id = encode_uuid(import_id);
  let now = encode_dt(Utc::now());

  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  claim_pending(&tx, import_id, ImportStatus::Cancelled, "cancel", &now)?;
  tx.execute(
    "DELETE FROM staged_entries WHERE import_id = ?1",
    rusqlite::params![id],
  )?;
  let import = load_import(&tx, &id)?.ok_or(loghub_core::Error::ImportNotFound(import_id))?;
  tx.commit()?;
  Ok(import)
}

fn upsert_remote_tx(
  conn: &mut rusqlite::Connection,
  provider: &str,
  entries: &[RemoteUpsert],
) -> Result<UpsertOutcome> {
  let now = encode_dt(Utc::now());
  let mut outcome = UpsertOutcome::default();

  let tx = conn.transaction()?;
  {
    let mut select = tx.prepare_cached(
      "SELECT callsign, frequency, mode, timestamp FROM remote_entries
       WHERE provider = ?1 AND remote_id = ?2",
    )?;
    let mut insert = tx.prepare_cached(
      "INSERT INTO remote_entries (
         provider, remote_id, callsign, frequency, mode, timestamp, updated_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    let mut update = tx.prepare_cached(
      "UPDATE remote_entries
       SET callsign = ?3, frequency = ?4, mode = ?5, timestamp = ?6, updated_at = ?7
       WHERE provider = ?1 AND remote_id = ?2",
    )?;

    for e in entries {
      let existing: Option<(String, Option<f64>, String, Option<String>)> = select
        .query_row(rusqlite::params![provider, e.remote_id], |r| {
          Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
        })
        .optional()?;
      let params = rusqlite::params![
        provider,
        e.remote_id,
        e.callsign,
        e.frequency,
        e.mode,
        e.timestamp,
        now,
      ];

      match existing {
        None => {
          insert.execute(params)?;
          outcome.inserted += 1;
        }
        Some((callsign, frequency, mode, timestamp))
          if callsign == e.callsign
            && frequency == e.frequency
            && mode == e.mode
            && timestamp == e.timestamp =>
        {
          outcome.unchanged += 1;
        }
        Some(_) => {
          update.execute(params)?;
          outcome.updated += 1;
        }
      }
    }
  }
  tx.commit()?;
  Ok(outcome)
}

// ─── LogStore impl ───────────────────────────────────────────────────────────

impl LogStore for SqliteStore {
  type Error = Error;

  // ── Imports ───────────────────────────────────────────────────────────────

  async fn create_import(&self, input: NewImport) -> Result<Import> {
    let import = self
      .conn
      .call(move |conn| Ok(create_import_tx(conn, input)))
      .await??;
    info!(
      import_id = %import.import_id,
      accepted = import.accepted_count,
      rejected = import.rejected_count,
      "import staged"
    );
    Ok(import)
  }

  async fn get_import(&self, import_id: Uuid) -> Result<Option<Import>> {
    let id = encode_uuid(import_id);

    let raw: Option<RawImport> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {IMPORT_COLUMNS} FROM imports WHERE import_id = ?1"),
            rusqlite::params![id],
            RawImport::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawImport::into_import).transpose()
  }

  async fn list_imports(&self) -> Result<Vec<Import>> {
    let raws: Vec<RawImport> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {IMPORT_COLUMNS} FROM imports ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map([], RawImport::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawImport::into_import).collect()
  }

  async fn import_payload(&self, import_id: Uuid) -> Result<Option<Vec<u8>>> {
    let id = encode_uuid(import_id);

    let payload = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT payload FROM imports WHERE import_id = ?1",
            rusqlite::params![id],
            |r| r.get(0),
          )
          .optional()?)
      })
      .await?;
    Ok(payload)
  }

  async fn staged_entries(&self, import_id: Uuid) -> Result<Vec<StagedEntry>> {
    let id = encode_uuid(import_id);
    self.conn.call(move |conn| Ok(load_staged(conn, &id))).await?
  }

  async fn finalize_import(&self, import_id: Uuid) -> Result<FinalizeReport> {
    let report = self
      .conn
      .call(move |conn| Ok(finalize_tx(conn, import_id)))
      .await??;
    info!(
      %import_id,
      committed = report.committed,
      rejected = report.rejected.len(),
      "import finalized"
    );
    Ok(report)
  }

  async fn cancel_import(&self, import_id: Uuid) -> Result<Import> {
    let import = self
      .conn
      .call(move |conn| Ok(cancel_tx(conn, import_id)))
      .await??;
    info!(%import_id, "import cancelled");
    Ok(import)
  }

  async fn delete_import(&self, import_id: Uuid) -> Result<()> {
    let id = encode_uuid(import_id);

    let deleted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM imports WHERE import_id = ?1",
          rusqlite::params![id],
        )?;
        Ok(n)
      })
      .await?;

    if deleted == 0 {
      return Err(loghub_core::Error::ImportNotFound(import_id).into());
    }
    info!(%import_id, "import deleted");
    Ok(())
  }

  // ── Log entries ───────────────────────────────────────────────────────────

  async fn add_entry(&self, qso: Qso, extras: Extras) -> Result<LogEntry> {
    let qso = validate(&qso).map_err(loghub_core::Error::Validation)?;
    let enc = EncodedQso::new(&qso, &extras)?;

    let now = Utc::now();
    let entry = LogEntry {
      entry_id: Uuid::new_v4(),
      import_id: None,
      qso,
      extras,
      created_at: now,
      updated_at: now,
    };
    let id = encode_uuid(entry.entry_id);
    let now_str = encode_dt(now);

    self
      .conn
      .call(move |conn| Ok(add_entry_tx(conn, &id, &enc, &now_str)))
      .await??;

    Ok(entry)
  }

  async fn get_entry(&self, entry_id: Uuid) -> Result<Option<LogEntry>> {
    let id = encode_uuid(entry_id);

    let raw: Option<RawLogEntry> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {LOG_ENTRY_COLUMNS}
               FROM log_entries e
               LEFT JOIN log_entry_extras x ON x.entry_id = e.entry_id
               WHERE e.entry_id = ?1"
            ),
            rusqlite::params![id],
            RawLogEntry::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawLogEntry::into_entry).transpose()
  }

  async fn list_entries(&self, query: &EntryQuery) -> Result<Vec<LogEntry>> {
    let callsign   = query.callsign.as_deref().map(|c| c.trim().to_uppercase());
    let band       = query.band.as_deref().map(|b| b.trim().to_lowercase());
    let import_id  = query.import_id.map(encode_uuid);
    let limit_val  = query.limit.map_or(-1, |l| l as i64);
    let offset_val = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawLogEntry> = self
      .conn
      .call(move |conn| {
        let mut conds: Vec<&'static str> = vec![];
        if callsign.is_some() {
          conds.push("e.callsign = ?1");
        }
        if band.is_some() {
          conds.push("LOWER(e.band) = ?2");
        }
        if import_id.is_some() {
          conds.push("e.import_id = ?3");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT {LOG_ENTRY_COLUMNS}
           FROM log_entries e
           LEFT JOIN log_entry_extras x ON x.entry_id = e.entry_id
           {where_clause}
           ORDER BY e.qso_date, e.time_on, e.rowid
           LIMIT ?4 OFFSET ?5"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              callsign.as_deref(),
              band.as_deref(),
              import_id.as_deref(),
              limit_val,
              offset_val,
            ],
            RawLogEntry::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLogEntry::into_entry).collect()
  }

  // ── Remote entries ────────────────────────────────────────────────────────

  async fn upsert_remote_entries(
    &self,
    provider: String,
    entries: Vec<RemoteUpsert>,
  ) -> Result<UpsertOutcome> {
    self
      .conn
      .call(move |conn| Ok(upsert_remote_tx(conn, &provider, &entries)))
      .await?
  }

  async fn list_remote_entries(&self, provider: Option<String>) -> Result<Vec<RemoteEntry>> {
    let raws: Vec<RawRemote> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(p) = provider {
          let mut stmt = conn.prepare(
            "SELECT provider, remote_id, callsign, frequency, mode, timestamp, updated_at
             FROM remote_entries WHERE provider = ?1 ORDER BY remote_id",
          )?;
          stmt
            .query_map(rusqlite::params![p], RawRemote::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(
            "SELECT provider, remote_id, callsign, frequency, mode, timestamp, updated_at
             FROM remote_entries ORDER BY provider, remote_id",
          )?;
          stmt
            .query_map([], RawRemote::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRemote::into_remote).collect()
  }
}
