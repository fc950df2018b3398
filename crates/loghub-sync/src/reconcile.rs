//! One fetch-upsert(-push) pass against one provider.

use chrono::NaiveDateTime;
use loghub_core::{
  log::{EntryQuery, LogEntry},
  remote::{RemoteRecord, RemoteUpsert},
  store::LogStore,
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::{
  error::{Error, Result},
  provider::{Credentials, Provider},
};

/// What one reconciliation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
  pub provider:  String,
  pub fetched:   u32,
  pub inserted:  u32,
  pub updated:   u32,
  pub unchanged: u32,
  /// Fetched records without an identifier.
  pub skipped:   u32,
  pub pushed:    u32,
}

/// Mirror `provider`'s records into the remote-shadow table and, when `push`
/// is set, send every committed entry outward.
///
/// The fetched batch is upserted in one store transaction. A push failure
/// aborts the pass; the fetched batch stays committed and nothing is retried.
pub async fn reconcile<S, P>(
  store: &S,
  provider: &P,
  credentials: &Credentials,
  push: bool,
) -> Result<SyncReport>
where
  S: LogStore,
  P: Provider,
{
  let name = provider.name();
  let records = provider.fetch(credentials).await?;

  let mut report = SyncReport {
    provider: name.to_owned(),
    fetched: saturating_count(records.len()),
    ..Default::default()
  };

  let mut upserts = Vec::with_capacity(records.len());
  for (index, record) in records.iter().enumerate() {
    match provider.identifier_of(record) {
      Some(id) => upserts.push(RemoteUpsert::from_record(id, record)),
      None => {
        warn!(provider = name, index, "remote record has no identifier; skipped");
        report.skipped += 1;
      }
    }
  }

  let outcome = store
    .upsert_remote_entries(name.to_owned(), upserts)
    .await
    .map_err(Error::from_store)?;
  report.inserted = outcome.inserted;
  report.updated = outcome.updated;
  report.unchanged = outcome.unchanged;

  if push {
    let entries = store
      .list_entries(&EntryQuery::default())
      .await
      .map_err(Error::from_store)?;
    for entry in &entries {
      let ack = provider.push(credentials, &push_payload(entry)).await?;
      debug!(provider = name, entry_id = %entry.entry_id, %ack, "pushed entry");
      report.pushed += 1;
    }
  }

  info!(
    provider = name,
    fetched = report.fetched,
    inserted = report.inserted,
    updated = report.updated,
    unchanged = report.unchanged,
    skipped = report.skipped,
    pushed = report.pushed,
    "sync pass complete"
  );
  Ok(report)
}

fn saturating_count(n: usize) -> u32 {
  u32::try_from(n).unwrap_or(u32::MAX)
}

/// The flat record pushed for one committed entry: `id`, `callsign`,
/// `frequency` (MHz), `mode` and an RFC 3339 UTC `timestamp`.
pub fn push_payload(entry: &LogEntry) -> RemoteRecord {
  let qso = &entry.qso;
  let timestamp = match (qso.qso_date, qso.time_on) {
    (Some(date), Some(time)) => Value::String(
      NaiveDateTime::new(date, time)
        .and_utc()
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string(),
    ),
    _ => Value::Null,
  };

  let mut record = RemoteRecord::new();
  record.insert("id".into(), json!(entry.entry_id.to_string()));
  record.insert("callsign".into(), json!(qso.callsign));
  record.insert("frequency".into(), json!(qso.freq));
  record.insert("mode".into(), json!(qso.mode));
  record.insert("timestamp".into(), timestamp);
  record
}
