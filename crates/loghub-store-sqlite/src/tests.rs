//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{NaiveDate, NaiveTime};
use loghub_core::{
  classify::ClassifiedRecord,
  import::{ImportKind, ImportStatus, NewImport},
  log::EntryQuery,
  qso::{Extras, Qso},
  remote::RemoteUpsert,
  store::{LogStore, StoreError},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn qso(call: &str) -> Qso {
  Qso {
    callsign: call.into(),
    qso_date: NaiveDate::from_ymd_opt(2024, 1, 1),
    time_on: NaiveTime::from_hms_opt(12, 0, 0),
    band: "20m".into(),
    mode: "SSB".into(),
    ..Qso::default()
  }
}

fn record(qso: Qso) -> ClassifiedRecord {
  let mut extras = Extras::new();
  extras.insert("QSL_RCVD", "Y");
  ClassifiedRecord { qso, extras }
}

fn new_import(staged: Vec<ClassifiedRecord>) -> NewImport {
  NewImport {
    kind: ImportKind::File,
    format: "adif".into(),
    checksum: "abc123".into(),
    file_name: Some("log.adi".into()),
    station_callsign: None,
    notes: None,
    payload: vec![1, 2, 3],
    rejected_count: 1,
    staged,
  }
}

fn is_invalid_state(e: &Error) -> bool {
  matches!(e.as_core(), Some(loghub_core::Error::InvalidState { .. }))
}

// ─── Imports ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_import_stages_entries() {
  let s = store().await;
  let imp = s
    .create_import(new_import(vec![record(qso("K1ABC")), record(qso("W1AW"))]))
    .await
    .unwrap();

  assert_eq!(imp.status, ImportStatus::Pending);
  assert_eq!(imp.accepted_count, 2);
  assert_eq!(imp.rejected_count, 1);

  let fetched = s.get_import(imp.import_id).await.unwrap().unwrap();
  assert_eq!(fetched.checksum, "abc123");
  assert_eq!(fetched.file_name.as_deref(), Some("log.adi"));

  let staged = s.staged_entries(imp.import_id).await.unwrap();
  assert_eq!(staged.len(), 2);
  assert_eq!(staged[0].qso.callsign, "K1ABC");
  assert_eq!(staged[1].qso.callsign, "W1AW");
  assert_eq!(staged[0].extras.get("QSL_RCVD"), Some("Y"));

  let payload = s.import_payload(imp.import_id).await.unwrap();
  assert_eq!(payload, Some(vec![1, 2, 3]));
}

#[tokio::test]
async fn staging_spans_multiple_batches() {
  let s = store().await;
  let staged = (0..1203).map(|i| record(qso(&format!("K{}ABC", i % 10)))).collect();
  let imp = s.create_import(new_import(staged)).await.unwrap();
  assert_eq!(imp.accepted_count, 1203);
  assert_eq!(s.staged_entries(imp.import_id).await.unwrap().len(), 1203);
}

#[tokio::test]
async fn get_import_missing_returns_none() {
  let s = store().await;
  assert!(s.get_import(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn finalize_commits_valid_and_skips_invalid() {
  let s = store().await;
  let mut bad = qso("/BAD/");
  bad.band.clear();
  let imp = s
    .create_import(new_import(vec![record(qso("k1abc")), record(bad)]))
    .await
    .unwrap();

  let report = s.finalize_import(imp.import_id).await.unwrap();
  assert_eq!(report.committed, 1);
  assert_eq!(report.rejected.len(), 1);
  assert_eq!(report.rejected[0].callsign, "/BAD/");
  assert_eq!(report.rejected[0].violations.len(), 2);
  assert_eq!(report.import.status, ImportStatus::Done);
  assert_eq!(report.import.committed_count, 1);
  assert_eq!(report.import.commit_rejected_count, 1);
  assert!(report.import.completed_at.is_some());

  assert!(s.staged_entries(imp.import_id).await.unwrap().is_empty());

  let entries = s.list_entries(&EntryQuery::default()).await.unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].qso.callsign, "K1ABC");
  assert_eq!(entries[0].import_id, Some(imp.import_id));
  assert_eq!(entries[0].extras.get("QSL_RCVD"), Some("Y"));
}

#[tokio::test]
async fn finalize_derives_band_from_freq() {
  let s = store().await;
  let mut q = qso("K1ABC");
  q.band.clear();
  q.freq = Some(14.074);
  let imp = s.create_import(new_import(vec![record(q)])).await.unwrap();
  s.finalize_import(imp.import_id).await.unwrap();

  let entries = s.list_entries(&EntryQuery::default()).await.unwrap();
  assert_eq!(entries[0].qso.band, "20m");
}

#[tokio::test]
async fn double_finalize_is_a_state_error() {
  let s = store().await;
  let imp = s
    .create_import(new_import(vec![record(qso("K1ABC"))]))
    .await
    .unwrap();

  s.finalize_import(imp.import_id).await.unwrap();
  let err = s.finalize_import(imp.import_id).await.unwrap_err();
  assert!(is_invalid_state(&err), "{err}");

  let entries = s.list_entries(&EntryQuery::default()).await.unwrap();
  assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn cancel_drops_staged_rows() {
  let s = store().await;
  let imp = s
    .create_import(new_import(vec![record(qso("K1ABC"))]))
    .await
    .unwrap();

  let cancelled = s.cancel_import(imp.import_id).await.unwrap();
  assert_eq!(cancelled.status, ImportStatus::Cancelled);
  assert!(s.staged_entries(imp.import_id).await.unwrap().is_empty());

  let err = s.finalize_import(imp.import_id).await.unwrap_err();
  assert!(is_invalid_state(&err));
  let err = s.cancel_import(imp.import_id).await.unwrap_err();
  assert!(is_invalid_state(&err));
  assert!(s.list_entries(&EntryQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn lifecycle_on_missing_import_is_not_found() {
  let s = store().await;
  let err = s.finalize_import(Uuid::new_v4()).await.unwrap_err();
  assert!(err.as_core().is_some_and(|e| e.is_not_found()));
  let err = s.delete_import(Uuid::new_v4()).await.unwrap_err();
  assert!(err.as_core().is_some_and(|e| e.is_not_found()));
}

#[tokio::test]
async fn deleting_import_keeps_committed_entries() {
  let s = store().await;
  let imp = s
    .create_import(new_import(vec![record(qso("K1ABC"))]))
    .await
    .unwrap();
  s.finalize_import(imp.import_id).await.unwrap();

  s.delete_import(imp.import_id).await.unwrap();
  assert!(s.get_import(imp.import_id).await.unwrap().is_none());

  let entries = s.list_entries(&EntryQuery::default()).await.unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].import_id, None);
}

#[tokio::test]
async fn deleting_pending_import_drops_staged_rows() {
  let s = store().await;
  let imp = s
    .create_import(new_import(vec![record(qso("K1ABC"))]))
    .await
    .unwrap();
  s.delete_import(imp.import_id).await.unwrap();
  assert!(s.staged_entries(imp.import_id).await.unwrap().is_empty());
  assert!(s.list_imports().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_imports_returns_all() {
  let s = store().await;
  s.create_import(new_import(vec![])).await.unwrap();
  s.create_import(new_import(vec![])).await.unwrap();
  assert_eq!(s.list_imports().await.unwrap().len(), 2);
}

// ─── Log entries ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_entry_validates() {
  let s = store().await;
  let mut extras = Extras::new();
  extras.insert("IOTA_ISLAND_ID", "123");

  let entry = s.add_entry(qso("w1aw"), extras).await.unwrap();
  assert_eq!(entry.qso.callsign, "W1AW");
  assert_eq!(entry.import_id, None);

  let fetched = s.get_entry(entry.entry_id).await.unwrap().unwrap();
  assert_eq!(fetched.qso, entry.qso);
  assert_eq!(fetched.extras.get("IOTA_ISLAND_ID"), Some("123"));

  let mut sat = qso("K1ABC");
  sat.prop_mode = "SAT".into();
  let err = s.add_entry(sat, Extras::new()).await.unwrap_err();
  assert!(matches!(err.as_core(), Some(loghub_core::Error::Validation(v)) if v[0].field == "sat_name"));
}

#[tokio::test]
async fn list_entries_filters_and_pages() {
  let s = store().await;
  for (call, band, day) in [("K1ABC", "20m", 3), ("W1AW", "40m", 1), ("K1ABC", "40m", 2)] {
    let mut q = qso(call);
    q.band = band.into();
    q.qso_date = NaiveDate::from_ymd_opt(2024, 1, day);
    s.add_entry(q, Extras::new()).await.unwrap();
  }

  let all = s.list_entries(&EntryQuery::default()).await.unwrap();
  let days: Vec<_> = all.iter().map(|e| e.qso.qso_date.unwrap().format("%d").to_string()).collect();
  assert_eq!(days, ["01", "02", "03"]);

  let k1 = s
    .list_entries(&EntryQuery {
      callsign: Some("k1abc".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(k1.len(), 2);

  let forty = s
    .list_entries(&EntryQuery {
      band: Some("40M".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(forty.len(), 2);

  let page = s
    .list_entries(&EntryQuery {
      limit: Some(1),
      offset: Some(1),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(page.len(), 1);
  assert_eq!(page[0].qso.qso_date, NaiveDate::from_ymd_opt(2024, 1, 2));
}

// ─── Remote entries ──────────────────────────────────────────────────────────

fn remote(id: &str, call: &str) -> RemoteUpsert {
  RemoteUpsert {
    remote_id: id.into(),
    callsign:  call.into(),
    frequency: Some(14.074),
    mode:      "FT8".into(),
    timestamp: Some("2024-01-01T12:00:00Z".into()),
  }
}

#[tokio::test]
async fn remote_upsert_is_idempotent() {
  let s = store().await;
  let batch = vec![remote("1", "K1ABC"), remote("2", "W1AW")];

  let first = s.upsert_remote_entries("clublog".into(), batch.clone()).await.unwrap();
  assert_eq!((first.inserted, first.updated, first.unchanged), (2, 0, 0));
  let before = s.list_remote_entries(Some("clublog".into())).await.unwrap();

  let second = s.upsert_remote_entries("clublog".into(), batch).await.unwrap();
  assert_eq!((second.inserted, second.updated, second.unchanged), (0, 0, 2));
  let after = s.list_remote_entries(Some("clublog".into())).await.unwrap();
  assert_eq!(before, after);
}

#[tokio::test]
async fn remote_upsert_overwrites_in_place() {
  let s = store().await;
  s.upsert_remote_entries("lotw".into(), vec![remote("7", "K1ABC")]).await.unwrap();
  let out = s
    .upsert_remote_entries("lotw".into(), vec![remote("7", "K1XYZ")])
    .await
    .unwrap();
  assert_eq!(out.updated, 1);

  let rows = s.list_remote_entries(Some("lotw".into())).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].callsign, "K1XYZ");
}

#[tokio::test]
async fn remote_ids_are_scoped_by_provider() {
  let s = store().await;
  s.upsert_remote_entries("clublog".into(), vec![remote("1", "K1ABC")]).await.unwrap();
  s.upsert_remote_entries("qrz".into(), vec![remote("1", "K1ABC")]).await.unwrap();
  assert_eq!(s.list_remote_entries(None).await.unwrap().len(), 2);
  assert_eq!(s.list_remote_entries(Some("qrz".into())).await.unwrap().len(), 1);
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn file_store_survives_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("log.db");

  let entry_id = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.add_entry(qso("K1ABC"), Extras::new()).await.unwrap().entry_id
  };

  let s = SqliteStore::open(&path).await.unwrap();
  assert!(s.get_entry(entry_id).await.unwrap().is_some());
}
