//! JSON HTTP API for loghub.
//!
//! Exposes an axum [`Router`] over the import service and the sync engine,
//! backed by any [`LogStore`]. Authentication and TLS are the deployment's
//! responsibility.

pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use loghub_core::{catalog::TagCatalog, store::LogStore};
use loghub_ingest::ImportService;
use loghub_sync::ProvidersConfig;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{catalog_tags, entries, imports, remotes};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration, deserialised from `loghub.toml` and `LOGHUB_*`
/// environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub store_path:       PathBuf,
  /// JSON override file for the tag catalog.
  pub catalog_path:     Option<PathBuf>,
  /// Applied to imported records that name neither station nor operator.
  pub station_callsign: Option<String>,
  pub providers:        ProvidersConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             "127.0.0.1".to_string(),
      port:             8073,
      store_path:       PathBuf::from("loghub.db"),
      catalog_path:     None,
      station_callsign: None,
      providers:        ProvidersConfig::default(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub imports: ImportService<S>,
  pub config:  Arc<ServerConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      imports: self.imports.clone(),
      config:  Arc::clone(&self.config),
    }
  }
}

impl<S: LogStore> AppState<S> {
  pub fn new(store: Arc<S>, catalog: Arc<TagCatalog>, config: ServerConfig) -> Self {
    Self {
      imports: ImportService::new(store, catalog),
      config:  Arc::new(config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router, with the API nested under `/api`.
pub fn router<S: LogStore + 'static>(state: AppState<S>) -> Router {
  Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}

/// The API routes alone, materialised to `Router<()>`.
pub fn api_router<S: LogStore + 'static>(state: AppState<S>) -> Router<()> {
  Router::new()
    // Imports
    .route("/imports", get(imports::list::<S>).post(imports::create::<S>))
    .route("/imports/n1mm", post(imports::create_n1mm::<S>))
    .route(
      "/imports/{id}",
      get(imports::get_one::<S>).delete(imports::delete_one::<S>),
    )
    .route("/imports/{id}/review", get(imports::review::<S>))
    .route("/imports/{id}/finalize", post(imports::finalize::<S>))
    .route("/imports/{id}/cancel", post(imports::cancel::<S>))
    // Log
    .route("/entries", get(entries::list::<S>).post(entries::create::<S>))
    .route("/entries/{id}", get(entries::get_one::<S>))
    .route("/export.adif", get(entries::export::<S>))
    // Remotes
    .route("/remotes/{provider}", get(remotes::list::<S>))
    .route("/sync/{provider}", post(remotes::sync::<S>))
    // Catalog
    .route("/catalog/tags", get(catalog_tags::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    Json,
    body::Body,
    http::{Request, StatusCode},
  };
  use loghub_store_sqlite::SqliteStore;
  use loghub_sync::registry::ApiKeyConfig;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  const ADIF: &str = "<ADIF_VER:5>3.1.5 <EOH>\n\
    <CALL:5>K1ABC <QSO_DATE:8>20240101 <TIME_ON:4>1234 <FREQ:6>14.074 <MODE:3>FT8 <EOR>\n\
    <CALL:5>/BAD/ <QSO_DATE:8>20240101 <TIME_ON:4>1300 <BAND:3>40m <EOR>\n\
    <CALL:4>W1AW <EOR>\n";

  async fn make_state(config: ServerConfig) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState::new(Arc::new(store), Arc::new(TagCatalog::seed()), config)
  }

  fn default_config() -> ServerConfig {
    ServerConfig {
      station_callsign: Some("N0CALL".into()),
      ..Default::default()
    }
  }

  async fn send(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    body: impl Into<Body>,
  ) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
      .method(method)
      .uri(uri)
      .header("content-type", "application/json")
      .body(body.into())
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
  }

  async fn send_json(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    body: impl Into<Body>,
  ) -> (StatusCode, Value) {
    let (status, bytes) = send(state, method, uri, body).await;
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  async fn upload(state: &AppState<SqliteStore>) -> Uuid {
    let (status, body) =
      send_json(state.clone(), "POST", "/api/imports?file_name=log.adi", ADIF).await;
    assert_eq!(status, StatusCode::CREATED);
    body["import_id"].as_str().unwrap().parse().unwrap()
  }

  // ── Imports ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn upload_reports_counts_and_defaults() {
    let state = make_state(default_config()).await;
    let (status, body) =
      send_json(state, "POST", "/api/imports?file_name=log.adi", ADIF).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["kind"], "file");
    assert_eq!(body["accepted_count"], 2);
    assert_eq!(body["rejected_count"], 1);
    assert_eq!(body["file_name"], "log.adi");
    assert_eq!(body["station_callsign"], "N0CALL");
  }

  #[tokio::test]
  async fn review_then_finalize_then_conflict() {
    let state = make_state(default_config()).await;
    let id = upload(&state).await;

    let (status, review) =
      send_json(state.clone(), "GET", &format!("/api/imports/{id}/review"), "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(review["items"].as_array().unwrap().len(), 2);
    assert_eq!(review["items"][1]["violations"][0]["field"], "callsign");

    let (status, report) =
      send_json(state.clone(), "POST", &format!("/api/imports/{id}/finalize"), "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["committed"], 1);
    assert_eq!(report["import"]["status"], "done");
    assert_eq!(report["import"]["commit_rejected_count"], 1);

    let (status, body) =
      send_json(state, "POST", &format!("/api/imports/{id}/finalize"), "").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("done"));
  }

  #[tokio::test]
  async fn cancel_and_delete() {
    let state = make_state(default_config()).await;
    let id = upload(&state).await;

    let (status, body) =
      send_json(state.clone(), "POST", &format!("/api/imports/{id}/cancel"), "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (status, _) = send(state.clone(), "DELETE", &format!("/api/imports/{id}"), "").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) =
      send_json(state, "GET", &format!("/api/imports/{id}"), "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn list_imports_includes_upload() {
    let state = make_state(default_config()).await;
    let id = upload(&state).await;
    let (status, body) = send_json(state, "GET", "/api/imports", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["import_id"], id.to_string());
  }

  #[tokio::test]
  async fn n1mm_message_becomes_service_import() {
    let state = make_state(default_config()).await;
    let xml = "<contactinfo><app>N1MM</app><timestamp>2023-06-30 18:00:30</timestamp>\
               <mycall>F4JAW</mycall><call>EA5EB</call><mode>FT8</mode>\
               <txfreq>2807535</txfreq></contactinfo>";
    let (status, body) = send_json(state.clone(), "POST", "/api/imports/n1mm", xml).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["kind"], "service");
    assert_eq!(body["format"], "n1mm");

    let (status, _) = send(state, "POST", "/api/imports/n1mm", "<contactinfo/>").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Entries ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn manual_entry_validates_and_exports() {
    let state = make_state(default_config()).await;

    let bad = json!({ "qso": { "callsign": "/BAD/", "qso_date": "2024-01-01",
                               "time_on": "12:00:00", "band": "20m" } });
    let (status, body) =
      send_json(state.clone(), "POST", "/api/entries", bad.to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["violations"][0]["field"], "callsign");

    let good = json!({
      "qso": { "callsign": "k1abc", "qso_date": "2024-01-01", "time_on": "12:00:00",
               "freq": 14.074, "mode": "FT8", "station_callsign": "N0CALL" },
      "extras": { "POTA_REF": "K-0001" }
    });
    let (status, entry) =
      send_json(state.clone(), "POST", "/api/entries", good.to_string()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["qso"]["callsign"], "K1ABC");
    assert_eq!(entry["qso"]["band"], "20m");

    let id = entry["entry_id"].as_str().unwrap();
    let (status, _) = send(state.clone(), "GET", &format!("/api/entries/{id}"), "").await;
    assert_eq!(status, StatusCode::OK);

    let (status, list) = send_json(state.clone(), "GET", "/api/entries?band=20m", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, adif) = send(state, "GET", "/api/export.adif", "").await;
    assert_eq!(status, StatusCode::OK);
    let adif = String::from_utf8(adif).unwrap();
    assert!(adif.contains("<CALL:5>K1ABC"));
    assert!(adif.contains("<POTA_REF:6>K-0001"));
  }

  #[tokio::test]
  async fn missing_entry_is_404() {
    let state = make_state(default_config()).await;
    let (status, _) =
      send(state, "GET", &format!("/api/entries/{}", Uuid::new_v4()), "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Sync ─────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn sync_rejects_unknown_and_unconfigured_providers() {
    let state = make_state(default_config()).await;
    let (status, _) = send(state.clone(), "POST", "/api/sync/eqsl", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, body) = send_json(state, "POST", "/api/sync/qrz", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("not configured"));
  }

  async fn fake_clublog() -> String {
    let app = Router::new().route(
      "/qsos",
      get(|| async {
        Json(json!([{ "id": 9, "callsign": "k1abc", "frequency": 14.074, "mode": "ft8" }]))
      }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
  }

  #[tokio::test]
  async fn sync_pass_mirrors_remote_records() {
    let mut config = default_config();
    config.providers.clublog = Some(ApiKeyConfig {
      base_url: fake_clublog().await,
      api_key:  "secret".into(),
    });
    let state = make_state(config).await;

    for expected_inserted in [1, 0] {
      let (status, report) =
        send_json(state.clone(), "POST", "/api/sync/clublog", "").await;
      assert_eq!(status, StatusCode::OK);
      assert_eq!(report["fetched"], 1);
      assert_eq!(report["inserted"], expected_inserted);
    }

    let (status, rows) = send_json(state, "GET", "/api/remotes/clublog", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["remote_id"], "9");
    assert_eq!(rows[0]["callsign"], "K1ABC");
  }

  #[tokio::test]
  async fn sync_reports_upstream_failure_as_502() {
    let mut config = default_config();
    config.providers.lotw = Some(ApiKeyConfig {
      base_url: "http://127.0.0.1:1".into(),
      api_key:  "k".into(),
    });
    let state = make_state(config).await;
    let (status, _) = send(state, "POST", "/api/sync/lotw", "").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
  }

  // ── Catalog ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn catalog_tags_are_sorted_and_limited() {
    let state = make_state(default_config()).await;
    let (status, tags) = send_json(state, "GET", "/api/catalog/tags?limit=3", "").await;
    assert_eq!(status, StatusCode::OK);
    let tags: Vec<String> = serde_json::from_value(tags).unwrap();
    assert_eq!(tags.len(), 3);
    let mut sorted = tags.clone();
    sorted.sort();
    assert_eq!(tags, sorted);
  }
}
