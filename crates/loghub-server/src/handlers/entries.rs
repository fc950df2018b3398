//! Handlers for the committed log.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/entries` | `?callsign=&band=&import_id=&limit=&offset=` |
//! | `POST` | `/entries` | Body: `{"qso": {...}, "extras": {...}}`; 422 on violations |
//! | `GET`  | `/entries/{id}` | |
//! | `GET`  | `/export.adif` | Same filters as `/entries` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{StatusCode, header},
  response::IntoResponse,
};
use loghub_core::{
  log::{EntryQuery, LogEntry},
  qso::{Extras, Qso},
  store::LogStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// `GET /entries`
pub async fn list<S: LogStore + 'static>(
  State(state): State<AppState<S>>,
  Query(query): Query<EntryQuery>,
) -> Result<Json<Vec<LogEntry>>, ApiError> {
  Ok(Json(state.imports.entries(&query).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub qso:    Qso,
  #[serde(default)]
  pub extras: Extras,
}

/// `POST /entries`
pub async fn create<S: LogStore + 'static>(
  State(state): State<AppState<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let entry = state.imports.add_entry(body.qso, body.extras).await?;
  Ok((StatusCode::CREATED, Json(entry)))
}

/// `GET /entries/{id}`
pub async fn get_one<S: LogStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<LogEntry>, ApiError> {
  Ok(Json(state.imports.get_entry(id).await?))
}

/// `GET /export.adif`
pub async fn export<S: LogStore + 'static>(
  State(state): State<AppState<S>>,
  Query(query): Query<EntryQuery>,
) -> Result<impl IntoResponse, ApiError> {
  let adif = state.imports.export(&query).await?;
  Ok((
    [
      (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
      (header::CONTENT_DISPOSITION, "attachment; filename=\"loghub.adi\""),
    ],
    adif,
  ))
}
