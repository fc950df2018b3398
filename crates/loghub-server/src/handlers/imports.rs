//! Handlers for `/imports` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/imports` | Body: raw ADIF. `?file_name=&station_callsign=&notes=` |
//! | `POST` | `/imports/n1mm` | Body: one N1MM `<contactinfo>` message |
//! | `GET`  | `/imports` | Newest first |
//! | `GET`  | `/imports/{id}` | |
//! | `GET`  | `/imports/{id}/review` | Read-only preview of finalize |
//! | `POST` | `/imports/{id}/finalize` | 409 unless pending |
//! | `POST` | `/imports/{id}/cancel` | 409 unless pending |
//! | `DELETE` | `/imports/{id}` | Committed entries survive |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use bytes::Bytes;
use loghub_core::{
  import::{FinalizeReport, Import, ImportRequest, ReviewReport},
  store::LogStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CreateParams {
  pub file_name:        Option<String>,
  pub station_callsign: Option<String>,
  pub notes:            Option<String>,
}

/// `POST /imports`
pub async fn create<S: LogStore + 'static>(
  State(state): State<AppState<S>>,
  Query(params): Query<CreateParams>,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
  let request = ImportRequest {
    station_callsign: params
      .station_callsign
      .or_else(|| state.config.station_callsign.clone()),
    notes: params.notes,
    ..ImportRequest::adif_file(params.file_name)
  };
  let import = state.imports.create_import(&body, request).await?;
  Ok((StatusCode::CREATED, Json(import)))
}

/// `POST /imports/n1mm`
pub async fn create_n1mm<S: LogStore + 'static>(
  State(state): State<AppState<S>>,
  body: String,
) -> Result<impl IntoResponse, ApiError> {
  let import = state
    .imports
    .create_n1mm_import(&body, state.config.station_callsign.clone())
    .await?;
  Ok((StatusCode::CREATED, Json(import)))
}

// ─── Read ─────────────────────────────────────────────────────────────────────

/// `GET /imports`
pub async fn list<S: LogStore + 'static>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Import>>, ApiError> {
  Ok(Json(state.imports.list().await?))
}

/// `GET /imports/{id}`
pub async fn get_one<S: LogStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Import>, ApiError> {
  Ok(Json(state.imports.get(id).await?))
}

/// `GET /imports/{id}/review`
pub async fn review<S: LogStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ReviewReport>, ApiError> {
  Ok(Json(state.imports.review(id).await?))
}

// ─── Transitions ──────────────────────────────────────────────────────────────

/// `POST /imports/{id}/finalize`
pub async fn finalize<S: LogStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<FinalizeReport>, ApiError> {
  Ok(Json(state.imports.finalize(id).await?))
}

/// `POST /imports/{id}/cancel`
pub async fn cancel<S: LogStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Import>, ApiError> {
  Ok(Json(state.imports.cancel(id).await?))
}

/// `DELETE /imports/{id}`
pub async fn delete_one<S: LogStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state.imports.delete(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
