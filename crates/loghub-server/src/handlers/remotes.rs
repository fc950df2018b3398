//! Remote-shadow listing and sync passes.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use loghub_core::{remote::RemoteEntry, store::LogStore};
use loghub_sync::{ProviderName, SyncReport, reconcile};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

/// `GET /remotes/{provider}`
pub async fn list<S: LogStore + 'static>(
  State(state): State<AppState<S>>,
  Path(provider): Path<String>,
) -> Result<Json<Vec<RemoteEntry>>, ApiError> {
  let name = ProviderName::parse(&provider)?;
  let entries = state
    .imports
    .store()
    .list_remote_entries(Some(name.to_string()))
    .await
    .map_err(|e| ApiError::Internal(Box::new(e)))?;
  Ok(Json(entries))
}

#[derive(Debug, Default, Deserialize)]
pub struct SyncParams {
  #[serde(default)]
  pub push: bool,
}

/// `POST /sync/{provider}[?push=true]`
pub async fn sync<S: LogStore + 'static>(
  State(state): State<AppState<S>>,
  Path(provider): Path<String>,
  Query(params): Query<SyncParams>,
) -> Result<Json<SyncReport>, ApiError> {
  let name = ProviderName::parse(&provider)?;
  let (provider, credentials) = state.config.providers.resolve(name)?;
  let report = reconcile(
    state.imports.store().as_ref(),
    &provider,
    &credentials,
    params.push,
  )
  .await?;
  Ok(Json(report))
}
