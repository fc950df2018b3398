pub mod entries;
pub mod imports;
pub mod remotes;

use axum::{
  Json,
  extract::{Query, State},
};
use loghub_core::store::LogStore;
use serde::Deserialize;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TagParams {
  pub limit: Option<usize>,
}

/// `GET /catalog/tags[?limit=N]`
pub async fn catalog_tags<S: LogStore + 'static>(
  State(state): State<AppState<S>>,
  Query(params): Query<TagParams>,
) -> Json<Vec<String>> {
  let limit = params.limit.unwrap_or(usize::MAX);
  Json(
    state
      .imports
      .catalog()
      .suggestions(limit)
      .into_iter()
      .map(str::to_owned)
      .collect(),
  )
}
