//! Async HTTP client shared by the provider adapters.

use std::time::Duration;

use loghub_core::remote::RemoteRecord;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

/// How a provider wants its credentials presented.
#[derive(Debug, Clone, Copy)]
pub enum Auth<'a> {
  /// Sent as query-string parameters.
  Query(&'a [(&'a str, &'a str)]),
  /// Sent as `Authorization: Bearer <token>`.
  Bearer(&'a str),
}

/// JSON client for one provider's `/qsos` collection.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct RestClient {
  client:   Client,
  base_url: String,
  provider: &'static str,
}

impl RestClient {
  pub fn new(provider: &'static str, base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(|source| Error::Transport { provider, source })?;
    Ok(Self {
      client,
      base_url: base_url.into(),
      provider,
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }

  fn authed(&self, req: RequestBuilder, auth: Auth<'_>) -> RequestBuilder {
    match auth {
      Auth::Query(params) => req.query(params),
      Auth::Bearer(token) => req.bearer_auth(token),
    }
  }

  async fn send(&self, req: RequestBuilder) -> Result<Response> {
    let provider = self.provider;
    let resp = req
      .send()
      .await
      .map_err(|source| Error::Transport { provider, source })?;
    if !resp.status().is_success() {
      return Err(Error::Status {
        provider,
        status: resp.status(),
      });
    }
    Ok(resp)
  }

  async fn body(&self, resp: Response) -> Result<Vec<u8>> {
    let provider = self.provider;
    let bytes = resp
      .bytes()
      .await
      .map_err(|source| Error::Transport { provider, source })?;
    Ok(bytes.to_vec())
  }

  // ── QSOs ──────────────────────────────────────────────────────────────────

  /// `GET {base}/qsos`
  pub async fn fetch_records(&self, auth: Auth<'_>) -> Result<Vec<RemoteRecord>> {
    let resp = self
      .send(self.authed(self.client.get(self.url("/qsos")), auth))
      .await?;
    let body = self.body(resp).await?;
    let records: Vec<RemoteRecord> =
      serde_json::from_slice(&body).map_err(|e| Error::Decode {
        provider: self.provider,
        message:  e.to_string(),
      })?;
    debug!(provider = self.provider, records = records.len(), "fetched records");
    Ok(records)
  }

  /// `POST {base}/qsos` with one flat JSON record. An empty response body
  /// acknowledges as `null`.
  pub async fn push_record(&self, auth: Auth<'_>, record: &RemoteRecord) -> Result<Value> {
    let req = self.client.post(self.url("/qsos")).json(record);
    let resp = self.send(self.authed(req, auth)).await?;
    let body = self.body(resp).await?;
    if body.iter().all(u8::is_ascii_whitespace) {
      return Ok(Value::Null);
    }
    serde_json::from_slice(&body).map_err(|e| Error::Decode {
      provider: self.provider,
      message:  e.to_string(),
    })
  }
}
