//! HTTP adapters for the supported logging services.
//!
//! | Provider | Credentials | Identifier |
//! |---|---|---|
//! | Club Log | API key, query `api_key` | `id` |
//! | LoTW | API key, bearer token | `remote_id` |
//! | Ham365 | API key, bearer token | `remote_id` |
//! | QRZ | username/password, query `user`/`password` | `id` |

use loghub_core::remote::RemoteRecord;
use serde_json::Value;

use crate::{
  client::{Auth, RestClient},
  error::Result,
  provider::{Credentials, Provider, identifier_field},
};

// ─── Club Log ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ClubLog {
  client: RestClient,
}

impl ClubLog {
  pub const NAME: &'static str = "clublog";

  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    Ok(Self {
      client: RestClient::new(Self::NAME, base_url)?,
    })
  }
}

impl Provider for ClubLog {
  fn name(&self) -> &'static str { Self::NAME }

  fn identifier_of(&self, record: &RemoteRecord) -> Option<String> {
    identifier_field(record, "id")
  }

  async fn fetch(&self, credentials: &Credentials) -> Result<Vec<RemoteRecord>> {
    let key = credentials.require_api_key(Self::NAME)?;
    self.client.fetch_records(Auth::Query(&[("api_key", key)])).await
  }

  async fn push(&self, credentials: &Credentials, record: &RemoteRecord) -> Result<Value> {
    let key = credentials.require_api_key(Self::NAME)?;
    self
      .client
      .push_record(Auth::Query(&[("api_key", key)]), record)
      .await
  }
}

// ─── LoTW ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Lotw {
  client: RestClient,
}

impl Lotw {
  pub const NAME: &'static str = "lotw";

  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    Ok(Self {
      client: RestClient::new(Self::NAME, base_url)?,
    })
  }
}

impl Provider for Lotw {
  fn name(&self) -> &'static str { Self::NAME }

  fn identifier_of(&self, record: &RemoteRecord) -> Option<String> {
    identifier_field(record, "remote_id")
  }

  async fn fetch(&self, credentials: &Credentials) -> Result<Vec<RemoteRecord>> {
    let key = credentials.require_api_key(Self::NAME)?;
    self.client.fetch_records(Auth::Bearer(key)).await
  }

  async fn push(&self, credentials: &Credentials, record: &RemoteRecord) -> Result<Value> {
    let key = credentials.require_api_key(Self::NAME)?;
    self.client.push_record(Auth::Bearer(key), record).await
  }
}

// ─── Ham365 ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Ham365 {
  client: RestClient,
}

impl Ham365 {
  pub const NAME: &'static str = "ham365";

  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    Ok(Self {
      client: RestClient::new(Self::NAME, base_url)?,
    })
  }
}

impl Provider for Ham365 {
  fn name(&self) -> &'static str { Self::NAME }

  fn identifier_of(&self, record: &RemoteRecord) -> Option<String> {
    identifier_field(record, "remote_id")
  }

  async fn fetch(&self, credentials: &Credentials) -> Result<Vec<RemoteRecord>> {
    let key = credentials.require_api_key(Self::NAME)?;
    self.client.fetch_records(Auth::Bearer(key)).await
  }

  async fn push(&self, credentials: &Credentials, record: &RemoteRecord) -> Result<Value> {
    let key = credentials.require_api_key(Self::NAME)?;
    self.client.push_record(Auth::Bearer(key), record).await
  }
}

// ─── QRZ ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Qrz {
  client: RestClient,
}

impl Qrz {
  pub const NAME: &'static str = "qrz";

  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    Ok(Self {
      client: RestClient::new(Self::NAME, base_url)?,
    })
  }
}

impl Provider for Qrz {
  fn name(&self) -> &'static str { Self::NAME }

  fn identifier_of(&self, record: &RemoteRecord) -> Option<String> {
    identifier_field(record, "id")
  }

  async fn fetch(&self, credentials: &Credentials) -> Result<Vec<RemoteRecord>> {
    let (user, password) = credentials.require_login(Self::NAME)?;
    self
      .client
      .fetch_records(Auth::Query(&[("user", user), ("password", password)]))
      .await
  }

  async fn push(&self, credentials: &Credentials, record: &RemoteRecord) -> Result<Value> {
    let (user, password) = credentials.require_login(Self::NAME)?;
    self
      .client
      .push_record(Auth::Query(&[("user", user), ("password", password)]), record)
      .await
  }
}
