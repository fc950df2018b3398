//! The `Provider` adapter trait and credential types.

use std::future::Future;

use loghub_core::remote::RemoteRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Credentials for one provider call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Credentials {
  ApiKey { api_key: String },
  Login { username: String, password: String },
}

impl Credentials {
  pub fn api_key(key: impl Into<String>) -> Self {
    Self::ApiKey {
      api_key: key.into(),
    }
  }

  pub fn login(username: impl Into<String>, password: impl Into<String>) -> Self {
    Self::Login {
      username: username.into(),
      password: password.into(),
    }
  }

  /// The API key, or a credentials error naming `provider`.
  pub fn require_api_key(&self, provider: &'static str) -> Result<&str> {
    match self {
      Self::ApiKey { api_key } => Ok(api_key),
      Self::Login { .. } => Err(Error::Credentials {
        provider,
        expected: "API key",
      }),
    }
  }

  pub fn require_login(&self, provider: &'static str) -> Result<(&str, &str)> {
    match self {
      Self::Login { username, password } => Ok((username, password)),
      Self::ApiKey { .. } => Err(Error::Credentials {
        provider,
        expected: "username/password",
      }),
    }
  }
}

/// One third-party logging service.
///
/// Providers disagree on which field identifies a record; that quirk stays
/// inside [`Provider::identifier_of`] so reconciliation is provider-agnostic.
pub trait Provider: Send + Sync {
  /// Stable provider name, used as the first half of the remote key.
  fn name(&self) -> &'static str;

  /// The provider-native identifier of a fetched record, if it has one.
  fn identifier_of(&self, record: &RemoteRecord) -> Option<String>;

  fn fetch<'a>(
    &'a self,
    credentials: &'a Credentials,
  ) -> impl Future<Output = Result<Vec<RemoteRecord>>> + Send + 'a;

  fn push<'a>(
    &'a self,
    credentials: &'a Credentials,
    record: &'a RemoteRecord,
  ) -> impl Future<Output = Result<Value>> + Send + 'a;
}

/// Read `key` as an identifier. Numbers are stringified; blank strings and
/// every other JSON type count as missing.
pub fn identifier_field(record: &RemoteRecord, key: &str) -> Option<String> {
  match record.get(key)? {
    Value::Number(n) => Some(n.to_string()),
    Value::String(s) => Some(s.trim().to_owned()).filter(|s| !s.is_empty()),
    _ => None,
  }
}
