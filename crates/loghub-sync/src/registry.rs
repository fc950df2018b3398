//! Provider lookup by name, driven by configuration.

use std::str::FromStr;

use loghub_core::remote::RemoteRecord;
use serde::Deserialize;
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};

use crate::{
  error::{Error, Result},
  provider::{Credentials, Provider},
  providers::{ClubLog, Ham365, Lotw, Qrz},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProviderName {
  ClubLog,
  Lotw,
  Ham365,
  Qrz,
}

impl ProviderName {
  /// Parse a user-supplied provider name.
  pub fn parse(name: &str) -> Result<Self> {
    Self::from_str(name.trim())
      .map_err(|_| Error::Core(loghub_core::Error::UnknownProvider(name.to_owned())))
  }
}

// ─── Config ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeyConfig {
  pub base_url: String,
  pub api_key:  String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// The `[providers]` configuration table. Absent sections are unconfigured.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
  #[serde(default)]
  pub clublog: Option<ApiKeyConfig>,
  #[serde(default)]
  pub lotw:    Option<ApiKeyConfig>,
  #[serde(default)]
  pub ham365:  Option<ApiKeyConfig>,
  #[serde(default)]
  pub qrz:     Option<LoginConfig>,
}

impl ProvidersConfig {
  /// Build the adapter and credentials for `name`.
  pub fn resolve(&self, name: ProviderName) -> Result<(AnyProvider, Credentials)> {
    let missing = || Error::NotConfigured {
      provider: match name {
        ProviderName::ClubLog => ClubLog::NAME,
        ProviderName::Lotw => Lotw::NAME,
        ProviderName::Ham365 => Ham365::NAME,
        ProviderName::Qrz => Qrz::NAME,
      },
    };
    let keyed = |cfg: &Option<ApiKeyConfig>| {
      cfg
        .as_ref()
        .map(|c| (c.base_url.clone(), Credentials::api_key(c.api_key.clone())))
        .ok_or_else(missing)
    };

    Ok(match name {
      ProviderName::ClubLog => {
        let (url, creds) = keyed(&self.clublog)?;
        (AnyProvider::ClubLog(ClubLog::new(url)?), creds)
      }
      ProviderName::Lotw => {
        let (url, creds) = keyed(&self.lotw)?;
        (AnyProvider::Lotw(Lotw::new(url)?), creds)
      }
      ProviderName::Ham365 => {
        let (url, creds) = keyed(&self.ham365)?;
        (AnyProvider::Ham365(Ham365::new(url)?), creds)
      }
      ProviderName::Qrz => {
        let c = self.qrz.as_ref().ok_or_else(missing)?;
        (
          AnyProvider::Qrz(Qrz::new(c.base_url.clone())?),
          Credentials::login(c.username.clone(), c.password.clone()),
        )
      }
    })
  }
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

/// Any one of the built-in adapters.
#[derive(Debug, Clone)]
pub enum AnyProvider {
  ClubLog(ClubLog),
  Lotw(Lotw),
  Ham365(Ham365),
  Qrz(Qrz),
}

impl Provider for AnyProvider {
  fn name(&self) -> &'static str {
    match self {
      Self::ClubLog(p) => p.name(),
      Self::Lotw(p) => p.name(),
      Self::Ham365(p) => p.name(),
      Self::Qrz(p) => p.name(),
    }
  }

  fn identifier_of(&self, record: &RemoteRecord) -> Option<String> {
    match self {
      Self::ClubLog(p) => p.identifier_of(record),
      Self::Lotw(p) => p.identifier_of(record),
      Self::Ham365(p) => p.identifier_of(record),
      Self::Qrz(p) => p.identifier_of(record),
    }
  }

  async fn fetch(&self, credentials: &Credentials) -> Result<Vec<RemoteRecord>> {
    match self {
      Self::ClubLog(p) => p.fetch(credentials).await,
      Self::Lotw(p) => p.fetch(credentials).await,
      Self::Ham365(p) => p.fetch(credentials).await,
      Self::Qrz(p) => p.fetch(credentials).await,
    }
  }

  async fn push(&self, credentials: &Credentials, record: &RemoteRecord) -> Result<Value> {
    match self {
      Self::ClubLog(p) => p.push(credentials, record).await,
      Self::Lotw(p) => p.push(credentials, record).await,
      Self::Ham365(p) => p.push(credentials, record).await,
      Self::Qrz(p) => p.push(credentials, record).await,
    }
  }
}
