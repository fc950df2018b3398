//! Error type for `loghub-sync`.

use loghub_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] loghub_core::Error),

  /// The request never produced a response.
  #[error("{provider}: request failed: {source}")]
  Transport {
    provider: &'static str,
    #[source]
    source:   reqwest::Error,
  },

  /// The provider answered with a non-success status.
  #[error("{provider}: HTTP {status}")]
  Status {
    provider: &'static str,
    status:   reqwest::StatusCode,
  },

  #[error("{provider}: expects {expected} credentials")]
  Credentials {
    provider: &'static str,
    expected: &'static str,
  },

  #[error("{provider}: provider is not configured")]
  NotConfigured { provider: &'static str },

  #[error("{provider}: unreadable response: {message}")]
  Decode {
    provider: &'static str,
    message:  String,
  },

  #[error("store error: {0}")]
  Store(Box<dyn StoreError>),
}

impl Error {
  pub fn from_store<E: StoreError>(e: E) -> Self { Self::Store(Box::new(e)) }

  pub fn core(&self) -> Option<&loghub_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      Self::Store(e) => e.as_core(),
      _ => None,
    }
  }

  /// `true` when the provider itself failed, as opposed to local storage.
  pub fn is_transport(&self) -> bool {
    matches!(
      self,
      Self::Transport { .. } | Self::Status { .. } | Self::Decode { .. }
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
