//! Error type for `loghub-ingest`.

use loghub_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] loghub_core::Error),

  /// Any failure reported by the backing store.
  #[error("store error: {0}")]
  Store(Box<dyn StoreError>),

  #[error("N1MM message rejected: {0}")]
  N1mm(#[from] loghub_adif::Error),

  #[error("payload compression failed: {0}")]
  Compression(#[source] std::io::Error),
}

impl Error {
  pub fn from_store<E: StoreError>(e: E) -> Self { Self::Store(Box::new(e)) }

  /// The domain error behind this failure, whether the service or the store
  /// raised it.
  pub fn core(&self) -> Option<&loghub_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      Self::Store(e) => e.as_core(),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
