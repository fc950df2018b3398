//! Reconciliation of the local log against third-party logging services.
//!
//! Each service is a [`Provider`]: `fetch`, `push` and `identifier_of`. The
//! generic [`reconcile`] pass upserts fetched records into the store's
//! remote-shadow table keyed on `(provider, identifier)` and optionally pushes
//! every committed entry back out.

mod client;
pub mod error;
pub mod provider;
pub mod providers;
mod reconcile;
pub mod registry;

pub use error::{Error, Result};
pub use provider::{Credentials, Provider};
pub use reconcile::{SyncReport, push_payload, reconcile};
pub use registry::{AnyProvider, ProviderName, ProvidersConfig};
