//! The staged-import workflow: upload, review, finalize or cancel.
//!
//! [`ImportService`] is generic over [`loghub_core::store::LogStore`] and owns
//! everything that happens before the store is involved: tokenizing,
//! classifying, the staging gate, payload checksums and compression.

pub mod error;
mod service;
pub mod staging;

pub use error::{Error, Result};
pub use service::{ImportService, checksum};
