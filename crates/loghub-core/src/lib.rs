//! Core types and trait definitions for the loghub QSO log.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the QSO schema, the ADIF tag catalog, the core/extras classifier, the
//! commit-time validation rules and the [`store::LogStore`] abstraction.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod classify;
pub mod error;
pub mod import;
pub mod log;
pub mod qso;
pub mod remote;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
