//! Error types for the loghub-adif codec.
//!
//! Tokenizing never fails: malformed tag headers end the current record and
//! the fields read so far are kept. Only N1MM conversion reports errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("not an N1MM message (app = {0:?})")]
  NotN1mm(String),

  #[error("N1MM message is missing <{0}>")]
  MissingElement(&'static str),

  #[error("invalid N1MM timestamp: {0}")]
  InvalidTimestamp(String),

  #[error("invalid N1MM frequency: {0}")]
  InvalidFrequency(String),

  #[error("XML error: {0}")]
  Xml(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
