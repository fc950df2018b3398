//! ADIF codec for loghub.
//!
//! Tokenizes ADIF text into [`RawRecord`]s, writes committed entries back out
//! as ADIF, and converts N1MM Logger+ contact broadcasts. Pure synchronous;
//! no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! let text = "<CALL:5>K1ABC<QSO_DATE:8>20240101<TIME_ON:4>1200<EOR>";
//! let records = loghub_adif::parse(text);
//! assert_eq!(records[0].get("CALL"), Some("K1ABC"));
//! ```

pub mod error;
mod export;
pub mod n1mm;
mod tokenize;

pub use error::{Error, Result};
pub use export::{ADIF_VERSION, PROGRAM_ID};
use loghub_core::{
  log::LogEntry,
  qso::{Extras, Qso, RawRecord},
};

// ─── Public API ──────────────────────────────────────────────────────────────

/// Tokenize ADIF text into raw records.
///
/// Never fails. A header, if any, ends at the first `<EOH>` and is skipped.
/// A malformed tag header ends its record; fields read before it are kept.
/// Records with no fields are dropped.
pub fn parse(text: &str) -> Vec<RawRecord> { tokenize::tokenize(text) }

/// Write `records` as a complete ADIF document with header.
pub fn export<'a, I>(records: I) -> String
where
  I: IntoIterator<Item = (&'a Qso, &'a Extras)>,
{
  let mut out = export::header();
  for (qso, extras) in records {
    out.push_str(&export::record(qso, extras));
  }
  out
}

/// Write committed log entries as a complete ADIF document.
pub fn export_entries(entries: &[LogEntry]) -> String {
  export(entries.iter().map(|e| (&e.qso, &e.extras)))
}

/// Write a single record with no header.
pub fn record_to_adif(qso: &Qso, extras: &Extras) -> String {
  export::record(qso, extras)
}

// ─── Round-trip test ─────────────────────────────────────────────────────────
