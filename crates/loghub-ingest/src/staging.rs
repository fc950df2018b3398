//! Tokenize, classify and gate a payload into stageable records.

use loghub_core::{
  catalog::TagCatalog,
  classify::{ClassifiedRecord, classify, is_record_acceptable},
};
use tracing::debug;

/// The outcome of staging one payload.
#[derive(Debug, Default)]
pub struct Staging {
  pub staged:   Vec<ClassifiedRecord>,
  /// Records dropped by the acceptability gate.
  pub rejected: u32,
}

/// Stage every record in `text`.
///
/// Records without a callsign, QSO date or start time are counted and
/// dropped; siblings are unaffected. When a record carries neither
/// `STATION_CALLSIGN` nor `OPERATOR`, `station_callsign` is applied to it.
pub fn stage(text: &str, catalog: &TagCatalog, station_callsign: Option<&str>) -> Staging {
  let mut out = Staging::default();

  for (index, raw) in loghub_adif::parse(text).iter().enumerate() {
    let mut rec = classify(raw, catalog);
    if !is_record_acceptable(&rec) {
      debug!(index, call = raw.get("CALL").unwrap_or(""), "record rejected at staging");
      out.rejected += 1;
      continue;
    }

    if let Some(call) = station_callsign
      && rec.qso.station_callsign.is_empty()
      && rec.qso.operator.is_empty()
    {
      rec.qso.station_callsign = call.to_owned();
    }
    out.staged.push(rec);
  }

  out
}
