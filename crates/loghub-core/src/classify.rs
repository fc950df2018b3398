//! Splits a tokenized ADIF record into typed core fields and extras.
//!
//! The core/extras partition made here is the single source of truth: the
//! staging table, the committed log and the exporter all reuse it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  catalog::{TagCatalog, parse_adif_date, parse_adif_time, parse_decimal},
  qso::{Caster, CoreTag, CoreValue, Extras, Qso, RawRecord},
};

/// A record after classification.
///
/// A tag is never populated in both `qso` and `extras`: a core tag whose
/// value fails its caster lands in `extras` and its core field stays empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
  pub qso:    Qso,
  pub extras: Extras,
}

impl Caster {
  /// Convert trimmed, non-empty raw text. `None` means the cast failed.
  pub fn cast(self, raw: &str) -> Option<CoreValue> {
    match self {
      Caster::Text => Some(CoreValue::Text(raw.to_owned())),
      Caster::Date => parse_adif_date(raw).map(CoreValue::Date),
      Caster::Time => parse_adif_time(raw).map(CoreValue::Time),
      Caster::Decimal => parse_decimal(raw).map(CoreValue::Decimal),
      Caster::Integer => raw.parse::<i64>().ok().map(CoreValue::Integer),
    }
  }
}

/// Classify one raw record.
pub fn classify(record: &RawRecord, catalog: &TagCatalog) -> ClassifiedRecord {
  let mut out = ClassifiedRecord::default();

  for (tag, raw) in record.iter() {
    let value = raw.trim();
    if value.is_empty() {
      continue;
    }

    match CoreTag::lookup(tag) {
      Some(core) => match core.caster.cast(value) {
        Some(cast) => {
          out.qso.set(core.tag, cast);
        }
        None => {
          debug!(tag, value, "core value failed to cast; kept as extra");
          out.extras.insert(tag, value);
        }
      },
      None => {
        let normalized = catalog.normalize(tag, value);
        if !normalized.is_empty() {
          out.extras.insert(tag, normalized);
        }
      }
    }
  }

  fold_sota_sig(&mut out.qso);
  out
}

/// A `SIG`=`SOTA` pair whose `SIG_INFO` repeats the SOTA reference carries
/// nothing new, so it is dropped in favour of `SOTA_REF`. The exporter
/// writes that pair back, which keeps export and re-import a fixed point.
fn fold_sota_sig(qso: &mut Qso) {
  for (sig, info, sota_ref) in [
    (&mut qso.sig, &mut qso.sig_info, &qso.sota_ref),
    (&mut qso.my_sig, &mut qso.my_sig_info, &qso.my_sota_ref),
  ] {
    if !sota_ref.is_empty()
      && sig.eq_ignore_ascii_case("SOTA")
      && info.eq_ignore_ascii_case(sota_ref)
    {
      sig.clear();
      info.clear();
    }
  }
}

/// The staging gate: callsign, QSO date and start time must be present.
pub fn is_record_acceptable(record: &ClassifiedRecord) -> bool {
  !record.qso.callsign.trim().is_empty()
    && record.qso.qso_date.is_some()
    && record.qso.time_on.is_some()
}
