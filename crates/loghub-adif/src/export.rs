//! ADIF writer.
//!
//! Field lengths are written in characters, matching what the tokenizer
//! consumes.

use loghub_core::qso::{Extras, Qso, RawRecord};

pub const ADIF_VERSION: &str = "3.1.5";
pub const PROGRAM_ID: &str = "loghub";

pub(crate) fn push_field(out: &mut String, tag: &str, value: &str) {
  out.push_str(&format!("<{}:{}>{} ", tag, value.chars().count(), value));
}

pub(crate) fn header() -> String {
  let mut out = String::from("Generated by loghub\n");
  for (tag, value) in [
    ("ADIF_VER", ADIF_VERSION),
    ("PROGRAMID", PROGRAM_ID),
    ("PROGRAMVERSION", env!("CARGO_PKG_VERSION")),
  ] {
    push_field(&mut out, tag, value);
    out.push('\n');
  }
  out.push_str("<EOH>\n");
  out
}

/// Core fields in table order, the SOTA → SIG pairs when `SIG` and
/// `SIG_INFO` are both empty, then every extra whose tag is not already
/// written. Classification folds those pairs back into `SOTA_REF`.
fn record_fields(qso: &Qso, extras: &Extras) -> Vec<(String, String)> {
  let mut fields: Vec<(String, String)> = qso
    .adif_fields()
    .into_iter()
    .map(|(tag, value)| (tag.to_owned(), value))
    .collect();

  let sota = [
    ("SIG", "SIG_INFO", &qso.sig, &qso.sig_info, &qso.sota_ref),
    ("MY_SIG", "MY_SIG_INFO", &qso.my_sig, &qso.my_sig_info, &qso.my_sota_ref),
  ];
  for (sig_tag, info_tag, sig, info, sota_ref) in sota {
    if sig.trim().is_empty() && info.trim().is_empty() && !sota_ref.trim().is_empty() {
      fields.push((sig_tag.to_owned(), "SOTA".to_owned()));
      fields.push((info_tag.to_owned(), sota_ref.trim().to_owned()));
    }
  }

  for (tag, value) in extras.iter() {
    if value.is_empty() || fields.iter().any(|(t, _)| t == tag) {
      continue;
    }
    fields.push((tag.to_owned(), value.to_owned()));
  }
  fields
}

pub(crate) fn record(qso: &Qso, extras: &Extras) -> String {
  let mut out = String::new();
  for (tag, value) in record_fields(qso, extras) {
    push_field(&mut out, &tag, &value);
  }
  out.push_str("<EOR>\n");
  out
}

pub(crate) fn raw_record(raw: &RawRecord) -> String {
  let mut out = String::new();
  for (tag, value) in raw.iter() {
    push_field(&mut out, tag, value);
  }
  out.push_str("<EOR>\n");
  out
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, NaiveTime};

  use super::*;

  fn qso() -> Qso {
    Qso {
      callsign: "K1ABC".into(),
      qso_date: NaiveDate::from_ymd_opt(2024, 1, 1),
      time_on: NaiveTime::from_hms_opt(12, 34, 56),
      mode: "SSB".into(),
      freq: Some(14.074),
      ..Qso::default()
    }
  }

  #[test]
  fn core_fields_are_written_canonically() {
    let s = record(&qso(), &Extras::new());
    assert!(s.contains("<CALL:5>K1ABC"));
    assert!(s.contains("<QSO_DATE:8>20240101"));
    assert!(s.contains("<TIME_ON:6>123456"));
    assert!(s.contains("<FREQ:6>14.074"));
    assert!(s.ends_with("<EOR>\n"));
  }

  #[test]
  fn header_names_the_program() {
    let h = header();
    assert!(h.contains("<ADIF_VER:5>3.1.5"));
    assert!(h.contains("<PROGRAMID:6>loghub"));
    assert!(h.ends_with("<EOH>\n"));
    assert!(!h.starts_with('<'));
  }

  #[test]
  fn sota_refs_emit_sig_pairs() {
    let mut q = qso();
    q.sota_ref = "G/SP-013".into();
    q.my_sota_ref = "G/SP-015".into();
    let s = record(&q, &Extras::new());
    assert!(s.contains("<SOTA_REF:8>G/SP-013"));
    assert!(s.contains("<SIG:4>SOTA"));
    assert!(s.contains("<SIG_INFO:8>G/SP-013"));
    assert!(s.contains("<MY_SIG:4>SOTA"));
    assert!(s.contains("<MY_SIG_INFO:8>G/SP-015"));
  }

  #[test]
  fn explicit_sig_is_not_overridden() {
    let mut q = qso();
    q.sig = "POTA".into();
    q.sig_info = "K-4321".into();
    q.sota_ref = "W7W/LC-001".into();
    let s = record(&q, &Extras::new());
    assert!(s.contains("<SIG:4>POTA"));
    assert!(!s.contains("<SIG:4>SOTA"));
  }

  #[test]
  fn lone_sig_info_suppresses_the_sota_pair() {
    let mut q = qso();
    q.sig_info = "K-4321".into();
    q.sota_ref = "W7W/LC-001".into();
    let s = record(&q, &Extras::new());
    assert_eq!(s.matches("<SIG_INFO:").count(), 1);
    assert!(!s.contains("<SIG:"));
  }

  #[test]
  fn extras_do_not_duplicate_core_fields() {
    let mut extras = Extras::new();
    extras.insert("CALL", "DUPE");
    extras.insert("QSL_RCVD", "Y");
    let s = record(&qso(), &extras);
    assert_eq!(s.matches("<CALL:").count(), 1);
    assert!(s.contains("<QSL_RCVD:1>Y"));
  }
}
