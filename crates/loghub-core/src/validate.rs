//! Commit-time validation of a QSO.
//!
//! Staging only checks [`crate::classify::is_record_acceptable`]; everything
//! here runs when a record is promoted into the committed log. Validation is
//! a pure function: it returns a normalized copy or the full list of
//! violations, and leaves storage to the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::qso::Qso;

/// One broken rule, keyed by the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{field}: {message}")]
pub struct Violation {
  pub field:   String,
  pub message: String,
}

impl Violation {
  fn new(field: &str, message: impl Into<String>) -> Self {
    Self {
      field:   field.to_owned(),
      message: message.into(),
    }
  }
}

// ─── Band plan ───────────────────────────────────────────────────────────────

/// Amateur band edges in MHz, inclusive.
pub const BAND_PLAN: &[(f64, f64, &str)] = &[
  (1.8, 2.0, "160m"),
  (3.5, 4.0, "80m"),
  (5.2, 5.5, "60m"),
  (7.0, 7.3, "40m"),
  (10.1, 10.15, "30m"),
  (14.0, 14.35, "20m"),
  (18.068, 18.168, "17m"),
  (21.0, 21.45, "15m"),
  (24.89, 24.99, "12m"),
  (28.0, 29.7, "10m"),
  (50.0, 54.0, "6m"),
  (70.0, 71.0, "4m"),
  (144.0, 148.0, "2m"),
  (222.0, 225.0, "1.25m"),
  (420.0, 450.0, "70cm"),
  (902.0, 928.0, "33cm"),
  (1240.0, 1300.0, "23cm"),
];

/// The band containing `freq_mhz`, if any.
pub fn band_for_freq(freq_mhz: f64) -> Option<&'static str> {
  BAND_PLAN
    .iter()
    .find(|(lo, hi, _)| (*lo..=*hi).contains(&freq_mhz))
    .map(|(_, _, band)| *band)
}

// ─── Callsigns ───────────────────────────────────────────────────────────────

/// Check a callsign and return its canonical (trimmed, uppercase) form.
pub fn check_callsign(value: &str) -> Result<String, &'static str> {
  let v = value.trim().to_uppercase();
  let len = v.chars().count();
  if !(3..=20).contains(&len) {
    return Err("callsign length must be 3..20");
  }
  if !v.chars().all(|c| c.is_ascii_alphanumeric() || c == '/') {
    return Err("callsign must contain A-Z, 0-9 or '/' only");
  }
  if v.starts_with('/') || v.ends_with('/') {
    return Err("callsign must not begin or end with '/'");
  }
  if !v.chars().any(|c| c.is_ascii_alphabetic())
    || !v.chars().any(|c| c.is_ascii_digit())
  {
    return Err("callsign must contain at least one letter and one digit");
  }
  if v.starts_with('0') {
    return Err("callsign must not begin with 0");
  }
  if v.starts_with('1') && !["1A", "1M", "1S"].iter().any(|p| v.starts_with(p)) {
    return Err("callsign starting with 1 must begin with 1A, 1M or 1S");
  }
  Ok(v)
}

// ─── Entry validation ────────────────────────────────────────────────────────

/// Validate `qso` for commit.
///
/// On success the returned copy has callsigns uppercased, `band` (and
/// `band_rx`) derived from frequency when missing, and `station_callsign`
/// filled from `operator` when empty.
pub fn validate(qso: &Qso) -> Result<Qso, Vec<Violation>> {
  let mut q = qso.clone();
  let mut violations = Vec::new();

  match check_callsign(&q.callsign) {
    Ok(v) => q.callsign = v,
    Err(msg) => violations.push(Violation::new("callsign", msg)),
  }
  for (field, slot) in [
    ("station_callsign", &mut q.station_callsign),
    ("operator", &mut q.operator),
  ] {
    if slot.trim().is_empty() {
      slot.clear();
      continue;
    }
    match check_callsign(slot) {
      Ok(v) => *slot = v,
      Err(msg) => violations.push(Violation::new(field, msg)),
    }
  }

  if q.qso_date.is_none() {
    violations.push(Violation::new("qso_date", "QSO_DATE is required"));
  }
  if q.time_on.is_none() {
    violations.push(Violation::new("time_on", "TIME_ON is required"));
  }

  q.band = q.band.trim().to_owned();
  let freq = q.freq.filter(|f| *f > 0.0);
  if q.band.is_empty() {
    match freq {
      None => {
        violations.push(Violation::new("band", "one of BAND or FREQ must be present"));
      }
      Some(f) => match band_for_freq(f) {
        Some(band) => q.band = band.to_owned(),
        None => violations.push(Violation::new(
          "freq",
          format!("unable to derive BAND from FREQ {f}"),
        )),
      },
    }
  }

  if q.band_rx.trim().is_empty()
    && let Some(band) = q.freq_rx.filter(|f| *f > 0.0).and_then(band_for_freq)
  {
    q.band_rx = band.to_owned();
  }

  let sat_name_set = !q.sat_name.trim().is_empty();
  if q.prop_mode.trim().eq_ignore_ascii_case("SAT") {
    if !sat_name_set {
      violations.push(Violation::new(
        "sat_name",
        "SAT_NAME required when PROP_MODE is SAT",
      ));
    }
  } else if sat_name_set {
    violations.push(Violation::new(
      "sat_name",
      "SAT_NAME must be omitted unless PROP_MODE is SAT",
    ));
  }

  if q.station_callsign.is_empty() && !q.operator.is_empty() {
    q.station_callsign = q.operator.clone();
  }

  if violations.is_empty() { Ok(q) } else { Err(violations) }
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, NaiveTime};

  use super::*;

  fn base() -> Qso {
    Qso {
      callsign: "K1ABC".into(),
      qso_date: NaiveDate::from_ymd_opt(2024, 1, 1),
      time_on: NaiveTime::from_hms_opt(12, 0, 0),
      mode: "SSB".into(),
      band: "20m".into(),
      ..Qso::default()
    }
  }

  fn fields(err: Vec<Violation>) -> Vec<String> {
    err.into_iter().map(|v| v.field).collect()
  }

  #[test]
  fn band_plan_lookup() {
    assert_eq!(band_for_freq(14.074), Some("20m"));
    assert_eq!(band_for_freq(7.074), Some("40m"));
    assert_eq!(band_for_freq(1296.0), Some("23cm"));
    assert_eq!(band_for_freq(29.8), None);
    assert_eq!(band_for_freq(999.0), None);
  }

  #[test]
  fn callsign_rules() {
    assert_eq!(check_callsign("k1abc").as_deref(), Ok("K1ABC"));
    assert_eq!(check_callsign("EA8/DL1ABC").as_deref(), Ok("EA8/DL1ABC"));
    assert_eq!(check_callsign("1A0KM").as_deref(), Ok("1A0KM"));
    assert!(check_callsign("/BAD/").is_err());
    assert!(check_callsign("K1").is_err());
    assert!(check_callsign("K1-ABC").is_err());
    assert!(check_callsign("ABCDEF").is_err());
    assert!(check_callsign("12345").is_err());
    assert!(check_callsign("0K1AB").is_err());
    assert!(check_callsign("1B2CD").is_err());
    assert!(check_callsign("K1ABCDEFGHIJKLMNOPQRS").is_err());
  }

  #[test]
  fn valid_entry_passes_and_is_normalized() {
    let mut q = base();
    q.callsign = "k1abc".into();
    let out = validate(&q).unwrap();
    assert_eq!(out.callsign, "K1ABC");
    assert_eq!(out.band, "20m");
  }

  #[test]
  fn band_derived_from_freq() {
    let mut q = base();
    q.band.clear();
    q.freq = Some(14.074);
    assert_eq!(validate(&q).unwrap().band, "20m");
  }

  #[test]
  fn freq_outside_band_plan_fails() {
    let mut q = base();
    q.band.clear();
    q.freq = Some(29.8);
    assert_eq!(fields(validate(&q).unwrap_err()), vec!["freq"]);
  }

  #[test]
  fn band_or_freq_required() {
    let mut q = base();
    q.band.clear();
    assert_eq!(fields(validate(&q).unwrap_err()), vec!["band"]);
  }

  #[test]
  fn band_rx_derived_from_freq_rx() {
    let mut q = base();
    q.freq_rx = Some(7.1);
    assert_eq!(validate(&q).unwrap().band_rx, "40m");
  }

  #[test]
  fn satellite_rules() {
    let mut sat = base();
    sat.prop_mode = "SAT".into();
    assert_eq!(fields(validate(&sat).unwrap_err()), vec!["sat_name"]);
    sat.sat_name = "AO-91".into();
    assert!(validate(&sat).is_ok());

    let mut terrestrial = base();
    terrestrial.sat_name = "AO-91".into();
    assert_eq!(fields(validate(&terrestrial).unwrap_err()), vec!["sat_name"]);
  }

  #[test]
  fn bad_callsign_fails() {
    let mut q = base();
    q.callsign = "/BAD/".into();
    assert_eq!(fields(validate(&q).unwrap_err()), vec!["callsign"]);
  }

  #[test]
  fn station_callsign_falls_back_to_operator() {
    let mut q = base();
    q.operator = "w1aw".into();
    let out = validate(&q).unwrap();
    assert_eq!(out.operator, "W1AW");
    assert_eq!(out.station_callsign, "W1AW");
  }

  #[test]
  fn all_violations_are_reported() {
    let q = Qso {
      callsign: "/X/".into(),
      prop_mode: "SAT".into(),
      ..Qso::default()
    };
    let f = fields(validate(&q).unwrap_err());
    assert_eq!(f, vec!["callsign", "qso_date", "time_on", "band", "sat_name"]);
  }
}
