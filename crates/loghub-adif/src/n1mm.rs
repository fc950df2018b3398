//! N1MM Logger+ contact broadcasts.
//!
//! N1MM sends one `<contactinfo>` XML document per logged contact over UDP.
//! This module reads the handful of elements that map onto ADIF and ignores
//! the rest.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use loghub_core::qso::RawRecord;
use quick_xml::events::Event;

use crate::{
  error::{Error, Result},
  export,
};

/// `(element, ADIF tag)` pairs copied verbatim when non-empty. The first
/// group is written before the frequencies, the second after.
const IDENTITY: &[(&str, &str)] = &[
  ("mycall", "OPERATOR"),
  ("call", "CALL"),
  ("mode", "MODE"),
];
const DETAILS: &[(&str, &str)] = &[
  ("snt", "RST_SENT"),
  ("rcv", "RST_RCVD"),
  ("power", "TX_PWR"),
  ("name", "NAME"),
  ("qth", "QTH"),
  ("comment", "COMMENT"),
];

/// Text of every direct child of the root element, keyed by local name.
fn child_elements(xml: &str) -> Result<HashMap<String, String>> {
  let mut reader = quick_xml::Reader::from_reader(xml.as_bytes());
  reader.config_mut().trim_text(true);

  let mut depth = 0usize;
  let mut current: Option<String> = None;
  let mut out = HashMap::new();
  let mut buf = Vec::new();

  loop {
    match reader.read_event_into(&mut buf) {
      Ok(Event::Start(ref e)) => {
        depth += 1;
        if depth == 2 {
          current = Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
        }
      }
      Ok(Event::End(_)) => {
        if depth == 2 {
          current = None;
        }
        depth = depth.saturating_sub(1);
      }
      Ok(Event::Text(ref t)) => {
        if let Some(name) = &current {
          let text = t.unescape().map_err(|e| Error::Xml(e.to_string()))?;
          out.insert(name.clone(), text.into_owned());
        }
      }
      Ok(Event::Eof) => break,
      Err(e) => return Err(Error::Xml(e.to_string())),
      _ => {}
    }
    buf.clear();
  }

  Ok(out)
}

/// N1MM frequencies are integers in units of 10 Hz.
fn freq_to_mhz(raw: &str) -> Result<f64> {
  raw
    .trim()
    .parse::<f64>()
    .ok()
    .filter(|f| f.is_finite())
    .map(|f| f / 100_000.0)
    .ok_or_else(|| Error::InvalidFrequency(raw.to_owned()))
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
  let raw = raw.trim();
  NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
    .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
    .map_err(|_| Error::InvalidTimestamp(raw.to_owned()))
}

/// Convert a `<contactinfo>` message into one raw ADIF record.
pub fn contact_to_record(xml: &str) -> Result<RawRecord> {
  let el = child_elements(xml)?;
  let text = |name: &str| el.get(name).map(|s| s.trim()).filter(|s| !s.is_empty());

  let app = text("app").unwrap_or_default();
  if app != "N1MM" {
    return Err(Error::NotN1mm(app.to_owned()));
  }

  let mut rec = RawRecord::new();

  let ts = parse_timestamp(text("timestamp").ok_or(Error::MissingElement("timestamp"))?)?;
  rec.insert("QSO_DATE", ts.format("%Y%m%d").to_string());
  rec.insert("TIME_ON", ts.format("%H%M%S").to_string());

  for &(element, tag) in IDENTITY {
    if let Some(v) = text(element) {
      rec.insert(tag, v);
    }
  }

  if let Some(tx) = text("txfreq") {
    rec.insert("FREQ", freq_to_mhz(tx)?.to_string());
    if let Some(rx) = text("rxfreq")
      && rx != tx
    {
      rec.insert("FREQ_RX", freq_to_mhz(rx)?.to_string());
    }
  }

  for &(element, tag) in DETAILS {
    if let Some(v) = text(element) {
      rec.insert(tag, v);
    }
  }

  Ok(rec)
}

/// Convert a `<contactinfo>` message into ADIF text holding one record.
pub fn contact_to_adif(xml: &str) -> Result<String> {
  contact_to_record(xml).map(|rec| export::raw_record(&rec))
}

#[cfg(test)]
mod tests {
  use super::*;

  const MESSAGE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<contactinfo>
  <app>N1MM</app>
  <contestname>DX</contestname>
  <timestamp>2023-06-30 18:00:30</timestamp>
  <mycall>F4JAW</mycall>
  <band>28</band>
  <rxfreq>2807535</rxfreq>
  <txfreq>2807535</txfreq>
  <operator>F4JAW</operator>
  <mode>FT8</mode>
  <call>EA5EB</call>
  <snt>-08</snt>
  <rcv>-11</rcv>
  <gridsquare>IM99</gridsquare>
  <comment>Balcony Outback 2000</comment>
  <qth></qth>
  <name></name>
  <power></power>
  <ID>cc186cb34185419db60f4388391bf508</ID>
</contactinfo>"#;

  #[test]
  fn converts_contact() {
    let rec = contact_to_record(MESSAGE).unwrap();
    assert_eq!(rec.get("QSO_DATE"), Some("20230630"));
    assert_eq!(rec.get("TIME_ON"), Some("180030"));
    assert_eq!(rec.get("OPERATOR"), Some("F4JAW"));
    assert_eq!(rec.get("CALL"), Some("EA5EB"));
    assert_eq!(rec.get("MODE"), Some("FT8"));
    assert_eq!(rec.get("FREQ"), Some("28.07535"));
    assert_eq!(rec.get("FREQ_RX"), None);
    assert_eq!(rec.get("RST_SENT"), Some("-08"));
    assert_eq!(rec.get("RST_RCVD"), Some("-11"));
    assert_eq!(rec.get("COMMENT"), Some("Balcony Outback 2000"));
    assert_eq!(rec.get("NAME"), None);
    assert_eq!(rec.get("TX_PWR"), None);
  }

  #[test]
  fn split_frequency_emits_freq_rx() {
    let msg = MESSAGE.replace("<rxfreq>2807535</rxfreq>", "<rxfreq>2807635</rxfreq>");
    let rec = contact_to_record(&msg).unwrap();
    assert_eq!(rec.get("FREQ_RX"), Some("28.07635"));
  }

  #[test]
  fn adif_text_is_one_record() {
    let adif = contact_to_adif(MESSAGE).unwrap();
    assert!(adif.contains("<QSO_DATE:8>20230630"));
    assert!(adif.contains("<TIME_ON:6>180030"));
    assert!(adif.contains("<FREQ:8>28.07535"));
    assert!(adif.ends_with("<EOR>\n"));
  }

  #[test]
  fn rejects_other_apps() {
    let msg = MESSAGE.replace("<app>N1MM</app>", "<app>WSJT-X</app>");
    assert!(matches!(contact_to_record(&msg), Err(Error::NotN1mm(app)) if app == "WSJT-X"));
  }

  #[test]
  fn bad_timestamp_is_an_error() {
    let msg = MESSAGE.replace("2023-06-30 18:00:30", "yesterday");
    assert!(matches!(contact_to_record(&msg), Err(Error::InvalidTimestamp(_))));
  }
}
