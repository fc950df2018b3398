//! The QSO record: the fixed core schema plus its open-ended extras bag.
//!
//! The core schema is declared once, in [`core_schema!`], as a table of
//! `ADIF TAG => field : caster` rows. The macro expands that table into the
//! [`Qso`] struct, the [`CORE_TAGS`] lookup table and the tag-addressed
//! accessors used by the classifier and the ADIF exporter, so the three can
//! never drift apart.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

// ─── Casters ─────────────────────────────────────────────────────────────────

/// How the raw ADIF text of a core tag becomes its typed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caster {
  Text,
  Date,
  Time,
  Decimal,
  Integer,
}

/// A successfully cast core value.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreValue {
  Text(String),
  Date(NaiveDate),
  Time(NaiveTime),
  Decimal(f64),
  Integer(i64),
}

/// One row of the core-tag table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreTag {
  /// Uppercase ADIF tag name.
  pub tag:    &'static str,
  /// Name of the [`Qso`] field the tag is stored in.
  pub field:  &'static str,
  pub caster: Caster,
}

impl CoreTag {
  /// Find the core-table row for an (uppercase) ADIF tag.
  pub fn lookup(tag: &str) -> Option<&'static CoreTag> {
    CORE_TAGS.iter().find(|c| c.tag == tag)
  }

  pub fn is_core(tag: &str) -> bool { Self::lookup(tag).is_some() }
}

// ─── Schema ──────────────────────────────────────────────────────────────────

macro_rules! core_schema {
  (@type Text) => { String };
  (@type Date) => { Option<NaiveDate> };
  (@type Time) => { Option<NaiveTime> };
  (@type Decimal) => { Option<f64> };
  (@type Integer) => { Option<i64> };

  (@set $slot:expr, Text, $value:ident) => {
    if let CoreValue::Text(v) = $value { $slot = v; true } else { false }
  };
  (@set $slot:expr, Date, $value:ident) => {
    if let CoreValue::Date(v) = $value { $slot = Some(v); true } else { false }
  };
  (@set $slot:expr, Time, $value:ident) => {
    if let CoreValue::Time(v) = $value { $slot = Some(v); true } else { false }
  };
  (@set $slot:expr, Decimal, $value:ident) => {
    if let CoreValue::Decimal(v) = $value { $slot = Some(v); true } else { false }
  };
  (@set $slot:expr, Integer, $value:ident) => {
    if let CoreValue::Integer(v) = $value { $slot = Some(v); true } else { false }
  };

  (@get $slot:expr, Text) => {
    (!$slot.is_empty()).then(|| $slot.clone())
  };
  (@get $slot:expr, Date) => {
    $slot.map(|d| d.format("%Y%m%d").to_string())
  };
  (@get $slot:expr, Time) => {
    $slot.map(|t| t.format("%H%M%S").to_string())
  };
  (@get $slot:expr, Decimal) => {
    $slot.map(|f| f.to_string())
  };
  (@get $slot:expr, Integer) => {
    $slot.map(|n| n.to_string())
  };

  ($( $tag:literal => $field:ident : $caster:ident ),* $(,)?) => {
    /// A contact record in the fixed core schema.
    ///
    /// Text fields use the empty string for "absent"; typed fields use
    /// `None`. Frequencies are MHz, power is watts.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct Qso {
      $( pub $field: core_schema!(@type $caster), )*
    }

    /// The core-tag table, in canonical export order.
    pub const CORE_TAGS: &[CoreTag] = &[
      $( CoreTag { tag: $tag, field: stringify!($field), caster: Caster::$caster }, )*
    ];

    impl Qso {
      /// Store a cast value under its ADIF tag. Returns `false` if the tag is
      /// not a core tag or the value has the wrong shape for it.
      pub fn set(&mut self, tag: &str, value: CoreValue) -> bool {
        match tag {
          $( $tag => core_schema!(@set self.$field, $caster, value), )*
          _ => false,
        }
      }

      /// The canonical ADIF text of a populated core field.
      pub fn get(&self, tag: &str) -> Option<String> {
        match tag {
          $( $tag => core_schema!(@get self.$field, $caster), )*
          _ => None,
        }
      }
    }
  };
}

core_schema! {
  "CALL"             => callsign:           Text,
  "QSO_DATE"         => qso_date:           Date,
  "TIME_ON"          => time_on:            Time,
  "QSO_DATE_OFF"     => qso_date_off:       Date,
  "TIME_OFF"         => time_off:           Time,
  "BAND"             => band:               Text,
  "FREQ"             => freq:               Decimal,
  "BAND_RX"          => band_rx:            Text,
  "FREQ_RX"          => freq_rx:            Decimal,
  "MODE"             => mode:               Text,
  "SUBMODE"          => submode:            Text,
  "PROP_MODE"        => prop_mode:          Text,
  "SAT_NAME"         => sat_name:           Text,
  "STATION_CALLSIGN" => station_callsign:   Text,
  "OPERATOR"         => operator:           Text,
  "RST_RCVD"         => rst_rcvd:           Text,
  "RST_SENT"         => rst_sent:           Text,
  "SRX"              => srx:                Integer,
  "SRX_STRING"       => srx_string:         Text,
  "STX"              => stx:                Integer,
  "STX_STRING"       => stx_string:         Text,
  "GRIDSQUARE"       => gridsquare:         Text,
  "SIG"              => sig:                Text,
  "SIG_INFO"         => sig_info:           Text,
  "MY_SIG"           => my_sig:             Text,
  "MY_SIG_INFO"      => my_sig_info:        Text,
  "SOTA_REF"         => sota_ref:           Text,
  "MY_SOTA_REF"      => my_sota_ref:        Text,
  "NAME"             => name:               Text,
  "TX_PWR"           => tx_pwr:             Decimal,
  "COUNTRY"          => country:            Text,
  "DXCC"             => dxcc:               Integer,
  "IOTA"             => iota:               Text,
  "CQZ"              => cq_zone:            Integer,
  "ITUZ"             => itu_zone:           Integer,
  "MY_DXCC"          => my_dxcc:            Integer,
  "MY_STATE"         => my_state:           Text,
  "MY_CNTY"          => my_cnty:            Text,
  "MY_GRIDSQUARE"    => my_gridsquare:      Text,
  "MY_VUCC_GRIDS"    => my_vucc_grids:      Text,
  "MY_CQ_ZONE"       => my_cq_zone:         Integer,
  "MY_ITU_ZONE"      => my_itu_zone:        Integer,
  "MY_NAME"          => my_name:            Text,
  "LOTW_QSL_RCVD"    => lotw_qsl_rcvd:      Text,
  "LOTW_QSLRDATE"    => lotw_qsl_rcvd_date: Date,
  "LOTW_QSL_SENT"    => lotw_qsl_sent:      Text,
  "LOTW_QSLSDATE"    => lotw_qsl_sent_date: Date,
  "NOTES"            => notes:              Text,
}

impl Qso {
  /// Every populated core field as `(TAG, canonical text)`, in table order.
  pub fn adif_fields(&self) -> Vec<(&'static str, String)> {
    CORE_TAGS
      .iter()
      .filter_map(|c| self.get(c.tag).map(|v| (c.tag, v)))
      .collect()
  }

  pub fn is_populated(&self, tag: &str) -> bool { self.get(tag).is_some() }
}

// ─── Extras ──────────────────────────────────────────────────────────────────

/// Tag → normalized value pairs that have no core column.
///
/// Keys are uppercase ADIF tag names. Persisted in a one-to-one side table,
/// never inlined into the core schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extras(BTreeMap<String, String>);

impl Extras {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&mut self, tag: impl Into<String>, value: impl Into<String>) {
    self.0.insert(tag.into().to_ascii_uppercase(), value.into());
  }

  pub fn get(&self, tag: &str) -> Option<&str> {
    self.0.get(&tag.to_ascii_uppercase()).map(String::as_str)
  }

  pub fn remove(&mut self, tag: &str) -> Option<String> {
    self.0.remove(&tag.to_ascii_uppercase())
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl FromIterator<(String, String)> for Extras {
  fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
    let mut extras = Self::new();
    for (k, v) in iter {
      extras.insert(k, v);
    }
    extras
  }
}

// ─── Raw records ─────────────────────────────────────────────────────────────

/// One ADIF record as tokenized: uppercase tag → raw value, in first-seen
/// order. A repeated tag keeps its position and takes the later value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
  fields: Vec<(String, String)>,
}

impl RawRecord {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&mut self, tag: impl Into<String>, value: impl Into<String>) {
    let tag = tag.into().to_ascii_uppercase();
    let value = value.into();
    match self.fields.iter_mut().find(|(t, _)| *t == tag) {
      Some(slot) => slot.1 = value,
      None => self.fields.push((tag, value)),
    }
  }

  pub fn get(&self, tag: &str) -> Option<&str> {
    self
      .fields
      .iter()
      .find(|(t, _)| t.eq_ignore_ascii_case(tag))
      .map(|(_, v)| v.as_str())
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.fields.iter().map(|(t, v)| (t.as_str(), v.as_str()))
  }

  pub fn len(&self) -> usize { self.fields.len() }

  pub fn is_empty(&self) -> bool { self.fields.is_empty() }
}
