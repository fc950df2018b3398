//! The ADIF tag catalog: known tag names and how their values normalize.
//!
//! A [`TagCatalog`] is built once at start-up from a built-in seed plus an
//! optional JSON override file and then shared read-only. Lookups and
//! normalization are pure.
//!
//! Override file format:
//!
//! ```json
//! {
//!   "POTA_REF":  { "type": "str", "max": 16, "label": "POTA Ref" },
//!   "QSL_RCVD":  { "type": "enum", "enum": ["Y", "N", "R", "I", "V"] },
//!   "K_INDEX":   { "type": "int" }
//! }
//! ```

use std::{collections::HashMap, path::Path};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::Result;

// ─── Tag metadata ────────────────────────────────────────────────────────────

/// The semantic type of an ADIF tag's value.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TagType {
  #[default]
  Str,
  Int,
  Float,
  Date,
  Time,
  Enum,
}

/// Catalog entry for one tag. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagMeta {
  /// Uppercase tag name.
  pub name:     String,
  pub tag_type: TagType,
  pub max:      Option<usize>,
  /// Allowed values for [`TagType::Enum`], uppercase.
  pub allowed:  Option<Vec<String>>,
  pub label:    Option<String>,
}

impl TagMeta {
  fn new(name: &str, tag_type: TagType) -> Self {
    Self {
      name: name.to_owned(),
      tag_type,
      max: None,
      allowed: None,
      label: None,
    }
  }

  fn max(mut self, max: usize) -> Self {
    self.max = Some(max);
    self
  }

  fn label(mut self, label: &str) -> Self {
    self.label = Some(label.to_owned());
    self
  }

  fn allowed(mut self, values: &[&str]) -> Self {
    self.allowed = Some(values.iter().map(|v| v.to_string()).collect());
    self
  }
}

/// One entry of the JSON override file.
#[derive(Deserialize)]
struct OverrideEntry {
  #[serde(rename = "type", default)]
  tag_type: TagType,
  #[serde(default)]
  max:      Option<usize>,
  #[serde(rename = "enum", default)]
  allowed:  Option<Vec<String>>,
  #[serde(default)]
  label:    Option<String>,
}

/// A review-time remark about an extras value. Never blocks a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogWarning {
  NotInEnum { tag: String, value: String },
  TooLong { tag: String, max: usize, len: usize },
  Uncoerced { tag: String, expected: TagType, value: String },
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TagCatalog {
  tags: HashMap<String, TagMeta>,
}

impl Default for TagCatalog {
  fn default() -> Self { Self::seed() }
}

impl TagCatalog {
  /// The built-in seed: enough for the common program and QSL tags.
  pub fn seed() -> Self {
    use TagType::*;
    const QSL: &[&str] = &["Y", "N", "R", "I", "V"];

    let entries = [
      TagMeta::new("IOTA", Str).max(10).label("IOTA"),
      TagMeta::new("SOTA_REF", Str).max(16).label("SOTA Ref"),
      TagMeta::new("MY_SOTA_REF", Str).max(16).label("My SOTA Ref"),
      TagMeta::new("POTA_REF", Str).max(16).label("POTA Ref"),
      TagMeta::new("MY_POTA_REF", Str).max(16).label("My POTA Ref"),
      TagMeta::new("SIG", Str).max(16).label("SIG"),
      TagMeta::new("SIG_INFO", Str).max(32).label("SIG Info"),
      TagMeta::new("MY_SIG", Str).max(16).label("My SIG"),
      TagMeta::new("MY_SIG_INFO", Str).max(32).label("My SIG Info"),
      TagMeta::new("WWFF", Str).max(16).label("WWFF"),
      TagMeta::new("MY_WWFF", Str).max(16).label("My WWFF"),
      TagMeta::new("V2_PREFIX", Str).max(32).label("V2 Prefix"),
      TagMeta::new("VUCC_GRIDS", Str).max(64).label("VUCC Grids"),
      TagMeta::new("MY_VUCC_GRIDS", Str).max(64).label("My VUCC Grids"),
      TagMeta::new("STATE", Str).max(16).label("State"),
      TagMeta::new("CNTY", Str).max(32).label("County"),
      TagMeta::new("PROP_MODE", Str).max(16).label("Prop Mode"),
      TagMeta::new("SAT_MODE", Str).max(16).label("Sat Mode"),
      TagMeta::new("SAT_NAME", Str).max(32).label("Satellite"),
      TagMeta::new("TEN_TEN", Int).label("10-10"),
      TagMeta::new("AGE", Int).label("Age"),
      TagMeta::new("K_INDEX", Int).label("K Index"),
      TagMeta::new("A_INDEX", Int).label("A Index"),
      TagMeta::new("SFI", Int).label("Solar Flux"),
      TagMeta::new("RX_PWR", Float).label("RX Power"),
      TagMeta::new("DISTANCE", Float).label("Distance"),
      TagMeta::new("QSLRDATE", Date).label("QSL Rcvd Date"),
      TagMeta::new("QSLSDATE", Date).label("QSL Sent Date"),
      TagMeta::new("EQSL_QSLRDATE", Date).label("eQSL Rcvd Date"),
      TagMeta::new("EQSL_QSLSDATE", Date).label("eQSL Sent Date"),
      TagMeta::new("QSL_RCVD", Enum).allowed(QSL).label("QSL Rcvd"),
      TagMeta::new("QSL_SENT", Enum).allowed(QSL).label("QSL Sent"),
      TagMeta::new("EQSL_QSL_RCVD", Enum).allowed(QSL).label("eQSL Rcvd"),
      TagMeta::new("EQSL_QSL_SENT", Enum).allowed(QSL).label("eQSL Sent"),
      TagMeta::new("ANT_PATH", Enum).allowed(&["G", "O", "S", "L"]).label("Antenna Path"),
      TagMeta::new("CONT", Enum)
        .allowed(&["NA", "SA", "EU", "AF", "OC", "AS", "AN"])
        .label("Continent"),
      TagMeta::new("QSO_COMPLETE", Enum)
        .allowed(&["Y", "N", "NIL", "?"])
        .label("QSO Complete"),
    ];

    Self {
      tags: entries.into_iter().map(|m| (m.name.clone(), m)).collect(),
    }
  }

  /// Apply a JSON override document on top of this catalog. Entries replace
  /// existing ones by tag name.
  pub fn with_overrides_json(mut self, json: &str) -> Result<Self> {
    let raw: HashMap<String, OverrideEntry> = serde_json::from_str(json)?;
    for (name, entry) in raw {
      let name = name.to_ascii_uppercase();
      let meta = TagMeta {
        name:     name.clone(),
        tag_type: entry.tag_type,
        max:      entry.max,
        allowed:  entry
          .allowed
          .map(|vs| vs.into_iter().map(|v| v.to_uppercase()).collect()),
        label:    entry.label,
      };
      self.tags.insert(name, meta);
    }
    Ok(self)
  }

  /// Build the process catalog: the seed, overlaid with `path` if given.
  ///
  /// A missing file is not an error. An unreadable or malformed file is
  /// logged and the seed alone is used.
  pub fn load(path: Option<&Path>) -> Self {
    let seed = Self::seed();
    let Some(path) = path else {
      return seed;
    };
    if !path.exists() {
      debug!(path = %path.display(), "no tag catalog override file");
      return seed;
    }

    let loaded = std::fs::read_to_string(path)
      .map_err(crate::Error::from)
      .and_then(|raw| seed.clone().with_overrides_json(&raw));

    match loaded {
      Ok(catalog) => {
        info!(path = %path.display(), tags = catalog.len(), "loaded tag catalog");
        catalog
      }
      Err(e) => {
        warn!(
          path = %path.display(),
          error = %e,
          "failed to load tag catalog overrides; using built-in seed"
        );
        seed
      }
    }
  }

  pub fn len(&self) -> usize { self.tags.len() }

  pub fn is_empty(&self) -> bool { self.tags.is_empty() }

  /// Metadata for `tag`, if the catalog knows it.
  pub fn classify_type(&self, tag: &str) -> Option<&TagMeta> {
    self.tags.get(&tag.to_ascii_uppercase())
  }

  /// Canonicalize `raw` according to the tag's type.
  ///
  /// Never fails: a value that does not coerce comes back trimmed but
  /// otherwise untouched, so it can be corrected by a human later.
  pub fn normalize(&self, tag: &str, raw: &str) -> String {
    let trimmed = raw.trim();
    match self.classify_type(tag) {
      Some(meta) if !trimmed.is_empty() => {
        coerce(meta, trimmed).unwrap_or_else(|| trimmed.to_owned())
      }
      _ => trimmed.to_owned(),
    }
  }

  /// Review remarks for an already-normalized extras value.
  pub fn check(&self, tag: &str, value: &str) -> Option<CatalogWarning> {
    let meta = self.classify_type(tag)?;
    if value.is_empty() {
      return None;
    }
    if let Some(max) = meta.max
      && value.chars().count() > max
    {
      return Some(CatalogWarning::TooLong {
        tag: meta.name.clone(),
        max,
        len: value.chars().count(),
      });
    }
    if coerce(meta, value).as_deref() == Some(value) {
      return None;
    }
    Some(match meta.tag_type {
      TagType::Enum => CatalogWarning::NotInEnum {
        tag:   meta.name.clone(),
        value: value.to_owned(),
      },
      expected => CatalogWarning::Uncoerced {
        tag: meta.name.clone(),
        expected,
        value: value.to_owned(),
      },
    })
  }

  /// Sorted tag names, for tag autocompletion.
  pub fn suggestions(&self, limit: usize) -> Vec<&str> {
    let mut names: Vec<&str> = self.tags.keys().map(String::as_str).collect();
    names.sort_unstable();
    names.truncate(limit);
    names
  }
}

fn coerce(meta: &TagMeta, s: &str) -> Option<String> {
  match meta.tag_type {
    TagType::Str => Some(s.to_owned()),
    TagType::Date => parse_adif_date(s).map(|d| d.format("%Y%m%d").to_string()),
    TagType::Time => {
      parse_adif_time(s).map(|t| t.format("%H%M%S").to_string())
    }
    TagType::Int => s.parse::<i64>().ok().map(|n| n.to_string()),
    TagType::Float => parse_decimal(s).map(|f| f.to_string()),
    TagType::Enum => {
      let up = s.to_uppercase();
      match &meta.allowed {
        Some(allowed) if allowed.contains(&up) => Some(up),
        _ => None,
      }
    }
  }
}

// ─── Shared value parsers ────────────────────────────────────────────────────

/// Parse an ADIF date: `YYYYMMDD` or `YYYY-MM-DD`.
pub fn parse_adif_date(s: &str) -> Option<NaiveDate> {
  let s = s.trim();
  let compact = if s.len() == 10 && s.as_bytes()[4] == b'-' {
    s.replace('-', "")
  } else {
    s.to_owned()
  };
  if compact.len() != 8 || !compact.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  NaiveDate::parse_from_str(&compact, "%Y%m%d").ok()
}

/// Parse an ADIF time: `HHMM` or `HHMMSS`.
pub fn parse_adif_time(s: &str) -> Option<NaiveTime> {
  let s = s.trim();
  if !s.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  match s.len() {
    4 => NaiveTime::parse_from_str(&format!("{s}00"), "%H%M%S").ok(),
    6 => NaiveTime::parse_from_str(s, "%H%M%S").ok(),
    _ => None,
  }
}

/// Parse a finite decimal number.
pub fn parse_decimal(s: &str) -> Option<f64> {
  s.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  fn catalog() -> TagCatalog {
    TagCatalog::seed()
      .with_overrides_json(
        r#"{
          "QSO_DATE": { "type": "date" },
          "TIME_ON":  { "type": "time" },
          "FREQ":     { "type": "float" },
          "srx":      { "type": "int" },
          "MODE":     { "type": "enum", "enum": ["ssb", "CW", "FT8"] }
        }"#,
      )
      .unwrap()
  }

  #[test]
  fn dates_canonicalize_to_compact_form() {
    let c = catalog();
    assert_eq!(c.normalize("QSO_DATE", "2024-01-01"), "20240101");
    assert_eq!(c.normalize("QSO_DATE", "20240101"), "20240101");
    assert_eq!(c.normalize("qso_date", " 2024-01-01 "), "20240101");
  }

  #[test]
  fn times_pad_seconds() {
    let c = catalog();
    assert_eq!(c.normalize("TIME_ON", "1234"), "123400");
    assert_eq!(c.normalize("TIME_ON", "123456"), "123456");
  }

  #[test]
  fn numbers_are_reformatted() {
    let c = catalog();
    assert_eq!(c.normalize("SRX", "007"), "7");
    assert_eq!(c.normalize("FREQ", "14.0740"), "14.074");
  }

  #[test]
  fn coercion_failure_keeps_trimmed_original() {
    let c = catalog();
    assert_eq!(c.normalize("QSO_DATE", " 2024-13-45 "), "2024-13-45");
    assert_eq!(c.normalize("TIME_ON", "12:34"), "12:34");
    assert_eq!(c.normalize("SRX", "five"), "five");
    assert_eq!(c.normalize("FREQ", "fourteen"), "fourteen");
  }

  #[test]
  fn enums_uppercase_when_allowed_and_pass_through_otherwise() {
    let c = catalog();
    assert_eq!(c.normalize("MODE", "ssb"), "SSB");
    assert_eq!(c.normalize("MODE", "ft8"), "FT8");
    assert_eq!(c.normalize("MODE", "olivia"), "olivia");
    assert_eq!(c.normalize("QSL_RCVD", "y"), "Y");
  }

  #[test]
  fn unknown_tags_are_trimmed_verbatim() {
    let c = catalog();
    assert!(c.classify_type("APP_FOO_BAR").is_none());
    assert_eq!(c.normalize("APP_FOO_BAR", "  MiXeD  "), "MiXeD");
  }

  #[test]
  fn overrides_replace_seed_entries() {
    let c = TagCatalog::seed()
      .with_overrides_json(r#"{ "IOTA": { "type": "str", "max": 6 } }"#)
      .unwrap();
    let meta = c.classify_type("IOTA").unwrap();
    assert_eq!(meta.max, Some(6));
    assert_eq!(meta.label, None);
  }

  #[test]
  fn load_falls_back_to_seed_on_malformed_file() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(b"{ not json").unwrap();
    let c = TagCatalog::load(Some(f.path()));
    assert_eq!(c.len(), TagCatalog::seed().len());
  }

  #[test]
  fn load_reads_override_file() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(br#"{ "MY_ANTENNA": { "type": "str", "max": 64 } }"#)
      .unwrap();
    let c = TagCatalog::load(Some(f.path()));
    assert!(c.classify_type("MY_ANTENNA").is_some());
    assert_eq!(c.len(), TagCatalog::seed().len() + 1);
  }

  #[test]
  fn load_without_file_is_seed() {
    let c = TagCatalog::load(Some(Path::new("/nonexistent/catalog.json")));
    assert_eq!(c.len(), TagCatalog::seed().len());
  }

  #[test]
  fn check_flags_enum_length_and_type_problems() {
    let c = catalog();
    assert_eq!(c.check("QSL_RCVD", "Y"), None);
    assert!(matches!(
      c.check("QSL_RCVD", "maybe"),
      Some(CatalogWarning::NotInEnum { .. })
    ));
    assert!(matches!(
      c.check("IOTA", "EU-005-TOOLONG"),
      Some(CatalogWarning::TooLong { max: 10, .. })
    ));
    assert!(matches!(
      c.check("AGE", "old"),
      Some(CatalogWarning::Uncoerced { expected: TagType::Int, .. })
    ));
    assert_eq!(c.check("APP_X", "anything"), None);
  }

  #[test]
  fn suggestions_are_sorted_and_limited() {
    let c = TagCatalog::seed();
    let s = c.suggestions(3);
    assert_eq!(s.len(), 3);
    assert!(s.windows(2).all(|w| w[0] <= w[1]));
  }
}
