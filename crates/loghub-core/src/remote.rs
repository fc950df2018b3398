//! Remote-shadow entries mirrored from third-party logging services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A flat record as a provider returns it.
pub type RemoteRecord = serde_json::Map<String, Value>;

/// A stored remote entry, unique on `(provider, remote_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEntry {
  pub provider:   String,
  pub remote_id:  String,
  pub callsign:   String,
  pub frequency:  Option<f64>,
  pub mode:       String,
  pub timestamp:  Option<String>,
  pub updated_at: DateTime<Utc>,
}

/// The core fields of one fetched record, keyed by its provider identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteUpsert {
  pub remote_id: String,
  pub callsign:  String,
  pub frequency: Option<f64>,
  pub mode:      String,
  pub timestamp: Option<String>,
}

impl RemoteUpsert {
  /// Pull the core fields out of a flat provider record.
  ///
  /// `frequency` may arrive as a number or a numeric string; anything else
  /// is treated as absent.
  pub fn from_record(remote_id: String, record: &RemoteRecord) -> Self {
    let text = |key: &str| match record.get(key) {
      Some(Value::String(s)) => s.trim().to_owned(),
      Some(Value::Number(n)) => n.to_string(),
      _ => String::new(),
    };
    let frequency = match record.get("frequency") {
      Some(Value::Number(n)) => n.as_f64(),
      Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
      _ => None,
    }
    .filter(|f| f.is_finite());
    let timestamp = Some(text("timestamp")).filter(|t| !t.is_empty());

    Self {
      remote_id,
      callsign: text("callsign").to_uppercase(),
      frequency,
      mode: text("mode").to_uppercase(),
      timestamp,
    }
  }
}

/// Row counts from one upsert batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertOutcome {
  pub inserted:  u32,
  pub updated:   u32,
  pub unchanged: u32,
}
