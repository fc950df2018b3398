//! ADIF tokenizer.
//!
//! Pipeline:
//!   raw &str
//!     └─ skip_header()      → body after the first `<EOH>`
//!          └─ next_header() → `<TAG:LEN[:T]>` / `<EOR>`
//!               └─ take LEN chars as the value → RawRecord

use loghub_core::qso::RawRecord;
use tracing::debug;

const EOH: &str = "<EOH>";
const EOR: &str = "<EOR>";

/// Byte offset of the first ASCII case-insensitive occurrence of `marker`.
pub(crate) fn find_marker(haystack: &str, marker: &str) -> Option<usize> {
  let (h, m) = (haystack.as_bytes(), marker.as_bytes());
  if m.len() > h.len() {
    return None;
  }
  h.windows(m.len()).position(|w| w.eq_ignore_ascii_case(m))
}

/// Everything after the first `<EOH>`, or the whole text if there is none.
fn skip_header(text: &str) -> &str {
  match find_marker(text, EOH) {
    Some(pos) => &text[pos + EOH.len()..],
    None => text,
  }
}

enum Header<'a> {
  Field { name: &'a str, len: usize },
  EndOfRecord,
  Malformed,
}

/// Parse the inside of `<...>`. The optional type code after a second `:` is
/// ignored.
fn classify_header(inner: &str) -> Header<'_> {
  let mut parts = inner.splitn(3, ':');
  let name = parts.next().unwrap_or_default().trim();
  let len = parts.next();

  if len.is_none() && name.eq_ignore_ascii_case("EOR") {
    return Header::EndOfRecord;
  }
  let valid_name = !name.is_empty()
    && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
  match len.and_then(|l| l.trim().parse::<usize>().ok()) {
    Some(len) if valid_name => Header::Field { name, len },
    _ => Header::Malformed,
  }
}

/// Split off the first `len` characters of `s`, or all of it if shorter.
fn take_chars(s: &str, len: usize) -> (&str, &str) {
  let end = s.char_indices().nth(len).map_or(s.len(), |(i, _)| i);
  s.split_at(end)
}

pub(crate) fn tokenize(text: &str) -> Vec<RawRecord> {
  let mut records = Vec::new();
  let mut current = RawRecord::new();
  let mut rest = skip_header(text);

  let mut flush = |current: &mut RawRecord| {
    if !current.is_empty() {
      records.push(std::mem::take(current));
    }
  };

  while let Some(open) = rest.find('<') {
    let after = &rest[open + 1..];
    let Some(close) = after.find('>') else {
      debug!("unterminated tag header; dropping the rest of the record");
      break;
    };
    let inner = &after[..close];
    rest = &after[close + 1..];

    match classify_header(inner) {
      Header::EndOfRecord => flush(&mut current),
      Header::Field { name, len } => {
        let (value, tail) = take_chars(rest, len);
        current.insert(name, value);
        rest = tail;
      }
      // Between records there is nothing to truncate; resume just after `<`.
      Header::Malformed if current.is_empty() => {
        debug!(header = inner, "malformed tag header between records; ignored");
        rest = after;
      }
      Header::Malformed => {
        debug!(header = inner, "malformed tag header; skipping to next <EOR>");
        flush(&mut current);
        match find_marker(rest, EOR) {
          Some(pos) => rest = &rest[pos + EOR.len()..],
          None => rest = "",
        }
      }
    }
  }
  flush(&mut current);

  records
}
