//! Minimal JSON codec for the persisted store files.
//!
//! Encoding covers a small value model (strings, numbers, booleans, ordered
//! lists, ordered string-keyed maps) and produces compact JSON. Decoding only
//! understands a top-level array of flat objects and hands every value back as
//! a string; callers re-interpret `"true"`, `"42"` and friends themselves.
//!
//! The decoder is naive:
//! - objects are located by brace counting that ignores quoting
//! - pairs are split on `,` and `:` outside of a double-quote region, where the
//!   region flips on every `"` (escaped quotes included)
//! - no escape sequences are decoded
//!
//! [`decode_flat_list`] never fails and returns whatever balanced records it
//! found before a malformation. [`decode_flat_list_strict`] runs the same scan
//! but reports the first malformation as [`Error::MalformedJson`].

use std::collections::HashMap;
use std::fmt::Display;

use chrono::{DateTime, NaiveDate, Utc};

use crate::clock::{format_date, format_instant};
use crate::error::{Error, Result};

/// One decoded object: key to raw (unquoted) value text.
pub type FlatRecord = HashMap<String, String>;

/// Encodable value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<Value>),
    /// Insertion-ordered map.
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Fallback for anything outside the value model: stringify and quote.
    pub fn display<T: Display>(value: T) -> Self {
        Value::Str(value.to_string())
    }

    /// Build an ordered map from `(key, value)` pairs.
    ///
    /// A repeated key replaces the earlier value but keeps its position.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut map: Vec<(String, Value)> = Vec::new();
        for (key, value) in entries {
            let key = key.into();
            match map.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = value,
                None => map.push((key, value)),
            }
        }
        Value::Map(map)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Str(value.clone())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        match i64::try_from(value) {
            Ok(value) => Value::Int(value),
            Err(_) => Value::display(value),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Str(format_date(value))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Str(format_instant(value))
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

// =========================================================================
// Encoding
// =========================================================================

/// Encode a value as compact JSON text.
pub fn encode(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Str(text) => write_string(out, text),
        Value::Int(number) => out.push_str(&number.to_string()),
        Value::Float(number) if number.is_finite() => out.push_str(&number.to_string()),
        Value::Float(_) => out.push_str("null"),
        Value::Bool(flag) => out.push_str(if *flag { "true" } else { "false" }),
        Value::List(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Map(entries) => {
            out.push('{');
            for (idx, (key, item)) in entries.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, item);
            }
            out.push('}');
        }
    }
}

fn write_string(out: &mut String, text: &str) {
    out.push('"');
    out.push_str(&escape(text));
    out.push('"');
}

/// Escape backslash, double quote and LF. CR is dropped, not escaped.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

// =========================================================================
// Decoding
// =========================================================================

/// Decode a JSON array of flat objects, degrading silently on bad input.
///
/// Anything that is not an array yields an empty list. A truncated or
/// unbalanced object ends the scan; the records before it are returned.
pub fn decode_flat_list(input: &str) -> Vec<FlatRecord> {
    scan(input, false).unwrap_or_default()
}

/// Like [`decode_flat_list`], but reports the first malformation.
pub fn decode_flat_list_strict(input: &str) -> Result<Vec<FlatRecord>> {
    scan(input, true)
}

fn scan(input: &str, strict: bool) -> Result<Vec<FlatRecord>> {
    let doc = input.trim();
    let mut records = Vec::new();
    if !doc.starts_with('[') {
        if strict {
            return Err(Error::malformed(0, "expected '[' at start of document"));
        }
        return Ok(records);
    }

    let mut pos = 1;
    while pos < doc.len() {
        let Some(rel) = doc[pos..].find('{') else {
            break;
        };
        let open = pos + rel;
        let Some(close) = matching_brace(doc, open) else {
            if strict {
                return Err(Error::malformed(open, "object is never closed"));
            }
            break;
        };
        let body = doc[open + 1..close].trim();
        records.push(parse_object(body, open, strict)?);
        pos = close + 1;
    }

    if strict && !doc.ends_with(']') {
        return Err(Error::malformed(doc.len(), "expected ']' at end of document"));
    }
    Ok(records)
}

fn parse_object(body: &str, offset: usize, strict: bool) -> Result<FlatRecord> {
    let mut record = FlatRecord::new();
    for part in split_top_level(body, b',') {
        let pieces = split_top_level(part, b':');
        if pieces.len() < 2 {
            if strict && !part.trim().is_empty() {
                return Err(Error::malformed(
                    offset,
                    format!("expected key:value pair, found `{}`", part.trim()),
                ));
            }
            continue;
        }
        let key = trim_quotes(pieces[0]);
        let mut value = pieces[1].trim();
        if value.starts_with('"') {
            value = trim_quotes(value);
        }
        record.insert(key.to_string(), value.to_string());
    }
    Ok(record)
}

/// Index of the `}` that balances the `{` at `open`, counting braces only.
fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, byte) in text.bytes().enumerate().skip(open) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on `sep` outside of quotes. A trailing empty piece is not emitted.
fn split_top_level(text: &str, sep: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    for (idx, byte) in text.bytes().enumerate() {
        if byte == b'"' {
            in_quotes = !in_quotes;
        }
        if byte == sep && !in_quotes {
            parts.push(&text[start..idx]);
            start = idx + 1;
        }
    }
    if start < text.len() {
        parts.push(&text[start..]);
    }
    parts
}

fn trim_quotes(text: &str) -> &str {
    let text = text.trim();
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_drops_carriage_return() {
        assert_eq!(escape("a\r\nb"), "a\\nb");
        assert_eq!(escape(r#"back\slash "quoted""#), r#"back\\slash \"quoted\""#);
        assert_eq!(escape("tab\tstays"), "tab\tstays");
    }

    #[test]
    fn encode_keeps_map_insertion_order() {
        let value = Value::object([
            ("zeta", Value::from("last")),
            ("alpha", Value::from(1i64)),
            ("done", Value::from(true)),
        ]);
        assert_eq!(encode(&value), r#"{"zeta":"last","alpha":1,"done":true}"#);
    }

    #[test]
    fn object_repeated_key_replaces_in_place() {
        let value = Value::object([
            ("a", Value::from(1i64)),
            ("b", Value::from(2i64)),
            ("a", Value::from(3i64)),
        ]);
        assert_eq!(encode(&value), r#"{"a":3,"b":2}"#);
    }

    #[test]
    fn encode_lists_and_fallbacks() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).expect("date");
        let value = Value::List(vec![
            Value::from(date),
            Value::from(-4i64),
            Value::from(2.5f64),
            Value::from(f64::NAN),
            Value::List(vec![]),
            Value::object(Vec::<(String, Value)>::new()),
        ]);
        assert_eq!(encode(&value), r#"["2024-03-09",-4,2.5,null,[],{}]"#);
    }

    #[test]
    fn decode_returns_values_as_text() {
        let records =
            decode_flat_list(r#"[{"id":"a","completed":true,"count":42},{"id":"b"}]"#);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["id"], "a");
        assert_eq!(records[0]["completed"], "true");
        assert_eq!(records[0]["count"], "42");
        assert_eq!(records[1]["id"], "b");
    }

    #[test]
    fn decode_respects_quoted_separators() {
        let records = decode_flat_list(
            r#"[ { "title" : "Buy milk, eggs", "start": "2024-01-01T10:00:00Z" } ]"#,
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["title"], "Buy milk, eggs");
        assert_eq!(records[0]["start"], "2024-01-01T10:00:00Z");
    }

    #[test]
    fn decode_non_array_is_empty() {
        assert!(decode_flat_list(r#"{"id":"a"}"#).is_empty());
        assert!(decode_flat_list("").is_empty());
        assert!(decode_flat_list("garbage").is_empty());
    }

    #[test]
    fn decode_stops_at_unclosed_object() {
        let records = decode_flat_list(r#"[{"id":"a"},{"id":"b"},{"id":"c""#);
        let ids: Vec<&str> = records.iter().map(|r| r["id"].as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn decode_skips_parts_without_colon() {
        let records = decode_flat_list(r#"[{"id":"a", junk, "tags":""}]"#);
        assert_eq!(records[0].len(), 2);
        assert_eq!(records[0]["tags"], "");
    }

    #[test]
    fn decode_lone_quote_value_does_not_panic() {
        let records = decode_flat_list(r#"[{"id":"}]"#);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn strict_reports_missing_bracket() {
        let err = decode_flat_list_strict(r#"{"id":"a"}"#).expect_err("not an array");
        assert!(matches!(err, Error::MalformedJson { offset: 0, .. }));
    }

    #[test]
    fn strict_reports_unclosed_object() {
        let err = decode_flat_list_strict(r#"[{"id":"a"},{"id":"b""#).expect_err("unclosed");
        assert!(matches!(err, Error::MalformedJson { offset: 12, .. }));
    }

    #[test]
    fn strict_reports_bare_part() {
        let err = decode_flat_list_strict(r#"[{"id":"a",oops}]"#).expect_err("bare part");
        assert!(err.to_string().contains("oops"));
    }

    #[test]
    fn strict_accepts_well_formed() {
        let records = decode_flat_list_strict("[]").expect("empty array");
        assert!(records.is_empty());
        let records =
            decode_flat_list_strict(r#"[{"id":"a","n":1}]"#).expect("one record");
        assert_eq!(records[0]["n"], "1");
    }
}
