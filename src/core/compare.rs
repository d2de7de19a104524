//! Field comparators used by the list-view sort stage.
//!
//! Every sort key resolves to a [`ComparatorKind`] when the view is
//! configured. Values are coerced into a [`SortValue`] once per record before
//! sorting, so malformed values fall back to a neutral key instead of failing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Ordering rule applied to a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparatorKind {
    /// Case-insensitive string order; missing values compare as "".
    #[default]
    Lexicographic,
    /// Numeric order; missing or non-numeric values compare as 0.
    Numeric,
    /// Instant order; missing or unparseable values are the earliest instant.
    Chronological,
}

impl std::fmt::Display for ComparatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ComparatorKind::Lexicographic => "lexicographic",
            ComparatorKind::Numeric => "numeric",
            ComparatorKind::Chronological => "chronological",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

impl SortDirection {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Pre-computed sort key for one record.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Text(String),
    Number(f64),
    Instant(Option<DateTime<Utc>>),
}

impl SortValue {
    pub fn from_value(kind: ComparatorKind, value: Option<&Value>) -> Self {
        match kind {
            ComparatorKind::Lexicographic => SortValue::Text(fold_text(value)),
            ComparatorKind::Numeric => SortValue::Number(coerce_number(value).unwrap_or(0.0)),
            ComparatorKind::Chronological => SortValue::Instant(parse_instant(value)),
        }
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            // None < Some，缺值排最早
            (SortValue::Instant(a), SortValue::Instant(b)) => a.cmp(b),
            // 同一個排序鍵只會產生同一種值
            _ => Ordering::Equal,
        }
    }
}

/// Case-folded display text of a value; null and missing become "".
pub fn fold_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.to_lowercase(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string().to_lowercase(),
    }
}

/// Numeric reading of a value. `None` for values that are not numbers.
///
/// Numeric strings are trimmed first and an empty string reads as 0, booleans
/// read as 1/0.
pub fn coerce_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Parses a date or timestamp value into an instant.
///
/// Accepts RFC 3339, `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS` and integer epoch milliseconds.
pub fn parse_instant(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::String(s) => parse_instant_str(s.trim()),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

fn parse_instant_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
