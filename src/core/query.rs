use crate::core::compare::{coerce_number, SortDirection};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// User-chosen search/filter/sort state of one list view.
///
/// `QueryParams::default()` is the state of a freshly mounted view: no
/// search, no filters, the view's default sort key, ascending.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryParams {
    pub search_text: String,
    pub exact_filters: BTreeMap<String, Value>,
    pub sort_key: Option<String>,
    pub sort_direction: SortDirection,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    /// 空字串代表下拉選單的「全部」，不視為篩選條件
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let field = field.into();
        let value = value.into();
        if matches!(&value, Value::String(s) if s.is_empty()) {
            self.exact_filters.remove(&field);
        } else {
            self.exact_filters.insert(field, value);
        }
        self
    }

    pub fn sort_by(mut self, key: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_key = Some(key.into());
        self.sort_direction = direction;
        self
    }

    /// Whether any search or filter is active (drives the "Showing X of Y" banner).
    pub fn is_filtering(&self) -> bool {
        !self.search_text.is_empty() || !self.exact_filters.is_empty()
    }

    /// Drops search and filters but keeps the sort selection.
    pub fn clear_filters(&mut self) {
        self.search_text.clear();
        self.exact_filters.clear();
    }
}

/// Exact-match rule for filters.
///
/// JSON values must be equal, except that a string and a number match when
/// the string parses to the same number.
pub fn values_match(actual: Option<&Value>, wanted: &Value) -> bool {
    let Some(actual) = actual else {
        return false;
    };
    if actual == wanted {
        return true;
    }
    match (actual, wanted) {
        (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
            match (coerce_number(Some(actual)), coerce_number(Some(wanted))) {
                (Some(a), Some(b)) => a == b && !is_blank(actual) && !is_blank(wanted),
                _ => false,
            }
        }
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => false,
    }
}

fn is_blank(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_filter_value_means_all() {
        let params = QueryParams::new()
            .filter("department_c", "Engineering")
            .filter("department_c", "");
        assert!(params.exact_filters.is_empty());
        assert!(!params.is_filtering());
    }

    #[test]
    fn test_clear_filters_keeps_sort() {
        let mut params = QueryParams::new()
            .search("smith")
            .filter("status_c", "active")
            .sort_by("salary_c", SortDirection::Descending);
        params.clear_filters();

        assert!(!params.is_filtering());
        assert_eq!(params.sort_key.as_deref(), Some("salary_c"));
        assert_eq!(params.sort_direction, SortDirection::Descending);
    }

    #[test]
    fn test_values_match_numeric_strings() {
        assert!(values_match(Some(&json!(10)), &json!("10")));
        assert!(values_match(Some(&json!("10")), &json!(10)));
        assert!(values_match(Some(&json!(10)), &json!(10.0)));
        assert!(!values_match(Some(&json!("")), &json!(0)));
        assert!(!values_match(Some(&json!("Engineering")), &json!("engineering")));
        assert!(!values_match(None, &json!("Engineering")));
    }

    #[test]
    fn test_params_deserialize_with_defaults() {
        let params: QueryParams =
            serde_json::from_value(json!({"search_text": "ada", "sort_direction": "desc"}))
                .unwrap();
        assert_eq!(params.search_text, "ada");
        assert_eq!(params.sort_direction, SortDirection::Descending);
        assert!(params.sort_key.is_none());
    }
}
