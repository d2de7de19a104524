//! Generic search + filter + sort pipeline shared by every list page.
//!
//! A [`ListViewConfig`] is built once per entity. [`ListViewPipeline::apply`]
//! is then a pure function of the record snapshot and the current
//! [`QueryParams`]: it never mutates its input and always returns a new
//! ordered sequence.

use crate::core::compare::{fold_text, ComparatorKind, SortDirection, SortValue};
use crate::core::query::{values_match, QueryParams};
use crate::domain::model::Record;
use crate::utils::error::{Result, RosterError};
use crate::utils::validation::validate_field_names;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Computes a derived sort value (e.g. a full name) from a record.
pub type DerivedKeyFn = Arc<dyn Fn(&Record) -> Value + Send + Sync>;

#[derive(Clone)]
pub struct ListViewConfig {
    searchable_fields: Vec<String>,
    sort_specs: HashMap<String, ComparatorKind>,
    derived_keys: HashMap<String, DerivedKeyFn>,
    default_sort: String,
}

impl std::fmt::Debug for ListViewConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut derived: Vec<&String> = self.derived_keys.keys().collect();
        derived.sort();
        f.debug_struct("ListViewConfig")
            .field("searchable_fields", &self.searchable_fields)
            .field("sort_specs", &self.sort_specs)
            .field("derived_keys", &derived)
            .field("default_sort", &self.default_sort)
            .finish()
    }
}

impl ListViewConfig {
    pub fn builder() -> ListViewConfigBuilder {
        ListViewConfigBuilder::default()
    }

    pub fn searchable_fields(&self) -> &[String] {
        &self.searchable_fields
    }

    pub fn default_sort(&self) -> &str {
        &self.default_sort
    }

    /// All accepted sort keys, sorted by name.
    pub fn sort_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .sort_specs
            .keys()
            .chain(self.derived_keys.keys())
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    pub fn comparator_for(&self, key: &str) -> Option<ComparatorKind> {
        self.resolve(key).ok().map(|sort| sort.kind)
    }

    fn resolve<'a>(&'a self, key: &'a str) -> Result<ResolvedSort<'a>> {
        if let Some(derive) = self.derived_keys.get(key) {
            return Ok(ResolvedSort {
                field: key,
                kind: self.sort_specs.get(key).copied().unwrap_or_default(),
                derive: Some(derive),
            });
        }
        match self.sort_specs.get(key) {
            Some(kind) => Ok(ResolvedSort {
                field: key,
                kind: *kind,
                derive: None,
            }),
            None => Err(RosterError::UnknownSortKey {
                key: key.to_string(),
                available: self.sort_keys().join(", "),
            }),
        }
    }
}

struct ResolvedSort<'a> {
    field: &'a str,
    kind: ComparatorKind,
    derive: Option<&'a DerivedKeyFn>,
}

impl ResolvedSort<'_> {
    fn key_for(&self, record: &Record) -> SortValue {
        match self.derive {
            Some(derive) => SortValue::from_value(self.kind, Some(&derive(record))),
            None => SortValue::from_value(self.kind, record.get(self.field)),
        }
    }
}

#[derive(Default)]
pub struct ListViewConfigBuilder {
    searchable_fields: Vec<String>,
    sort_specs: HashMap<String, ComparatorKind>,
    derived_keys: HashMap<String, DerivedKeyFn>,
    default_sort: Option<String>,
}

impl ListViewConfigBuilder {
    pub fn searchable<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.searchable_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn sort_field(mut self, field: impl Into<String>, kind: ComparatorKind) -> Self {
        self.sort_specs.insert(field.into(), kind);
        self
    }

    pub fn sort_fields<I, S>(mut self, fields: I, kind: ComparatorKind) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            self.sort_specs.insert(field.into(), kind);
        }
        self
    }

    /// Derived key compared case-insensitively as text.
    pub fn derived_key<F>(mut self, name: impl Into<String>, derive: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        self.derived_keys.insert(name.into(), Arc::new(derive));
        self
    }

    /// Derived key with an explicit comparator.
    pub fn derived_key_with<F>(mut self, name: impl Into<String>, kind: ComparatorKind, derive: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        let name = name.into();
        self.sort_specs.insert(name.clone(), kind);
        self.derived_keys.insert(name, Arc::new(derive));
        self
    }

    pub fn default_sort(mut self, key: impl Into<String>) -> Self {
        self.default_sort = Some(key.into());
        self
    }

    /// Fails when the default sort key is missing or not configured.
    pub fn build(self) -> Result<ListViewConfig> {
        validate_field_names("searchable_fields", &self.searchable_fields)?;
        let default_sort = self.default_sort.ok_or_else(|| RosterError::MissingConfigError {
            field: "default_sort".to_string(),
        })?;

        let config = ListViewConfig {
            searchable_fields: self.searchable_fields,
            sort_specs: self.sort_specs,
            derived_keys: self.derived_keys,
            default_sort,
        };
        config.resolve(&config.default_sort)?;
        Ok(config)
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListView {
    pub visible: Vec<Record>,
    pub matched_count: usize,
    pub total_count: usize,
}

impl ListView {
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// "Showing X of Y employees"
    pub fn banner(&self, noun: &str) -> String {
        format!("Showing {} of {} {}", self.matched_count, self.total_count, noun)
    }
}

#[derive(Debug, Clone)]
pub struct ListViewPipeline {
    config: ListViewConfig,
}

impl ListViewPipeline {
    pub fn new(config: ListViewConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ListViewConfig {
        &self.config
    }

    /// Checks the caller-supplied sort key before the first run.
    pub fn validate_params(&self, params: &QueryParams) -> Result<()> {
        self.config.resolve(self.sort_key(params)).map(|_| ())
    }

    /// Search, then filter, then stable sort.
    ///
    /// Descending order reverses the comparator, so records with equal keys
    /// keep their post-filter order in both directions.
    pub fn apply(&self, records: &[Record], params: &QueryParams) -> Result<ListView> {
        let sort = self.config.resolve(self.sort_key(params))?;
        let needle = params.search_text.to_lowercase();

        let mut keyed: Vec<(SortValue, &Record)> = records
            .iter()
            .filter(|record| needle.is_empty() || self.matches_search(record, &needle))
            .filter(|record| {
                params
                    .exact_filters
                    .iter()
                    .all(|(field, wanted)| values_match(record.get(field), wanted))
            })
            .map(|record| (sort.key_for(record), record))
            .collect();

        // sort_by 為穩定排序
        keyed.sort_by(|(a, _), (b, _)| params.sort_direction.apply(a.compare(b)));

        let visible: Vec<Record> = keyed.into_iter().map(|(_, record)| record.clone()).collect();
        Ok(ListView {
            matched_count: visible.len(),
            total_count: records.len(),
            visible,
        })
    }

    fn sort_key<'a>(&'a self, params: &'a QueryParams) -> &'a str {
        params
            .sort_key
            .as_deref()
            .unwrap_or(self.config.default_sort.as_str())
    }

    fn matches_search(&self, record: &Record, needle: &str) -> bool {
        self.config
            .searchable_fields
            .iter()
            .any(|field| fold_text(record.get(field)).contains(needle))
    }
}

/// Distinct non-empty values of a field, ordered with the given comparator.
/// Feeds filter dropdowns (grades, departments, statuses).
pub fn distinct_values(records: &[Record], field: &str, kind: ComparatorKind) -> Vec<Value> {
    let mut seen: BTreeMap<String, Value> = BTreeMap::new();
    for value in records.iter().filter_map(|record| record.get(field)) {
        let blank = match value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        };
        if !blank {
            seen.entry(value.to_string()).or_insert_with(|| value.clone());
        }
    }

    let mut values: Vec<Value> = seen.into_values().collect();
    values.sort_by(|a, b| {
        SortValue::from_value(kind, Some(a)).compare(&SortValue::from_value(kind, Some(b)))
    });
    values
}

/// Flips the direction when the same key is chosen again, otherwise sorts the
/// new key ascending (column-header click behaviour).
pub fn next_sort(params: &QueryParams, key: &str) -> (String, SortDirection) {
    if params.sort_key.as_deref() == Some(key) {
        (key.to_string(), params.sort_direction.toggled())
    } else {
        (key.to_string(), SortDirection::Ascending)
    }
}
