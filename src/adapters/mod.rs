// Adapters layer: concrete RecordSource implementations (remote service, local snapshot).

pub mod file;
pub mod http;

pub use file::JsonFileSource;
pub use http::RemoteRecordSource;

use crate::domain::model::Record;
use crate::utils::error::{Result, RosterError};
use serde_json::Value;
use std::collections::HashMap;

/// Turns a record-service payload into records.
///
/// Accepts a bare array, the `{ "success": .., "data": .. }` envelope, or a
/// single object. A `success: false` envelope becomes a service error.
pub(crate) fn records_from_json(
    payload: Value,
    field_mapping: Option<&HashMap<String, String>>,
    max_records: Option<usize>,
) -> Result<Vec<Record>> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut obj) => {
            if obj.get("success").and_then(Value::as_bool) == Some(false) {
                let message = obj
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("request was not successful")
                    .to_string();
                return Err(RosterError::ServiceError { message });
            }
            match obj.remove("data") {
                Some(Value::Array(items)) => items,
                Some(Value::Object(single)) => vec![Value::Object(single)],
                Some(Value::Null) => Vec::new(),
                Some(other) => {
                    return Err(RosterError::ProcessingError {
                        message: format!("Unexpected 'data' payload: {}", other),
                    })
                }
                // 信封缺少 data 視為空表
                None if obj.contains_key("success") => Vec::new(),
                None => vec![Value::Object(obj)],
            }
        }
        other => {
            return Err(RosterError::ProcessingError {
                message: format!("Unexpected response shape: {}", other),
            })
        }
    };

    let limit = max_records.unwrap_or(items.len());
    let records = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(obj) => Some(obj),
            _ => None,
        })
        .take(limit)
        .map(|obj| match field_mapping {
            // 欄位改名（例如 firstName -> first_name_c）
            Some(mapping) => Record {
                data: obj
                    .into_iter()
                    .map(|(key, value)| (mapping.get(&key).cloned().unwrap_or(key), value))
                    .collect(),
            },
            None => Record::from(obj),
        })
        .collect();

    Ok(records)
}
