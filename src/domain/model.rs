use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 外部服務指派的主鍵欄位
pub const ID_FIELD: &str = "Id";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(field.to_string(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.data.get(field)
    }

    pub fn id(&self) -> Option<i64> {
        self.data.get(ID_FIELD).and_then(|v| match v {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// 欄位的顯示文字；缺值或 null 為空字串
    pub fn text(&self, field: &str) -> String {
        match self.data.get(field) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Record {
    fn from(obj: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            data: obj.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_id_accepts_numeric_string() {
        assert_eq!(Record::new().with("Id", 7).id(), Some(7));
        assert_eq!(Record::new().with("Id", "12").id(), Some(12));
        assert_eq!(Record::new().with("Id", json!(null)).id(), None);
    }

    #[test]
    fn test_record_deserializes_from_plain_object() {
        let record: Record =
            serde_json::from_value(json!({"Id": 1, "first_name_c": "Ada"})).unwrap();
        assert_eq!(record.text("first_name_c"), "Ada");
        assert_eq!(record.text("missing"), "");
        assert_eq!(record.text("Id"), "1");
    }
}
