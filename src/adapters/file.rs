use crate::adapters::records_from_json;
use crate::domain::model::Record;
use crate::domain::ports::RecordSource;
use crate::utils::error::{Result, RosterError};
use std::path::{Path, PathBuf};

/// Read-only record snapshots on disk: `<base>/<table>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    base_path: PathBuf,
}

impl JsonFileSource {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", table))
    }
}

#[async_trait::async_trait]
impl RecordSource for JsonFileSource {
    async fn list_all(&self, table: &str) -> Result<Vec<Record>> {
        let path = self.table_path(table);
        tracing::debug!("📂 Reading snapshot: {}", path.display());

        let content = tokio::fs::read(&path).await?;
        let payload: serde_json::Value = serde_json::from_slice(&content)?;
        let records = records_from_json(payload, None, None)?;

        tracing::info!("📂 {}: Loaded {} records from snapshot", table, records.len());
        Ok(records)
    }

    async fn get_by_id(&self, table: &str, id: i64) -> Result<Record> {
        self.list_all(table)
            .await?
            .into_iter()
            .find(|record| record.id() == Some(id))
            .ok_or_else(|| RosterError::RecordNotFound {
                table: table.to_string(),
                id,
            })
    }
}
