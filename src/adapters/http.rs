use crate::adapters::records_from_json;
use crate::config::toml_config::SourceConfig;
use crate::domain::model::Record;
use crate::domain::ports::RecordSource;
use crate::utils::error::{Result, RosterError};
use reqwest::{Client, RequestBuilder, StatusCode};
use std::collections::HashMap;
use std::time::Duration;

/// Reads records from the remote record service: `GET {endpoint}/{table}`.
pub struct RemoteRecordSource {
    endpoint: String,
    headers: HashMap<String, String>,
    parameters: HashMap<String, String>,
    field_mapping: Option<HashMap<String, String>>,
    max_records: Option<usize>,
    client: Client,
}

impl RemoteRecordSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            headers: HashMap::new(),
            parameters: HashMap::new(),
            field_mapping: None,
            max_records: None,
            client: Client::new(),
        }
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| RosterError::MissingConfigError {
                field: "source.endpoint".to_string(),
            })?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        let mut source = Self::new(endpoint);
        source.client = builder.build()?;
        source.headers = config.headers.clone().unwrap_or_default();
        source.parameters = config.parameters.clone().unwrap_or_default();
        source.field_mapping = config.field_mapping.clone();
        source.max_records = config.max_records;
        Ok(source)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    fn request(&self, url: &str) -> RequestBuilder {
        let mut request = self.client.get(url);

        // 自訂標頭（專案 ID、公開金鑰等）
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        for (key, value) in &self.parameters {
            request = request.query(&[(key, value)]);
        }

        request
    }
}

#[async_trait::async_trait]
impl RecordSource for RemoteRecordSource {
    async fn list_all(&self, table: &str) -> Result<Vec<Record>> {
        let url = format!("{}/{}", self.endpoint, table);
        tracing::debug!("📡 Fetching records from: {}", url);

        let response = self.request(&url).send().await?;
        tracing::debug!("📡 API response status: {}", response.status());

        if !response.status().is_success() {
            let error_msg = format!("API request failed with status: {}", response.status());
            tracing::error!("❌ {}: {}", table, error_msg);
            return Err(RosterError::ServiceError { message: error_msg });
        }

        let payload: serde_json::Value = response.json().await?;
        let records = records_from_json(payload, self.field_mapping.as_ref(), self.max_records)?;

        tracing::info!("📡 {}: Fetched {} records", table, records.len());
        Ok(records)
    }

    async fn get_by_id(&self, table: &str, id: i64) -> Result<Record> {
        let url = format!("{}/{}/{}", self.endpoint, table, id);
        tracing::debug!("📡 Fetching record from: {}", url);

        let response = self.request(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RosterError::RecordNotFound {
                table: table.to_string(),
                id,
            });
        }
        if !response.status().is_success() {
            return Err(RosterError::ServiceError {
                message: format!("API request failed with status: {}", response.status()),
            });
        }

        let payload: serde_json::Value = response.json().await?;
        records_from_json(payload, self.field_mapping.as_ref(), None)?
            .into_iter()
            .next()
            .ok_or_else(|| RosterError::RecordNotFound {
                table: table.to_string(),
                id,
            })
    }
}
