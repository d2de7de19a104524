use crate::core::export::OutputFormat;
use crate::core::view::{EntityKind, ViewDefinition};
use crate::utils::error::{Result, RosterError};
use crate::utils::validation::{
    validate_path, validate_positive_number, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    /// 覆寫內建的檢視表定義
    #[serde(default)]
    pub views: BTreeMap<EntityKind, ViewDefinition>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Api,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub r#type: SourceKind,
    pub endpoint: Option<String>,
    pub data_dir: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
    pub parameters: Option<HashMap<String, String>>,
    pub field_mapping: Option<HashMap<String, String>>,
    pub max_records: Option<usize>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            r#type: SourceKind::File,
            endpoint: None,
            data_dir: Some("./data".to_string()),
            timeout_seconds: None,
            headers: None,
            parameters: None,
            field_mapping: None,
            max_records: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,
    pub path: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output
            .as_ref()
            .and_then(|o| o.format)
            .unwrap_or_default()
    }

    pub fn output_path(&self) -> Option<&str> {
        self.output.as_ref().and_then(|o| o.path.as_deref())
    }
}

/// 替換環境變數 (例如 ${API_KEY})；未設定的變數保留原樣
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RosterError::ConfigError {
        message: format!("Invalid substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.into_owned())
}

impl Validate for SourceConfig {
    fn validate(&self) -> Result<()> {
        match self.r#type {
            SourceKind::Api => {
                let endpoint =
                    self.endpoint
                        .as_deref()
                        .ok_or_else(|| RosterError::MissingConfigError {
                            field: "source.endpoint".to_string(),
                        })?;
                validate_url("source.endpoint", endpoint)?;
            }
            SourceKind::File => {
                let data_dir =
                    self.data_dir
                        .as_deref()
                        .ok_or_else(|| RosterError::MissingConfigError {
                            field: "source.data_dir".to_string(),
                        })?;
                validate_path("source.data_dir", data_dir)?;
            }
        }

        if let Some(timeout) = self.timeout_seconds {
            validate_positive_number("source.timeout_seconds", timeout as usize, 1)?;
        }
        if let Some(max) = self.max_records {
            validate_positive_number("source.max_records", max, 1)?;
        }
        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.source.validate()?;

        // 檢視表定義在此就建好一次，錯誤在啟動時就出現
        for (entity, definition) in &self.views {
            definition.build_config().map_err(|e| RosterError::ConfigValidationError {
                field: format!("views.{}", entity),
                message: e.to_string(),
            })?;
        }

        if let Some(path) = self.output_path() {
            validate_path("output.path", path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compare::ComparatorKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_api_config_with_view_override() {
        let toml_content = r#"
[source]
type = "api"
endpoint = "https://records.example.com/v1"
timeout_seconds = 10

[source.headers]
x-project-id = "demo"

[views.departments]
table = "teams_c"
noun = "teams"
searchable_fields = ["name_c"]
default_sort = "name_c"

[views.departments.sort_fields]
name_c = "lexicographic"
headcount_c = "numeric"

[output]
format = "csv"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.source.r#type, SourceKind::Api);
        assert_eq!(config.source.endpoint.as_deref(), Some("https://records.example.com/v1"));
        assert_eq!(config.output_format(), OutputFormat::Csv);

        let teams = &config.views[&EntityKind::Departments];
        assert_eq!(teams.table, "teams_c");
        assert_eq!(teams.sort_fields["headcount_c"], ComparatorKind::Numeric);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_defaults_to_file_source() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.source.r#type, SourceKind::File);
        assert_eq!(config.output_format(), OutputFormat::Table);
        assert!(config.views.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("STAFF_ROSTER_TEST_ENDPOINT", "https://test.api.com");

        let toml_content = r#"
[source]
type = "api"
endpoint = "${STAFF_ROSTER_TEST_ENDPOINT}"

[source.headers]
x-api-key = "${STAFF_ROSTER_UNSET_KEY}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.endpoint.as_deref(), Some("https://test.api.com"));
        assert_eq!(
            config.source.headers.as_ref().unwrap()["x-api-key"],
            "${STAFF_ROSTER_UNSET_KEY}"
        );

        std::env::remove_var("STAFF_ROSTER_TEST_ENDPOINT");
    }

    #[test]
    fn test_api_source_requires_valid_endpoint() {
        let missing = TomlConfig::from_toml_str("[source]\ntype = \"api\"\n").unwrap();
        assert!(matches!(
            missing.validate(),
            Err(RosterError::MissingConfigError { .. })
        ));

        let invalid =
            TomlConfig::from_toml_str("[source]\ntype = \"api\"\nendpoint = \"invalid-url\"\n")
                .unwrap();
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_invalid_view_override_fails_validation() {
        let toml_content = r#"
[views.students]
table = "students_c"
noun = "students"
searchable_fields = ["first_name_c"]
default_sort = "nickname_c"

[views.students.sort_fields]
first_name_c = "lexicographic"
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, RosterError::ConfigValidationError { ref field, .. } if field == "views.students"));
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let result = TomlConfig::from_toml_str("[source\ntype = 3");
        assert!(matches!(
            result,
            Err(RosterError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[source]\ntype = \"file\"\ndata_dir = \"./snapshots\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.source.data_dir.as_deref(), Some("./snapshots"));
    }
}
