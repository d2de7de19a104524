use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Record service rejected the request: {message}")]
    ServiceError { message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Unknown sort key '{key}' (available: {available})")]
    UnknownSortKey { key: String, available: String },

    #[error("Record {id} not found in '{table}'")]
    RecordNotFound { table: String, id: i64 },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 根據錯誤嚴重程度決定退出碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,   // 重試錯誤
            ErrorSeverity::High => 1,     // 處理錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        }
    }
}

impl RosterError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RosterError::ApiError(_) | RosterError::ServiceError { .. } => ErrorCategory::Network,
            RosterError::ConfigError { .. }
            | RosterError::ConfigValidationError { .. }
            | RosterError::InvalidConfigValueError { .. }
            | RosterError::MissingConfigError { .. }
            | RosterError::UnknownSortKey { .. } => ErrorCategory::Configuration,
            RosterError::CsvError(_)
            | RosterError::SerializationError(_)
            | RosterError::RecordNotFound { .. }
            | RosterError::ProcessingError { .. } => ErrorCategory::Data,
            RosterError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            RosterError::ApiError(_) => {
                "Check the record service endpoint and your network connection, then retry".to_string()
            }
            RosterError::ServiceError { .. } => {
                "Verify the project credentials in the [source] headers".to_string()
            }
            RosterError::UnknownSortKey { available, .. } => {
                format!("Use one of the configured sort keys: {}", available)
            }
            RosterError::RecordNotFound { .. } => {
                "The record may have been deleted; reload the list".to_string()
            }
            RosterError::ConfigError { .. }
            | RosterError::ConfigValidationError { .. }
            | RosterError::InvalidConfigValueError { .. }
            | RosterError::MissingConfigError { .. } => {
                "Fix the configuration file and run again".to_string()
            }
            RosterError::CsvError(_) | RosterError::SerializationError(_) => {
                "Make sure the record snapshot is valid JSON".to_string()
            }
            RosterError::IoError(_) => "Check file paths and permissions".to_string(),
            RosterError::ProcessingError { .. } => "Inspect the input records".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not load records: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Data => format!("Record data problem: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

impl From<toml::de::Error> for RosterError {
    fn from(err: toml::de::Error) -> Self {
        RosterError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", err),
        }
    }
}

pub type Result<T> = std::result::Result<T, RosterError>;
