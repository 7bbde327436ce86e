use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReporterError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    ApiStatusError { status: u16, body: String },

    #[error("Authorization failed ({status}): {message}")]
    AuthorizationError { status: u16, message: String },

    #[error("Database error: {0}")]
    DatabaseError(#[from] mongodb::error::Error),

    #[error("Secret store error: {message}")]
    SecretStoreError { message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Authorization,
    Database,
    SecretStore,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl ReporterError {
    pub fn config(message: impl Into<String>) -> Self {
        ReporterError::ConfigError {
            message: message.into(),
        }
    }

    pub fn secret_store(message: impl Into<String>) -> Self {
        ReporterError::SecretStoreError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ReporterError::ApiError(_) | ReporterError::ApiStatusError { .. } => {
                ErrorCategory::Network
            }
            ReporterError::AuthorizationError { .. } => ErrorCategory::Authorization,
            ReporterError::DatabaseError(_) => ErrorCategory::Database,
            ReporterError::SecretStoreError { .. } => ErrorCategory::SecretStore,
            ReporterError::CsvError(_)
            | ReporterError::IoError(_)
            | ReporterError::SerializationError(_) => ErrorCategory::Io,
            ReporterError::ConfigError { .. }
            | ReporterError::MissingConfigError { .. }
            | ReporterError::InvalidConfigValueError { .. }
            | ReporterError::ValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路錯誤通常可以重試
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Authorization => ErrorSeverity::High,
            ErrorCategory::Database | ErrorCategory::Io => ErrorSeverity::High,
            // 密碼已經在 Atlas 變更但沒有存到 secret store
            ErrorCategory::SecretStore => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ReporterError::AuthorizationError { status: 403, .. } => {
                "Check whether this machine's IP is on the project's API access list"
            }
            ReporterError::AuthorizationError { .. } => {
                "Verify the Atlas public/private API key pair"
            }
            ReporterError::MissingConfigError { .. } => {
                "Pass the missing value as a flag or add it to the config file"
            }
            ReporterError::InvalidConfigValueError { .. }
            | ReporterError::ConfigError { .. }
            | ReporterError::ValidationError { .. } => "Fix the configuration and run again",
            ReporterError::ApiError(_) | ReporterError::ApiStatusError { .. } => {
                "Check network connectivity and the Atlas endpoint, then retry"
            }
            ReporterError::DatabaseError(_) => {
                "Check the connection string and that the cluster is reachable"
            }
            ReporterError::SecretStoreError { .. } => {
                "Re-run the rotation once the secret store is reachable; the last password was not saved"
            }
            ReporterError::CsvError(_) | ReporterError::IoError(_) => {
                "Check that the output directory exists and is writable"
            }
            ReporterError::SerializationError(_) => {
                "The upstream response could not be parsed; run with --verbose for details"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Could not reach the API: {}", self),
            ErrorCategory::Authorization => format!("Access denied: {}", self),
            ErrorCategory::Database => format!("Database query failed: {}", self),
            ErrorCategory::SecretStore => format!("Could not store the secret: {}", self),
            ErrorCategory::Io => format!("Could not write the report: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReporterError>;
