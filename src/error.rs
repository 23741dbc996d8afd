use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Malformed raw table for year {year}: {message}")]
    MalformedInput { year: i32, message: String },

    #[error("Duplicate station column '{column}' after code normalization (year {year})")]
    DuplicateColumn { year: i32, column: String },

    #[error("Table '{table}' is missing required columns: {}", columns.join(", "))]
    MissingRequiredColumn { table: String, columns: Vec<String> },

    #[error("Invalid station registry: {0}")]
    InvalidRegistry(String),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl ProcessingError {
    pub fn malformed(year: i32, message: impl Into<String>) -> Self {
        ProcessingError::MalformedInput {
            year,
            message: message.into(),
        }
    }

    pub fn missing_columns(table: impl Into<String>, columns: Vec<String>) -> Self {
        ProcessingError::MissingRequiredColumn {
            table: table.into(),
            columns,
        }
    }
}
