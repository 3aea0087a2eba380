//! Error types for querygen

use thiserror::Error;

use crate::codegen::QueryKind;

/// Result type alias for querygen operations
pub type Result<T> = std::result::Result<T, QueryGenError>;

/// Errors that can occur while parsing a schema or generating queries
#[derive(Error, Debug)]
pub enum QueryGenError {
    #[error("Failed to parse SQL schema: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Template error: {0}")]
    TemplateError(#[from] minijinja::Error),

    #[error("Failed to generate {kind} query for table {table}: {source}")]
    RenderError {
        kind: QueryKind,
        table: String,
        #[source]
        source: minijinja::Error,
    },
}

impl From<config::ConfigError> for QueryGenError {
    fn from(err: config::ConfigError) -> Self {
        QueryGenError::ConfigError(err.to_string())
    }
}
