//! Error types for ingest and compare operations.

use thiserror::Error;

/// Main error type for crosscheck operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A prompted value could not be coerced under its column's type rule.
    #[error("Column {column} rejected value '{value}': expected {expected}")]
    Format {
        column: String,
        value: String,
        expected: String,
    },

    /// Introspected schema disagrees with the registered one.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// No reference schema registered for the requested table.
    #[error("No reference schema registered for table '{0}'")]
    SchemaNotFound(String),

    /// Table does not exist or introspection returned no columns.
    #[error("Table '{0}' not found or has no columns")]
    MissingTable(String),

    /// Opaque failure reported by the query executor.
    #[error("Executor error: {0}")]
    Executor(String),

    /// HTTP transport error.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error (file operations, terminal input).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a Format error for a rejected input value.
    pub fn format(
        column: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Error::Format {
            column: column.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create a SchemaMismatch for differing column counts.
    pub fn schema_count(expected: usize, actual: usize) -> Self {
        Error::SchemaMismatch(format!(
            "expected {} columns, database reports {}",
            expected, actual
        ))
    }

    /// Create a SchemaMismatch for the first differing column position.
    pub fn schema_column(
        position: usize,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Error::SchemaMismatch(format!(
            "column {} differs: expected {}, database reports {}",
            position, expected, actual
        ))
    }

    /// Process exit code for this error. Every failure maps to 1;
    /// success never reaches here.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Format error with full details including error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for crosscheck operations.
pub type Result<T> = std::result::Result<T, Error>;
