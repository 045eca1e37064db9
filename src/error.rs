//! Error types for the aggregation engine and the data loader.

use thiserror::Error as ThisError;

///
/// AggregateError
///

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum AggregateError {
    #[error("field not found: '{0}'")]
    FieldNotFound(String),

    #[error("aggregation key must name at least one dimension")]
    EmptyKey,
}

///
/// LoadError
///

#[derive(Debug, ThisError)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed delimited data: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column '{0}' is missing from the header row")]
    MissingColumn(String),

    #[error("line {line}: invalid value '{value}' in column '{column}'")]
    InvalidValue {
        line: u64,
        column: &'static str,
        value: String,
    },
}
