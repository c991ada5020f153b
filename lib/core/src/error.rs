use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No input provided")]
    MissingInput,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Non-finite value in column {0}")]
    NonFinite(String),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Row {row} is outside a matrix of {rows} rows")]
    RowOutOfBounds { row: usize, rows: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
