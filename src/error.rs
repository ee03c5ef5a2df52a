use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParameterError {
    #[error("Invalid value {value} for '{name}': {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("Malformed parameter file at row {row}: {message}")]
    Malformed { row: usize, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ParameterError>;
