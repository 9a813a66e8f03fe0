use thiserror::Error;

#[derive(Error, Debug)]
pub enum FoldError {
    #[error("Missing required column: {0}")]
    MissingColumns(String),

    #[error("Invalid argument `{parameter}`: {reason}")]
    InvalidArgument { parameter: String, reason: String },

    #[error("Data loading error: {0}")]
    DataLoading(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl FoldError {
    pub fn invalid_argument(parameter: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FoldError>;
