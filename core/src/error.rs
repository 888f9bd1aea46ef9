use thiserror::Error;

#[derive(Error, Debug)]
pub enum HubError {
    #[error("No record source available and generation failed: {reason}")]
    DataUnavailable { reason: String },

    #[error("Record file '{path}' does not match the client schema: {detail}")]
    Schema { path: String, detail: String },

    #[error("Operation '{operation}' requires at least one record")]
    EmptySubset { operation: &'static str },

    #[error("Export to '{path}' failed: {detail}")]
    Export { path: String, detail: String },

    #[error("Unknown age bucket '{label}'")]
    UnknownAgeBucket { label: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type HubResult<T> = Result<T, HubError>;
