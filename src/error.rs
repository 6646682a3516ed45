use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinilyticsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FinilyticsError>;
