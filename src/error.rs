use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepoPulseError {
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    NoData(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RepoPulseError>;
