use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {0}")]
    Status(reqwest::StatusCode),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("No device data available")]
    NoDeviceData,
}

impl Error {
    /// Failure class, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Transport(_) => "transport",
            Error::Status(_) => "protocol",
            Error::Json(_) | Error::Schema(_) | Error::NoDeviceData => "schema",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
