use thiserror::Error;

/// Errors raised while talking to the processing server
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} returned status {status}")]
    Status { status: u16, endpoint: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Output reference has no usable file name: {0:?}")]
    InvalidOutputName(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
