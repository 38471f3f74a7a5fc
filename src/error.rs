use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid task record {id}: {reason}")]
    InvalidTaskRecord { id: String, reason: String },

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid tag name: {0}")]
    InvalidTagName(String),

    #[error("Invalid URL: {0}")]
    UrlParse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
