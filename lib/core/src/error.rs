use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: {0}")]
    NotInitialized(String),

    #[error("Malformed line {line} in {source_name}: {reason}")]
    DataFormat {
        source_name: String,
        line: usize,
        reason: String,
    },

    #[error("Missing persisted result: {0}")]
    MissingResult(String),

    #[error("Matcher {matcher} failed: {reason}")]
    Generator { matcher: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
