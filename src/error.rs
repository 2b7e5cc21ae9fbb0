//! Error type shared by the dispatcher, the consumers and the CLI

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("consumer `{0}` was started before being initialized")]
    NotInitialized(&'static str),

    #[error("consumer `{0}` was already started")]
    AlreadyStarted(&'static str),

    #[error("malformed display request: {0}")]
    InvalidRequest(String),

    #[error("display driver error: {0}")]
    Display(String),

    #[error("unsupported host: {0}")]
    UnsupportedHost(String),

    #[error("invalid event line: {0}")]
    InvalidEvent(String),
}

impl Error {
    pub(crate) fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        Error::Bind {
            addr: addr.into(),
            source,
        }
    }
}
