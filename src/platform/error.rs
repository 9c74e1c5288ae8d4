use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    /// The request never got an HTTP answer
    #[error("request to video platform failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The platform answered with a non-success status
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    #[error("failed to sign platform assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("invalid access token: {0}")]
    Token(String),

    #[error("invalid platform URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid archive id {0:?}")]
    InvalidArchiveId(String),

    #[error("unexpected response from video platform: {0}")]
    Decode(String),
}

impl PlatformError {
    pub fn is_transport(&self) -> bool {
        matches!(self, PlatformError::Transport(_))
    }
}
