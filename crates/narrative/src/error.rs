use thiserror::Error;

/// Failure of the external text generation service.
///
/// Never shown to end users: the narrator logs it and answers with the
/// deterministic fallback instead.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation timed out after {0} seconds")]
    Timeout(u64),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("generation service answered {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed reply: {0}")]
    Malformed(String),
    #[error("no API key configured")]
    NotConfigured,
}

impl From<reqwest::Error> for GenerationError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            Self::Timeout(0)
        } else if value.is_decode() {
            Self::Malformed(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("invalid project name: \"{0}\"")]
    InvalidName(String),
    #[error("project \"{0}\" not found")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
