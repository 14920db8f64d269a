use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("graphql error: {}", .0.join("; "))]
    GraphQl(Vec<String>),
    #[error("failed to decode {field}: {source}")]
    Decode {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("response carried no data for {0}")]
    EmptyResult(&'static str),
    #[error("no GraphQL transport configured")]
    Unavailable,
}

#[derive(Debug, Error)]
pub enum QuizError {
    /// Client-side answer check; no request was sent.
    #[error("{0}")]
    Validation(&'static str),
    #[error("Attempt not found!")]
    AttemptNotFound,
    #[error("a submission is already in flight")]
    Busy,
    #[error("the attempt is already finished")]
    Finished,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl QuizError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::Validation,
            Self::AttemptNotFound => ErrorCode::NotFound,
            Self::Busy | Self::Finished => ErrorCode::Conflict,
            Self::Transport(_) => ErrorCode::Internal,
        }
    }
}

impl From<&QuizError> for ApiError {
    fn from(value: &QuizError) -> Self {
        ApiError::new(value.code(), value.to_string())
    }
}
