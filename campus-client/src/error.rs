use crate::session::SessionError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// 401 from the API. The stored session has already been cleared.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Session(#[from] SessionError),
}

pub type ClientResult<T> = Result<T, ClientError>;
