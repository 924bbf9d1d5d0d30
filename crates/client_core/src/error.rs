use shared::{checkout::CheckoutError, error::ApiError, validation::ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("server returned {status}: {error}")]
    Api { status: u16, error: ApiError },
    #[error("not logged in")]
    NotLoggedIn,
    #[error("store page not loaded")]
    StoreNotLoaded,
    #[error("item {0} is not offered by this store")]
    UnknownItem(i64),
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ClientError {
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api { error, .. } => Some(error),
            _ => None,
        }
    }

    /// True when the session is gone or never existed; the UI goes back to login.
    pub fn requires_login(&self) -> bool {
        match self {
            ClientError::NotLoggedIn => true,
            ClientError::Api { error, .. } => error.requires_login(),
            _ => false,
        }
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
