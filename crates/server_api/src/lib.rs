//! Service layer shared by the HTTP server and the admin tools. Every
//! operation takes the caller's [`Identity`](shared::domain::Identity) when it
//! needs one and returns `Result<_, ApiError>`.

use shared::{
    access::AccessPolicy,
    checkout::DEFAULT_MESSAGING_HOST,
    error::{ApiError, ErrorCode},
};
use storage::Storage;

pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod orders;
pub mod stores;
pub mod storefront;
pub mod token;
pub mod users;

pub use token::TokenConfig;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
    pub tokens: TokenConfig,
    /// Host of the messaging deep links, `wa.me` unless overridden.
    pub messaging_host: String,
    pub policy: AccessPolicy,
}

impl ApiContext {
    pub fn new(storage: Storage, tokens: TokenConfig) -> Self {
        Self {
            storage,
            tokens,
            messaging_host: DEFAULT_MESSAGING_HOST.to_string(),
            policy: AccessPolicy::default(),
        }
    }

    pub fn with_messaging_host(mut self, host: impl Into<String>) -> Self {
        self.messaging_host = host.into();
        self
    }
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}

fn conflict(message: impl Into<String>) -> ApiError {
    ApiError::new(ErrorCode::Conflict, message)
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
