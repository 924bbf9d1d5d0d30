//! Client side of the storefront: an HTTP backend, the dashboard session
//! and the customer's cart on a public store page.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::checkout::DEFAULT_MESSAGING_HOST;

pub mod backend;
pub mod browser;
pub mod client;
pub mod error;
pub mod http;
pub mod session;

pub use backend::StorefrontBackend;
pub use browser::StoreBrowser;
pub use client::StorefrontClient;
pub use error::{ClientError, Result};
pub use http::HttpBackend;
pub use session::SessionContext;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8443";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub messaging_host: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            messaging_host: DEFAULT_MESSAGING_HOST.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn backend(&self) -> Result<Arc<dyn StorefrontBackend>> {
        Ok(Arc::new(HttpBackend::new(&self.base_url)?))
    }

    pub fn dashboard(&self) -> Result<Arc<StorefrontClient>> {
        Ok(StorefrontClient::new(self.backend()?))
    }

    pub fn store(&self, slug: impl Into<String>) -> Result<StoreBrowser> {
        Ok(StoreBrowser::new(self.backend()?, slug).with_messaging_host(self.messaging_host.clone()))
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod http_tests;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
