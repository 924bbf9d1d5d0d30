use chrono::{DateTime, Utc};
use shared::{
    domain::{Identity, Role},
    protocol::SessionResponse,
};

use crate::error::{ClientError, Result};

/// Who is using the client right now. Passed explicitly to every call that
/// needs a role or a bearer token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    token: Option<String>,
    identity: Option<Identity>,
    expires_at: Option<DateTime<Utc>>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(|identity| identity.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    pub fn bearer(&self) -> Result<&str> {
        self.token.as_deref().ok_or(ClientError::NotLoggedIn)
    }

    pub fn clear(&mut self) {
        *self = Self::anonymous();
    }
}

impl From<SessionResponse> for SessionContext {
    fn from(session: SessionResponse) -> Self {
        Self {
            token: Some(session.token),
            identity: Some(session.identity),
            expires_at: Some(session.expires_at),
        }
    }
}
