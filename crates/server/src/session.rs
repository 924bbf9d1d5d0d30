use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    Json,
};
use shared::{domain::Identity, error::ApiError};
use tracing::error;

use crate::app_state::AppState;

pub(crate) type HttpError = (StatusCode, Json<ApiError>);

pub(crate) fn reject(err: ApiError) -> HttpError {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(message = %err.message, "request failed");
    }
    (status, Json(err))
}

/// The caller's identity, resolved from `Authorization: Bearer <token>`.
pub(crate) struct AuthSession(pub(crate) Identity);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthSession {
    type Rejection = HttpError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| reject(ApiError::unauthorized("Inicie sesión para continuar")))?;
        let identity = server_api::auth::authenticate(&state.api, token)
            .await
            .map_err(reject)?;
        Ok(Self(identity))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|token| !token.is_empty())
}
