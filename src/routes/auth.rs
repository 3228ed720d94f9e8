//! Request authentication.
//!
//! The service sits behind an auth gateway that validates the caller and
//! forwards the user id in a trusted header (`AUTH_USER_HEADER`). This module
//! only extracts that id; it does not verify tokens.

use axum::extract::FromRef;
use axum::http::StatusCode;
use axum::http::request::Parts;

use crate::state::AppState;

/// Authenticated user taken from the gateway header.
/// Use as a handler parameter to require authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        user_id_from_parts(parts, &app_state.auth_user_header)
            .map(|user_id| Self { user_id })
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

pub(crate) fn user_id_from_parts(parts: &Parts, header: &str) -> Option<String> {
    let value = parts.headers.get(header)?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_owned())
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
