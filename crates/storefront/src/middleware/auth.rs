//! Authentication extractors.
//!
//! Handlers that need a signed-in identity take [`RequireUser`]; everything
//! else reads the session directly and treats the absent-user case as guest
//! mode.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a signed-in user.
///
/// Rejects with `401 Unauthorized` when no identity is in the session.
///
/// # Example
///
/// ```rust,ignore
/// async fn addresses(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("addresses for {}", user.email)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

/// Rejection returned when authentication is required but absent.
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, "sign in required").into_response()
    }
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts.extensions.get::<Session>().ok_or(AuthRejection)?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or(AuthRejection)?;

        Ok(Self(user))
    }
}
