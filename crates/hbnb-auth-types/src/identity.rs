//! Bearer session-token extractor.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponse, Response};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

use crate::token::{TokenError, validate_session_token};

/// HMAC secret used to validate session tokens. Provide it from the router state
/// with a `FromRef` impl.
#[derive(Clone)]
pub struct SessionSecret(pub Arc<str>);

impl SessionSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }
}

/// Caller identity taken from `Authorization: Bearer <session token>`.
///
/// Rejects with 401 when the header is absent or the token fails validation.
/// Ownership and admin checks (403) are done by handlers after extraction.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthRejection {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid session token")]
    InvalidToken(#[source] TokenError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "kind": "UNAUTHENTICATED",
            "message": self.to_string(),
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for Identity
where
    SessionSecret: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    // axum-core 0.5 declares `fn -> impl Future + Send`; do the header work
    // synchronously and return a 'static future.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let secret = SessionSecret::from_ref(state);
        let bearer = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .map(|auth| auth.token().to_owned());

        async move {
            let token = bearer.ok_or(AuthRejection::MissingToken)?;
            let info = validate_session_token(&token, &secret.0).map_err(|e| {
                tracing::debug!(error = %e, "rejected session token");
                AuthRejection::InvalidToken(e)
            })?;
            Ok(Self {
                user_id: info.user_id,
            })
        }
    }
}
