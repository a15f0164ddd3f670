//! Bearer-token helpers for handler tests.
//!
//! `MockAuth` signs real session tokens with a test secret so requests pass
//! through the production `Identity` extractor unchanged.

use axum::http::{HeaderName, HeaderValue, header::AUTHORIZATION};
use uuid::Uuid;

use hbnb_auth_types::token::issue_session_token;

/// Secret shared by test routers and `MockAuth`.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";

/// A caller with a signed session token.
pub struct MockAuth {
    pub user_id: Uuid,
    pub token: String,
}

impl MockAuth {
    pub fn new(user_id: Uuid) -> Self {
        Self::with_secret(user_id, TEST_JWT_SECRET)
    }

    pub fn with_secret(user_id: Uuid, secret: &str) -> Self {
        let issued = issue_session_token(user_id, secret).unwrap();
        Self {
            user_id,
            token: issued.token,
        }
    }

    /// `Authorization` header pair, e.g. for `axum_test::TestRequest::add_header`.
    pub fn header(&self) -> (HeaderName, HeaderValue) {
        (
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token)).unwrap(),
        )
    }
}
