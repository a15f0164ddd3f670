use axum::{Json, extract::State, http::StatusCode};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::handlers::{MessageResponse, parse_body};
use crate::state::AppState;
use crate::usecase::auth::{
    LoginInput, LoginUseCase, RegisterInput, RegisterUseCase, VerifyTwoFactorInput,
    VerifyTwoFactorUseCase,
};

// ── POST /api/auth/register ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub country: Option<String>,
    pub town: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub id: String,
}

pub async fn register(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let body: RegisterRequest = parse_body(&body)?;
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        hasher: state.hasher.clone(),
    };
    let user = usecase
        .execute(RegisterInput {
            username: body.username,
            email: body.email,
            password: body.password,
            phone_number: body.phone_number,
            country: body.country,
            town: body.town,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
            id: user.id.to_string(),
        }),
    ))
}

// ── POST /api/auth/login ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let body: LoginRequest = parse_body(&body)?;
    let usecase = LoginUseCase {
        users: state.user_repo(),
        hasher: state.hasher.clone(),
        codes: state.two_factor.clone(),
        mailer: state.mailer.clone(),
    };
    usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok(Json(MessageResponse::new("2FA code sent to your email")))
}

// ── POST /api/auth/verify-2fa ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyTwoFactorRequest {
    pub email: String,
    pub code: String,
}

#[derive(Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
}

pub async fn verify_two_factor(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    let body: VerifyTwoFactorRequest = parse_body(&body)?;
    let usecase = VerifyTwoFactorUseCase {
        codes: state.two_factor.clone(),
        jwt_secret: state.session_secret.0.to_string(),
    };
    let issued = usecase
        .execute(VerifyTwoFactorInput {
            email: body.email,
            code: body.code,
        })
        .await?;
    Ok(Json(AccessTokenResponse {
        access_token: issued.token,
    }))
}
