use chrono::Utc;
use rand::RngExt;
use uuid::Uuid;

use hbnb_auth_types::token::{IssuedToken, issue_session_token};

use crate::domain::repository::{MailSender, PasswordHasher, TwoFactorStore, UserRepository};
use crate::domain::types::{Redemption, TwoFactorRecord, User};
use crate::error::ApiError;

fn generate_code() -> String {
    rand::rng().random_range(100_000..=999_999u32).to_string()
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn require(name: &'static str, value: Option<String>, missing: &mut Vec<&'static str>) -> String {
    value.unwrap_or_else(|| {
        missing.push(name);
        String::new()
    })
}

// ── Register ─────────────────────────────────────────────────────────────────

/// Registration form as received. Every field is required.
#[derive(Debug, Default)]
pub struct RegisterInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub country: Option<String>,
    pub town: Option<String>,
}

pub struct RegisterUseCase<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    pub users: U,
    pub hasher: H,
}

impl<U, H> RegisterUseCase<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    pub async fn execute(&self, input: RegisterInput) -> Result<User, ApiError> {
        let mut missing = Vec::new();
        let username = require("username", present(input.username), &mut missing);
        let email = require("email", present(input.email), &mut missing);
        // Passwords are taken verbatim; only emptiness is rejected.
        let password = require(
            "password",
            input.password.filter(|p| !p.is_empty()),
            &mut missing,
        );
        let phone_number = require("phone_number", present(input.phone_number), &mut missing);
        let country = require("country", present(input.country), &mut missing);
        let town = require("town", present(input.town), &mut missing);
        if !missing.is_empty() {
            return Err(ApiError::validation(format!(
                "Missing fields: {}",
                missing.join(", ")
            )));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ApiError::EmailTaken);
        }
        if self.users.find_by_phone(&phone_number).await?.is_some() {
            return Err(ApiError::PhoneTaken);
        }
        if self.users.find_by_username(&username).await?.is_some() {
            return Err(ApiError::UsernameTaken);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            username,
            email,
            password_hash: self.hasher.hash(&password).await?,
            phone_number,
            country,
            town,
            is_admin: false,
            avatar: None,
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// First factor: check the password, then mail a one-time code.
pub struct LoginUseCase<U, H, T, M>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TwoFactorStore,
    M: MailSender,
{
    pub users: U,
    pub hasher: H,
    pub codes: T,
    pub mailer: M,
}

impl<U, H, T, M> LoginUseCase<U, H, T, M>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TwoFactorStore,
    M: MailSender,
{
    pub async fn execute(&self, input: LoginInput) -> Result<(), ApiError> {
        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;
        if !self
            .hasher
            .verify(&input.password, &user.password_hash)
            .await?
        {
            return Err(ApiError::InvalidCredentials);
        }

        let record = TwoFactorRecord::issue(generate_code(), user.id, Utc::now());
        self.codes.put(&input.email, &record).await?;

        if let Err(e) = self
            .mailer
            .send_two_factor_code(&input.email, &record.code)
            .await
        {
            // A code the user never received must not stay redeemable.
            self.codes.discard(&input.email).await?;
            return Err(e);
        }

        tracing::info!(user_id = %user.id, "two-factor code issued");
        Ok(())
    }
}

// ── VerifyTwoFactor ──────────────────────────────────────────────────────────

pub struct VerifyTwoFactorInput {
    pub email: String,
    pub code: String,
}

/// Second factor: redeem the mailed code for a session token.
pub struct VerifyTwoFactorUseCase<T: TwoFactorStore> {
    pub codes: T,
    pub jwt_secret: String,
}

impl<T: TwoFactorStore> VerifyTwoFactorUseCase<T> {
    pub async fn execute(&self, input: VerifyTwoFactorInput) -> Result<IssuedToken, ApiError> {
        let record = match self
            .codes
            .redeem(&input.email, &input.code, Utc::now())
            .await?
        {
            Redemption::Redeemed(record) => record,
            Redemption::Expired => return Err(ApiError::CodeExpired),
            Redemption::Mismatch => return Err(ApiError::InvalidCode),
            Redemption::Missing => return Err(ApiError::NoSessionFound),
        };

        let issued = issue_session_token(record.user_id, &self.jwt_secret)
            .map_err(|e| ApiError::Internal(e.into()))?;
        tracing::info!(user_id = %record.user_id, "session token issued");
        Ok(issued)
    }
}
