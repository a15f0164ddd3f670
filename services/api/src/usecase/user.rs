use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use hbnb_domain::pagination::PageRequest;

use crate::domain::repository::{PasswordHasher, UploadStore, UserRepository};
use crate::domain::types::User;
use crate::error::ApiError;

/// Load the acting user and require the admin flag.
///
/// A valid token whose user no longer exists is treated as unauthenticated.
pub async fn require_admin<U: UserRepository>(users: &U, actor: Uuid) -> Result<User, ApiError> {
    let user = users
        .find_by_id(actor)
        .await?
        .ok_or(ApiError::Unauthenticated)?;
    if !user.is_admin {
        return Err(ApiError::Forbidden);
    }
    Ok(user)
}

// ── GetMe ────────────────────────────────────────────────────────────────────

pub struct GetMeUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetMeUseCase<U> {
    pub async fn execute(&self, actor: Uuid) -> Result<User, ApiError> {
        self.users
            .find_by_id(actor)
            .await?
            .ok_or(ApiError::Unauthenticated)
    }
}

// ── ListUsers / GetUser (admin) ──────────────────────────────────────────────

pub struct ListUsersUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ListUsersUseCase<U> {
    pub async fn execute(&self, actor: Uuid, page: PageRequest) -> Result<Vec<User>, ApiError> {
        require_admin(&self.users, actor).await?;
        self.users.list(page).await
    }
}

pub struct GetUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetUserUseCase<U> {
    pub async fn execute(&self, actor: Uuid, user_id: Uuid) -> Result<User, ApiError> {
        require_admin(&self.users, actor).await?;
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)
    }
}

// ── UpdateMe ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct UpdateMeInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub country: Option<String>,
    pub town: Option<String>,
}

pub struct UpdateMeUseCase<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    pub users: U,
    pub hasher: H,
}

fn non_blank(field: &str, value: Option<String>) -> Result<Option<String>, ApiError> {
    match value.map(|v| v.trim().to_owned()) {
        Some(v) if v.is_empty() => Err(ApiError::validation(format!("{field} must not be empty"))),
        other => Ok(other),
    }
}

impl<U, H> UpdateMeUseCase<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    pub async fn execute(&self, actor: Uuid, input: UpdateMeInput) -> Result<User, ApiError> {
        let mut user = self
            .users
            .find_by_id(actor)
            .await?
            .ok_or(ApiError::Unauthenticated)?;

        if let Some(email) = non_blank("email", input.email)? {
            if email != user.email {
                if self.users.find_by_email(&email).await?.is_some() {
                    return Err(ApiError::EmailTaken);
                }
                user.email = email;
            }
        }
        if let Some(phone_number) = non_blank("phone_number", input.phone_number)? {
            if phone_number != user.phone_number {
                if self.users.find_by_phone(&phone_number).await?.is_some() {
                    return Err(ApiError::PhoneTaken);
                }
                user.phone_number = phone_number;
            }
        }
        if let Some(username) = non_blank("username", input.username)? {
            if username != user.username {
                if self.users.find_by_username(&username).await?.is_some() {
                    return Err(ApiError::UsernameTaken);
                }
                user.username = username;
            }
        }
        if let Some(country) = non_blank("country", input.country)? {
            user.country = country;
        }
        if let Some(town) = non_blank("town", input.town)? {
            user.town = town;
        }
        match input.password {
            Some(p) if p.is_empty() => {
                return Err(ApiError::validation("password must not be empty"));
            }
            Some(p) => user.password_hash = self.hasher.hash(&p).await?,
            None => {}
        }

        user.updated_at = Utc::now();
        self.users.update(&user).await?;
        Ok(user)
    }
}

// ── SetAvatar ────────────────────────────────────────────────────────────────

pub struct SetAvatarUseCase<U, S>
where
    U: UserRepository,
    S: UploadStore,
{
    pub users: U,
    pub uploads: S,
}

impl<U, S> SetAvatarUseCase<U, S>
where
    U: UserRepository,
    S: UploadStore,
{
    /// Only the user themself may change their avatar.
    pub async fn authorize(&self, actor: Uuid, user_id: Uuid) -> Result<User, ApiError> {
        if actor != user_id {
            return Err(ApiError::Forbidden);
        }
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)
    }

    pub async fn execute(
        &self,
        mut user: User,
        file_name: Option<&str>,
        data: Bytes,
    ) -> Result<User, ApiError> {
        if data.is_empty() {
            return Err(ApiError::validation("file is empty"));
        }
        let path = self.uploads.save(file_name, data).await?;
        user.avatar = Some(path);
        user.updated_at = Utc::now();
        self.users.update(&user).await?;
        Ok(user)
    }
}
