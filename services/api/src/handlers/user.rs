use axum::{
    Json,
    extract::{Multipart, Path, Query, State, multipart::MultipartRejection},
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hbnb_auth_types::identity::Identity;

use crate::domain::types::User;
use crate::error::ApiError;
use crate::handlers::{PageQuery, multipart_file, parse_body};
use crate::state::AppState;
use crate::usecase::user::{
    GetMeUseCase, GetUserUseCase, ListUsersUseCase, SetAvatarUseCase, UpdateMeInput,
    UpdateMeUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub country: String,
    pub town: String,
    pub is_admin: bool,
    pub avatar: String,
    #[serde(serialize_with = "hbnb_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "hbnb_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            avatar: user.avatar_or_default().to_owned(),
            username: user.username,
            email: user.email,
            phone_number: user.phone_number,
            country: user.country,
            town: user.town,
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ── GET /api/users ───────────────────────────────────────────────────────────

pub async fn list_users(
    identity: Identity,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let usecase = ListUsersUseCase {
        users: state.user_repo(),
    };
    let users = usecase
        .execute(identity.user_id, query.page_request())
        .await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

// ── GET /api/users/me ────────────────────────────────────────────────────────

pub async fn get_me(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let usecase = GetMeUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(identity.user_id).await?;
    Ok(Json(user.into()))
}

// ── PUT /api/users/me ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateMeRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub country: Option<String>,
    pub town: Option<String>,
}

pub async fn update_me(
    identity: Identity,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<UserResponse>, ApiError> {
    let body: UpdateMeRequest = parse_body(&body)?;
    let usecase = UpdateMeUseCase {
        users: state.user_repo(),
        hasher: state.hasher.clone(),
    };
    let user = usecase
        .execute(
            identity.user_id,
            UpdateMeInput {
                username: body.username,
                email: body.email,
                password: body.password,
                phone_number: body.phone_number,
                country: body.country,
                town: body.town,
            },
        )
        .await?;
    Ok(Json(user.into()))
}

// ── GET /api/users/{id} ──────────────────────────────────────────────────────

pub async fn get_user(
    identity: Identity,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let usecase = GetUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(identity.user_id, user_id).await?;
    Ok(Json(user.into()))
}

// ── POST /api/users/{id}/avatar ──────────────────────────────────────────────

#[derive(Serialize)]
pub struct AvatarResponse {
    pub avatar: String,
}

pub async fn set_avatar(
    identity: Identity,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AvatarResponse>, ApiError> {
    let usecase = SetAvatarUseCase {
        users: state.user_repo(),
        uploads: state.uploads.clone(),
    };
    let user = usecase.authorize(identity.user_id, user_id).await?;
    let file = multipart_file(multipart).await?;
    let user = usecase
        .execute(user, file.file_name.as_deref(), file.data)
        .await?;
    Ok(Json(AvatarResponse {
        avatar: user.avatar_or_default().to_owned(),
    }))
}
