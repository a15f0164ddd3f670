use bytes::Bytes;
use uuid::Uuid;

use hbnb_api::error::ApiError;
use hbnb_api::usecase::user::{
    GetUserUseCase, ListUsersUseCase, SetAvatarUseCase, UpdateMeInput, UpdateMeUseCase,
};
use hbnb_domain::pagination::PageRequest;

use crate::helpers::{MockUploadStore, MockUserRepo, PlainHasher, test_admin, test_user};

// ── Admin endpoints ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_forbid_user_listing_for_non_admin() {
    let user = test_user("jane");
    let usecase = ListUsersUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
    };
    let result = usecase.execute(user.id, PageRequest::default()).await;
    assert!(matches!(result, Err(ApiError::Forbidden)));
}

#[tokio::test]
async fn should_list_users_for_admin() {
    let admin = test_admin("root");
    let usecase = ListUsersUseCase {
        users: MockUserRepo::new(vec![admin.clone(), test_user("kim")]),
    };
    let users = usecase
        .execute(admin.id, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(users.len(), 2);
}

#[tokio::test]
async fn should_treat_deleted_actor_as_unauthenticated() {
    let usecase = ListUsersUseCase {
        users: MockUserRepo::empty(),
    };
    let result = usecase.execute(Uuid::now_v7(), PageRequest::default()).await;
    assert!(matches!(result, Err(ApiError::Unauthenticated)));
}

#[tokio::test]
async fn should_return_not_found_for_unknown_user() {
    let admin = test_admin("root");
    let usecase = GetUserUseCase {
        users: MockUserRepo::new(vec![admin.clone()]),
    };
    let result = usecase.execute(admin.id, Uuid::now_v7()).await;
    assert!(matches!(result, Err(ApiError::UserNotFound)));
}

// ── UpdateMeUseCase ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_email_owned_by_someone_else() {
    let me = test_user("leo");
    let other = test_user("mia");
    let usecase = UpdateMeUseCase {
        users: MockUserRepo::new(vec![me.clone(), other.clone()]),
        hasher: PlainHasher,
    };

    let result = usecase
        .execute(
            me.id,
            UpdateMeInput {
                email: Some(other.email.clone()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::EmailTaken)));
}

#[tokio::test]
async fn should_update_profile_and_rehash_password() {
    let me = test_user("nora");
    let users = MockUserRepo::new(vec![me.clone()]);
    let handle = users.users_handle();
    let usecase = UpdateMeUseCase {
        users,
        hasher: PlainHasher,
    };

    let updated = usecase
        .execute(
            me.id,
            UpdateMeInput {
                email: Some(me.email.clone()),
                town: Some("Nice".to_owned()),
                password: Some("new-pass".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.town, "Nice");
    assert_eq!(updated.password_hash, PlainHasher::encode("new-pass"));
    assert!(updated.updated_at >= me.updated_at);
    assert_eq!(handle.lock().unwrap()[0].town, "Nice");
}

#[tokio::test]
async fn should_reject_blank_username() {
    let me = test_user("otto");
    let usecase = UpdateMeUseCase {
        users: MockUserRepo::new(vec![me.clone()]),
        hasher: PlainHasher,
    };
    let result = usecase
        .execute(
            me.id,
            UpdateMeInput {
                username: Some("  ".to_owned()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

// ── SetAvatarUseCase ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_forbid_changing_someone_elses_avatar() {
    let me = test_user("pia");
    let other = test_user("quin");
    let usecase = SetAvatarUseCase {
        users: MockUserRepo::new(vec![me.clone(), other.clone()]),
        uploads: MockUploadStore::default(),
    };
    let result = usecase.authorize(me.id, other.id).await;
    assert!(matches!(result, Err(ApiError::Forbidden)));
}

#[tokio::test]
async fn should_store_avatar_and_save_its_path() {
    let me = test_user("rita");
    let uploads = MockUploadStore::default();
    let saved = uploads.saved_handle();
    let usecase = SetAvatarUseCase {
        users: MockUserRepo::new(vec![me.clone()]),
        uploads,
    };

    let user = usecase.authorize(me.id, me.id).await.unwrap();
    let user = usecase
        .execute(user, Some("me.png"), Bytes::from_static(b"png"))
        .await
        .unwrap();

    assert_eq!(user.avatar.as_deref(), Some("/uploads/test_me.png"));
    assert_eq!(saved.lock().unwrap().len(), 1);

    let result = usecase.execute(user, Some("empty.png"), Bytes::new()).await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}
