use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

use hbnb_api::infra::cache::{MemoryTwoFactorStore, TwoFactorBackend};
use hbnb_api::infra::mail::{LogMailer, MailBackend};
use hbnb_api::infra::password::Argon2Hasher;
use hbnb_api::infra::storage::LocalUploadStore;
use hbnb_api::router::{build_router, cors_layer};
use hbnb_api::state::AppState;
use hbnb_auth_types::identity::SessionSecret;
use hbnb_testing::auth::{MockAuth, TEST_JWT_SECRET};

use crate::helpers::sqlite_db;

struct TestApp {
    server: TestServer,
    codes: MemoryTwoFactorStore,
}

async fn spawn_app() -> TestApp {
    let db = sqlite_db().await;
    let codes = MemoryTwoFactorStore::new();
    let uploads = std::env::temp_dir().join(format!("hbnb-router-{}", Uuid::now_v7()));
    let state = AppState {
        db,
        two_factor: TwoFactorBackend::Memory(codes.clone()),
        mailer: MailBackend::Log(LogMailer),
        hasher: Argon2Hasher::with_cost(1024, 1).unwrap(),
        uploads: LocalUploadStore::new(uploads),
        session_secret: SessionSecret::new(TEST_JWT_SECRET),
    };
    let server = TestServer::new(build_router(state, cors_layer(None))).unwrap();
    TestApp { server, codes }
}

impl TestApp {
    async fn register(&self, username: &str) -> Uuid {
        let response = self
            .server
            .post("/api/auth/register")
            .json(&json!({
                "username": username,
                "email": format!("{username}@hbnb.test"),
                "password": "hunter2",
                "phone_number": format!("+33-{username}"),
                "country": "France",
                "town": "Lyon",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        body["id"].as_str().unwrap().parse().unwrap()
    }

    async fn create_place(&self, owner: &MockAuth) -> String {
        let (name, value) = owner.header();
        let response = self
            .server
            .post("/api/places")
            .add_header(name, value)
            .json(&json!({ "name": "Canal loft", "price_by_night": 90 }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        body["id"].as_str().unwrap().to_owned()
    }

    /// Book `place_id` for the two hours before `end`.
    async fn book(&self, guest: &MockAuth, place_id: &str, end: DateTime<Utc>) {
        let (name, value) = guest.header();
        self.server
            .post("/api/reservations")
            .add_header(name, value)
            .json(&json!({
                "place_id": place_id,
                "start_datetime": (end - Duration::hours(2)).to_rfc3339(),
                "end_datetime": end.to_rfc3339(),
            }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    async fn review(&self, guest: &MockAuth, place_id: &str) -> StatusCode {
        let (name, value) = guest.header();
        self.server
            .post(&format!("/api/places/{place_id}/reviews"))
            .add_header(name, value)
            .json(&json!({ "rating": 4, "comment": "Quiet street" }))
            .await
            .status_code()
    }
}

#[tokio::test]
async fn should_answer_health_probes() {
    let app = spawn_app().await;
    app.server.get("/healthz").await.assert_status_ok();
    app.server.get("/readyz").await.assert_status_ok();
}

#[tokio::test]
async fn should_issue_session_token_after_two_factor_login() {
    let app = spawn_app().await;
    let user_id = app.register("alice").await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "alice@hbnb.test", "password": "hunter2" }))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["message"],
        "2FA code sent to your email"
    );

    let code = app.codes.pending_code("alice@hbnb.test").unwrap();
    let response = app
        .server
        .post("/api/auth/verify-2fa")
        .json(&json!({ "email": "alice@hbnb.test", "code": code }))
        .await;
    response.assert_status_ok();
    let token = response.json::<Value>()["access_token"]
        .as_str()
        .unwrap()
        .to_owned();

    let me = app
        .server
        .get("/api/users/me")
        .authorization_bearer(token)
        .await;
    me.assert_status_ok();
    let me: Value = me.json();
    assert_eq!(me["id"], user_id.to_string());
    assert!(me.get("password_hash").is_none());

    // Codes are single use.
    let replay = app
        .server
        .post("/api/auth/verify-2fa")
        .json(&json!({ "email": "alice@hbnb.test", "code": code }))
        .await;
    replay.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_reject_wrong_password_without_sending_code() {
    let app = spawn_app().await;
    app.register("bob").await;

    app.server
        .post("/api/auth/login")
        .json(&json!({ "email": "bob@hbnb.test", "password": "nope" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    assert!(app.codes.pending_code("bob@hbnb.test").is_none());
}

#[tokio::test]
async fn should_require_token_for_protected_routes() {
    let app = spawn_app().await;
    let response = app.server.get("/api/users/me").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["kind"], "UNAUTHENTICATED");

    app.server
        .post("/api/places")
        .json(&json!({ "name": "x", "price_by_night": 1 }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_check_ownership_before_reading_body() {
    let app = spawn_app().await;
    let owner = MockAuth::new(app.register("owner").await);
    let stranger = MockAuth::new(app.register("stranger").await);
    let place_id = app.create_place(&owner).await;

    let (name, value) = stranger.header();
    let response = app
        .server
        .put(&format!("/api/places/{place_id}"))
        .add_header(name, value)
        .text("{not json")
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let (name, value) = owner.header();
    let response = app
        .server
        .put(&format!("/api/places/{place_id}"))
        .add_header(name, value)
        .json(&json!({ "price_by_night": 120 }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["price_by_night"], 120);
}

#[tokio::test]
async fn should_allow_review_after_past_stay_only_once() {
    let app = spawn_app().await;
    let owner = MockAuth::new(app.register("host").await);
    let guest = MockAuth::new(app.register("guest").await);
    let place_id = app.create_place(&owner).await;

    let (name, value) = guest.header();
    app.server
        .post(&format!("/api/places/{place_id}/reviews"))
        .add_header(name.clone(), value.clone())
        .json(&json!({ "rating": 5, "comment": "Great" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .post("/api/reservations")
        .add_header(name.clone(), value.clone())
        .json(&json!({
            "place_id": place_id,
            "start_datetime": "2024-01-01T10:00:00",
            "end_datetime": "2024-01-03T10:00:00",
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = app
        .server
        .post(&format!("/api/places/{place_id}/reviews"))
        .add_header(name.clone(), value.clone())
        .json(&json!({ "rating": 5, "comment": "Great" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let review: Value = response.json();
    assert_eq!(review["rating"], 5);
    assert_eq!(review["user_name"], "guest");

    app.server
        .post(&format!("/api/places/{place_id}/reviews"))
        .add_header(name, value)
        .json(&json!({ "rating": 4, "comment": "Again" }))
        .await
        .assert_status(StatusCode::CONFLICT);

    let reviews: Value = app
        .server
        .get(&format!("/api/places/{place_id}/reviews"))
        .await
        .json();
    assert_eq!(reviews.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn should_reject_reservation_ending_before_start() {
    let app = spawn_app().await;
    let owner = MockAuth::new(app.register("lender").await);
    let place_id = app.create_place(&owner).await;

    let (name, value) = owner.header();
    let response = app
        .server
        .post("/api/reservations")
        .add_header(name, value)
        .json(&json!({
            "place_id": place_id,
            "start_datetime": "2024-01-03T10:00:00",
            "end_datetime": "2024-01-01T10:00:00",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "VALIDATION");
}

#[tokio::test]
async fn should_add_image_by_url_and_refuse_other_media_types() {
    let app = spawn_app().await;
    let owner = MockAuth::new(app.register("photog").await);
    let place_id = app.create_place(&owner).await;
    let (name, value) = owner.header();

    let response = app
        .server
        .post(&format!("/api/places/{place_id}/images"))
        .add_header(name.clone(), value.clone())
        .json(&json!({ "url": "https://img.hbnb.test/front.jpg" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(
        response.json::<Value>()["url"],
        "https://img.hbnb.test/front.jpg"
    );

    app.server
        .post(&format!("/api/places/{place_id}/images"))
        .add_header(name, value)
        .text("https://img.hbnb.test/back.jpg")
        .await
        .assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let images: Value = app
        .server
        .get(&format!("/api/places/{place_id}/images"))
        .await
        .json();
    assert_eq!(images.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn should_return_not_found_for_unknown_place() {
    let app = spawn_app().await;
    let response = app
        .server
        .get(&format!("/api/places/{}", Uuid::now_v7()))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["kind"], "PLACE_NOT_FOUND");
}

#[tokio::test]
async fn should_gate_reviews_on_grace_window_after_checkout() {
    let app = spawn_app().await;
    let owner = MockAuth::new(app.register("harbor").await);
    let place_id = app.create_place(&owner).await;
    let now = Utc::now();

    let just_left = MockAuth::new(app.register("justleft").await);
    app.book(&just_left, &place_id, now - Duration::minutes(10)).await;
    assert_eq!(app.review(&just_left, &place_id).await, StatusCode::FORBIDDEN);

    let staying = MockAuth::new(app.register("staying").await);
    app.book(&staying, &place_id, now + Duration::hours(1)).await;
    assert_eq!(app.review(&staying, &place_id).await, StatusCode::FORBIDDEN);

    let gone = MockAuth::new(app.register("gone").await);
    app.book(&gone, &place_id, now - Duration::minutes(16)).await;
    assert_eq!(app.review(&gone, &place_id).await, StatusCode::CREATED);
}
