use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    routing::{get, post, put},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use hbnb_core::health::{database_ready, healthz};
use hbnb_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    amenity::{add_place_amenity, create_amenity, list_amenities, list_place_amenities},
    auth::{login, register, verify_two_factor},
    image::{add_image, delete_image, list_images, update_image},
    place::{create_place, delete_place, get_place, list_places, update_place},
    reservation::{
        create_reservation, delete_reservation, get_reservation, list_place_reservations,
        list_reservations, list_user_reservations, update_reservation,
    },
    review::{
        create_review, delete_review, get_review, list_place_reviews, list_user_reviews,
        update_review,
    },
    user::{get_me, get_user, list_users, set_avatar, update_me},
};
use crate::infra::storage::UPLOADS_PREFIX;
use crate::state::AppState;

/// Request body cap, sized for image uploads.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

async fn readyz(State(state): State<AppState>) -> StatusCode {
    database_ready(&state.db).await
}

/// CORS for the given origins; `None` allows any origin.
pub fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origins {
        None => layer.allow_origin(Any),
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin, "ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            layer.allow_origin(origins)
        }
    }
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/verify-2fa", post(verify_two_factor))
        // Users
        .route("/users", get(list_users))
        .route("/users/me", get(get_me).put(update_me))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/avatar", post(set_avatar))
        // Amenities
        .route("/amenities", get(list_amenities).post(create_amenity))
        // Places
        .route("/places", get(list_places).post(create_place))
        .route(
            "/places/{id}",
            get(get_place).put(update_place).delete(delete_place),
        )
        .route(
            "/places/{id}/amenities",
            get(list_place_amenities).post(add_place_amenity),
        )
        .route("/places/{id}/images", get(list_images).post(add_image))
        .route(
            "/places/{id}/images/{image_id}",
            put(update_image).delete(delete_image),
        )
        .route(
            "/places/{id}/reviews",
            get(list_place_reviews).post(create_review),
        )
        // Reviews
        .route(
            "/reviews/{id}",
            get(get_review).put(update_review).delete(delete_review),
        )
        .route("/reviews/user/{user_id}", get(list_user_reviews))
        // Reservations
        .route(
            "/reservations",
            get(list_reservations).post(create_reservation),
        )
        .route(
            "/reservations/{id}",
            get(get_reservation)
                .put(update_reservation)
                .delete(delete_reservation),
        )
        .route(
            "/reservations/place/{place_id}",
            get(list_place_reservations),
        )
        .route("/reservations/user/{user_id}", get(list_user_reservations))
}

pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let uploads = ServeDir::new(&state.uploads.dir);
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api", api_routes())
        .nest_service(UPLOADS_PREFIX, uploads)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
