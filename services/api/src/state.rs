use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use hbnb_auth_types::identity::SessionSecret;

use crate::infra::cache::TwoFactorBackend;
use crate::infra::db::{
    DbAmenityRepository, DbImageRepository, DbPlaceRepository, DbReservationRepository,
    DbReviewRepository, DbUserRepository,
};
use crate::infra::mail::MailBackend;
use crate::infra::password::Argon2Hasher;
use crate::infra::storage::LocalUploadStore;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub two_factor: TwoFactorBackend,
    pub mailer: MailBackend,
    pub hasher: Argon2Hasher,
    pub uploads: LocalUploadStore,
    pub session_secret: SessionSecret,
}

impl FromRef<AppState> for SessionSecret {
    fn from_ref(state: &AppState) -> Self {
        state.session_secret.clone()
    }
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn place_repo(&self) -> DbPlaceRepository {
        DbPlaceRepository {
            db: self.db.clone(),
        }
    }

    pub fn amenity_repo(&self) -> DbAmenityRepository {
        DbAmenityRepository {
            db: self.db.clone(),
        }
    }

    pub fn image_repo(&self) -> DbImageRepository {
        DbImageRepository {
            db: self.db.clone(),
        }
    }

    pub fn reservation_repo(&self) -> DbReservationRepository {
        DbReservationRepository {
            db: self.db.clone(),
        }
    }

    pub fn review_repo(&self) -> DbReviewRepository {
        DbReviewRepository {
            db: self.db.clone(),
        }
    }
}
