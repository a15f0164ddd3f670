use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
    TransactionTrait, sea_query::OnConflict,
};
use uuid::Uuid;

use hbnb_api_schema::{
    amenities, place_amenities, place_images, places, reservations, reviews, users,
};
use hbnb_domain::pagination::{PageRequest, Sort};
use hbnb_domain::rating::Rating;
use hbnb_domain::stay::Stay;

use crate::domain::repository::{
    AmenityRepository, ImageRepository, PlaceRepository, ReservationRepository,
    ReviewRepository, UserRepository,
};
use crate::domain::types::{
    Amenity, AuthoredReview, DEFAULT_AVATAR, Place, PlaceImage, PlaceSortBy, Reservation,
    Review, User,
};
use crate::error::ApiError;

/// Constraint detail of a unique violation, if `err` is one.
fn unique_violation(err: &DbErr) -> Option<String> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => Some(detail),
        _ => None,
    }
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

/// Map a unique violation on `users` to the matching conflict.
fn user_conflict(err: DbErr, action: &'static str) -> ApiError {
    match unique_violation(&err) {
        Some(detail) if detail.contains("email") => ApiError::EmailTaken,
        Some(detail) if detail.contains("phone_number") => ApiError::PhoneTaken,
        Some(detail) if detail.contains("username") => ApiError::UsernameTaken,
        _ => ApiError::Internal(anyhow::Error::new(err).context(action)),
    }
}

impl DbUserRepository {
    async fn find_one_by(
        &self,
        column: users::Column,
        value: &str,
    ) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(column.eq(value))
            .one(&self.db)
            .await
            .context("find user")?;
        Ok(model.map(user_from_model))
    }
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        self.find_one_by(users::Column::Email, email).await
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, ApiError> {
        self.find_one_by(users::Column::PhoneNumber, phone_number)
            .await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        self.find_one_by(users::Column::Username, username).await
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<User>, ApiError> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .order_by_asc(users::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list users")?;
        Ok(models.into_iter().map(user_from_model).collect())
    }

    async fn create(&self, user: &User) -> Result<(), ApiError> {
        user_active_model(user)
            .insert(&self.db)
            .await
            .map_err(|e| user_conflict(e, "create user"))?;
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), ApiError> {
        user_active_model(user)
            .update(&self.db)
            .await
            .map_err(|e| user_conflict(e, "update user"))?;
        Ok(())
    }
}

fn user_active_model(user: &User) -> users::ActiveModel {
    users::ActiveModel {
        id: Set(user.id),
        username: Set(user.username.clone()),
        email: Set(user.email.clone()),
        password_hash: Set(user.password_hash.clone()),
        phone_number: Set(user.phone_number.clone()),
        country: Set(user.country.clone()),
        town: Set(user.town.clone()),
        is_admin: Set(user.is_admin),
        avatar: Set(user.avatar.clone()),
        created_at: Set(user.created_at),
        updated_at: Set(user.updated_at),
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        password_hash: model.password_hash,
        phone_number: model.phone_number,
        country: model.country,
        town: model.town,
        is_admin: model.is_admin,
        avatar: model.avatar,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Place repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPlaceRepository {
    pub db: DatabaseConnection,
}

impl PlaceRepository for DbPlaceRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Place>, ApiError> {
        let model = places::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find place by id")?;
        Ok(model.map(place_from_model))
    }

    async fn list(&self, sort_by: PlaceSortBy, page: PageRequest) -> Result<Vec<Place>, ApiError> {
        let query = places::Entity::find();
        let query = match sort_by {
            PlaceSortBy::CreatedAt(Sort::Desc) => query.order_by_desc(places::Column::CreatedAt),
            PlaceSortBy::CreatedAt(Sort::Asc) => query.order_by_asc(places::Column::CreatedAt),
            PlaceSortBy::Price(Sort::Desc) => query.order_by_desc(places::Column::PriceByNight),
            PlaceSortBy::Price(Sort::Asc) => query.order_by_asc(places::Column::PriceByNight),
        };
        let models = query
            .order_by_asc(places::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list places")?;
        Ok(models.into_iter().map(place_from_model).collect())
    }

    async fn create(&self, place: &Place, amenity_ids: &[Uuid]) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let place = place.clone();
                let amenity_ids = amenity_ids.to_vec();
                Box::pin(async move {
                    place_active_model(&place).insert(txn).await?;
                    link_amenities(txn, place.id, &amenity_ids).await?;
                    Ok(())
                })
            })
            .await
            .context("create place with amenities")?;
        Ok(())
    }

    async fn update(&self, place: &Place, amenity_ids: Option<&[Uuid]>) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let place = place.clone();
                let amenity_ids = amenity_ids.map(<[Uuid]>::to_vec);
                Box::pin(async move {
                    place_active_model(&place).update(txn).await?;
                    if let Some(ids) = amenity_ids {
                        place_amenities::Entity::delete_many()
                            .filter(place_amenities::Column::PlaceId.eq(place.id))
                            .exec(txn)
                            .await?;
                        link_amenities(txn, place.id, &ids).await?;
                    }
                    Ok(())
                })
            })
            .await
            .context("update place")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), DbErr>(move |txn| {
                Box::pin(async move {
                    place_amenities::Entity::delete_many()
                        .filter(place_amenities::Column::PlaceId.eq(id))
                        .exec(txn)
                        .await?;
                    place_images::Entity::delete_many()
                        .filter(place_images::Column::PlaceId.eq(id))
                        .exec(txn)
                        .await?;
                    reviews::Entity::delete_many()
                        .filter(reviews::Column::PlaceId.eq(id))
                        .exec(txn)
                        .await?;
                    reservations::Entity::delete_many()
                        .filter(reservations::Column::PlaceId.eq(id))
                        .exec(txn)
                        .await?;
                    places::Entity::delete_by_id(id).exec(txn).await?;
                    Ok(())
                })
            })
            .await
            .context("delete place")?;
        Ok(())
    }

    async fn amenities_of(&self, place_ids: &[Uuid]) -> Result<Vec<(Uuid, Amenity)>, ApiError> {
        let rows = place_amenities::Entity::find()
            .filter(place_amenities::Column::PlaceId.is_in(place_ids.iter().copied()))
            .find_also_related(amenities::Entity)
            .order_by_asc(amenities::Column::Name)
            .all(&self.db)
            .await
            .context("list place amenities")?;
        Ok(rows
            .into_iter()
            .filter_map(|(link, amenity)| {
                amenity.map(|model| (link.place_id, amenity_from_model(model)))
            })
            .collect())
    }

    async fn attach_amenity(&self, place_id: Uuid, amenity_id: Uuid) -> Result<(), ApiError> {
        let link = place_amenities::ActiveModel {
            place_id: Set(place_id),
            amenity_id: Set(amenity_id),
        };
        place_amenities::Entity::insert(link)
            .on_conflict(
                OnConflict::columns([
                    place_amenities::Column::PlaceId,
                    place_amenities::Column::AmenityId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("attach amenity")?;
        Ok(())
    }
}

/// Link the place to those of `amenity_ids` that exist. Unknown ids are skipped.
async fn link_amenities(
    txn: &DatabaseTransaction,
    place_id: Uuid,
    amenity_ids: &[Uuid],
) -> Result<(), DbErr> {
    if amenity_ids.is_empty() {
        return Ok(());
    }
    let known = amenities::Entity::find()
        .filter(amenities::Column::Id.is_in(amenity_ids.iter().copied()))
        .all(txn)
        .await?;
    if known.is_empty() {
        return Ok(());
    }
    place_amenities::Entity::insert_many(known.into_iter().map(|amenity| {
        place_amenities::ActiveModel {
            place_id: Set(place_id),
            amenity_id: Set(amenity.id),
        }
    }))
    .exec_without_returning(txn)
    .await?;
    Ok(())
}

fn place_active_model(place: &Place) -> places::ActiveModel {
    places::ActiveModel {
        id: Set(place.id),
        owner_id: Set(place.owner_id),
        name: Set(place.name.clone()),
        description: Set(place.description.clone()),
        price_by_night: Set(place.price_by_night),
        location: Set(place.location.clone()),
        country: Set(place.country.clone()),
        town: Set(place.town.clone()),
        latitude: Set(place.latitude),
        longitude: Set(place.longitude),
        created_at: Set(place.created_at),
    }
}

fn place_from_model(model: places::Model) -> Place {
    Place {
        id: model.id,
        owner_id: model.owner_id,
        name: model.name,
        description: model.description,
        price_by_night: model.price_by_night,
        location: model.location,
        country: model.country,
        town: model.town,
        latitude: model.latitude,
        longitude: model.longitude,
        created_at: model.created_at,
    }
}

// ── Amenity repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAmenityRepository {
    pub db: DatabaseConnection,
}

impl AmenityRepository for DbAmenityRepository {
    async fn list(&self) -> Result<Vec<Amenity>, ApiError> {
        let models = amenities::Entity::find()
            .order_by_asc(amenities::Column::Name)
            .all(&self.db)
            .await
            .context("list amenities")?;
        Ok(models.into_iter().map(amenity_from_model).collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Amenity>, ApiError> {
        let model = amenities::Entity::find()
            .filter(amenities::Column::Name.eq(name))
            .one(&self.db)
            .await
            .context("find amenity by name")?;
        Ok(model.map(amenity_from_model))
    }

    async fn create(&self, amenity: &Amenity) -> Result<(), ApiError> {
        amenities::ActiveModel {
            id: Set(amenity.id),
            name: Set(amenity.name.clone()),
        }
        .insert(&self.db)
        .await
        .context("create amenity")?;
        Ok(())
    }
}

fn amenity_from_model(model: amenities::Model) -> Amenity {
    Amenity {
        id: model.id,
        name: model.name,
    }
}

// ── Image repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbImageRepository {
    pub db: DatabaseConnection,
}

impl ImageRepository for DbImageRepository {
    async fn list_by_places(&self, place_ids: &[Uuid]) -> Result<Vec<PlaceImage>, ApiError> {
        let models = place_images::Entity::find()
            .filter(place_images::Column::PlaceId.is_in(place_ids.iter().copied()))
            .order_by_asc(place_images::Column::CreatedAt)
            .order_by_asc(place_images::Column::Id)
            .all(&self.db)
            .await
            .context("list place images")?;
        Ok(models.into_iter().map(image_from_model).collect())
    }

    async fn find(&self, place_id: Uuid, image_id: Uuid) -> Result<Option<PlaceImage>, ApiError> {
        let model = place_images::Entity::find_by_id(image_id)
            .filter(place_images::Column::PlaceId.eq(place_id))
            .one(&self.db)
            .await
            .context("find place image")?;
        Ok(model.map(image_from_model))
    }

    async fn create(&self, image: &PlaceImage) -> Result<(), ApiError> {
        place_images::ActiveModel {
            id: Set(image.id),
            place_id: Set(image.place_id),
            url: Set(image.url.clone()),
            created_at: Set(image.created_at),
        }
        .insert(&self.db)
        .await
        .context("create place image")?;
        Ok(())
    }

    async fn update_url(&self, image_id: Uuid, url: &str) -> Result<(), ApiError> {
        place_images::ActiveModel {
            id: Set(image_id),
            url: Set(url.to_owned()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update place image url")?;
        Ok(())
    }

    async fn delete(&self, image_id: Uuid) -> Result<(), ApiError> {
        place_images::Entity::delete_by_id(image_id)
            .exec(&self.db)
            .await
            .context("delete place image")?;
        Ok(())
    }
}

fn image_from_model(model: place_images::Model) -> PlaceImage {
    PlaceImage {
        id: model.id,
        place_id: model.place_id,
        url: model.url,
        created_at: model.created_at,
    }
}

// ── Reservation repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbReservationRepository {
    pub db: DatabaseConnection,
}

impl ReservationRepository for DbReservationRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, ApiError> {
        let model = reservations::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find reservation by id")?;
        Ok(model.map(reservation_from_model).transpose()?)
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<Reservation>, ApiError> {
        let models = reservations::Entity::find()
            .order_by_desc(reservations::Column::CreatedAt)
            .order_by_desc(reservations::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list reservations")?;
        reservations_from_models(models)
    }

    async fn list_by_place(&self, place_id: Uuid) -> Result<Vec<Reservation>, ApiError> {
        let models = reservations::Entity::find()
            .filter(reservations::Column::PlaceId.eq(place_id))
            .order_by_asc(reservations::Column::StartAt)
            .all(&self.db)
            .await
            .context("list reservations by place")?;
        reservations_from_models(models)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Reservation>, ApiError> {
        let models = reservations::Entity::find()
            .filter(reservations::Column::UserId.eq(user_id))
            .order_by_asc(reservations::Column::StartAt)
            .all(&self.db)
            .await
            .context("list reservations by user")?;
        reservations_from_models(models)
    }

    async fn create(&self, reservation: &Reservation) -> Result<(), ApiError> {
        reservation_active_model(reservation)
            .insert(&self.db)
            .await
            .context("create reservation")?;
        Ok(())
    }

    async fn update(&self, reservation: &Reservation) -> Result<(), ApiError> {
        reservation_active_model(reservation)
            .update(&self.db)
            .await
            .context("update reservation")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        reservations::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete reservation")?;
        Ok(())
    }

    async fn has_ended_by(
        &self,
        user_id: Uuid,
        place_id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> Result<bool, ApiError> {
        let count = reservations::Entity::find()
            .filter(reservations::Column::UserId.eq(user_id))
            .filter(reservations::Column::PlaceId.eq(place_id))
            .filter(reservations::Column::EndAt.lte(cutoff))
            .count(&self.db)
            .await
            .context("count completed reservations")?;
        Ok(count > 0)
    }
}

fn reservation_active_model(reservation: &Reservation) -> reservations::ActiveModel {
    reservations::ActiveModel {
        id: Set(reservation.id),
        place_id: Set(reservation.place_id),
        user_id: Set(reservation.user_id),
        start_at: Set(reservation.stay.start()),
        end_at: Set(reservation.stay.end()),
        created_at: Set(reservation.created_at),
    }
}

fn reservation_from_model(model: reservations::Model) -> anyhow::Result<Reservation> {
    let stay = Stay::new(model.start_at, model.end_at)
        .with_context(|| format!("stored reservation {} has an invalid range", model.id))?;
    Ok(Reservation {
        id: model.id,
        place_id: model.place_id,
        user_id: model.user_id,
        stay,
        created_at: model.created_at,
    })
}

fn reservations_from_models(
    models: Vec<reservations::Model>,
) -> Result<Vec<Reservation>, ApiError> {
    Ok(models
        .into_iter()
        .map(reservation_from_model)
        .collect::<anyhow::Result<_>>()?)
}

// ── Review repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbReviewRepository {
    pub db: DatabaseConnection,
}

impl ReviewRepository for DbReviewRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthoredReview>, ApiError> {
        let row = reviews::Entity::find_by_id(id)
            .find_also_related(users::Entity)
            .one(&self.db)
            .await
            .context("find review by id")?;
        Ok(row
            .map(|(review, author)| authored_review_from_models(review, author))
            .transpose()?)
    }

    async fn list_by_place(&self, place_id: Uuid) -> Result<Vec<AuthoredReview>, ApiError> {
        let rows = reviews::Entity::find()
            .filter(reviews::Column::PlaceId.eq(place_id))
            .find_also_related(users::Entity)
            .order_by_desc(reviews::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list reviews by place")?;
        authored_reviews_from_rows(rows)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<AuthoredReview>, ApiError> {
        let rows = reviews::Entity::find()
            .filter(reviews::Column::UserId.eq(user_id))
            .find_also_related(users::Entity)
            .order_by_desc(reviews::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list reviews by user")?;
        authored_reviews_from_rows(rows)
    }

    async fn exists_for(&self, user_id: Uuid, place_id: Uuid) -> Result<bool, ApiError> {
        let count = reviews::Entity::find()
            .filter(reviews::Column::UserId.eq(user_id))
            .filter(reviews::Column::PlaceId.eq(place_id))
            .count(&self.db)
            .await
            .context("count reviews")?;
        Ok(count > 0)
    }

    async fn create(&self, review: &Review) -> Result<(), ApiError> {
        reviews::ActiveModel {
            id: Set(review.id),
            place_id: Set(review.place_id),
            user_id: Set(review.user_id),
            rating: Set(i16::from(review.rating)),
            comment: Set(review.comment.clone()),
            created_at: Set(review.created_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(_) => ApiError::AlreadyReviewed,
            None => ApiError::Internal(anyhow::Error::new(e).context("create review")),
        })?;
        Ok(())
    }

    async fn update(&self, review: &Review) -> Result<(), ApiError> {
        reviews::ActiveModel {
            id: Set(review.id),
            rating: Set(i16::from(review.rating)),
            comment: Set(review.comment.clone()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update review")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        reviews::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete review")?;
        Ok(())
    }
}

fn authored_review_from_models(
    review: reviews::Model,
    author: Option<users::Model>,
) -> anyhow::Result<AuthoredReview> {
    let rating = Rating::try_from(i64::from(review.rating))
        .with_context(|| format!("stored review {} has an invalid rating", review.id))?;
    let (user_name, user_photo) = match author {
        Some(user) => (
            user.username,
            user.avatar.unwrap_or_else(|| DEFAULT_AVATAR.to_owned()),
        ),
        None => ("Anonymous".to_owned(), DEFAULT_AVATAR.to_owned()),
    };
    Ok(AuthoredReview {
        review: Review {
            id: review.id,
            place_id: review.place_id,
            user_id: review.user_id,
            rating,
            comment: review.comment,
            created_at: review.created_at,
        },
        user_name,
        user_photo,
    })
}

fn authored_reviews_from_rows(
    rows: Vec<(reviews::Model, Option<users::Model>)>,
) -> Result<Vec<AuthoredReview>, ApiError> {
    Ok(rows
        .into_iter()
        .map(|(review, author)| authored_review_from_models(review, author))
        .collect::<anyhow::Result<_>>()?)
}
