use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use hbnb_api::domain::types::{Amenity, PlaceChanges, PlaceImage, PlaceSortBy};
use hbnb_api::error::ApiError;
use hbnb_api::usecase::amenity::{AddPlaceAmenityUseCase, CreateAmenityUseCase};
use hbnb_api::usecase::image::{
    AddImageUseCase, DeleteImageUseCase, ImageSource, UpdateImageUseCase,
};
use hbnb_api::usecase::place::{
    CreatePlaceInput, CreatePlaceUseCase, DeletePlaceUseCase, GetPlaceUseCase,
    ListPlacesUseCase, UpdatePlaceUseCase,
};
use hbnb_domain::pagination::PageRequest;

use crate::helpers::{
    MockAmenityRepo, MockImageRepo, MockPlaceRepo, MockReviewRepo, MockUploadStore,
    MockUserRepo, test_admin, test_place, test_user,
};

fn amenity(name: &str) -> Amenity {
    Amenity {
        id: Uuid::now_v7(),
        name: name.to_owned(),
    }
}

// ── CreatePlaceUseCase ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_place_with_known_amenities_only() {
    let wifi = amenity("wifi");
    let places = MockPlaceRepo::with_catalog(vec![], vec![wifi.clone()]);
    let stored = places.places_handle();
    let usecase = CreatePlaceUseCase {
        places,
        images: MockImageRepo::empty(),
    };
    let owner = Uuid::now_v7();

    let listing = usecase
        .execute(
            owner,
            CreatePlaceInput {
                name: "Harbour studio".to_owned(),
                price_by_night: 75,
                amenity_ids: vec![wifi.id, Uuid::now_v7()],
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(listing.place.owner_id, owner);
    assert_eq!(listing.amenities, vec![wifi]);
    assert!(listing.images.is_empty());
    assert_eq!(stored.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_reject_negative_price_and_blank_name() {
    let usecase = CreatePlaceUseCase {
        places: MockPlaceRepo::new(vec![]),
        images: MockImageRepo::empty(),
    };

    let result = usecase
        .execute(
            Uuid::now_v7(),
            CreatePlaceInput {
                name: "Cheap".to_owned(),
                price_by_night: -1,
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::Validation(_))));

    let result = usecase
        .execute(
            Uuid::now_v7(),
            CreatePlaceInput {
                name: " ".to_owned(),
                price_by_night: 10,
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

// ── Get / list ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_not_found_for_unknown_place() {
    let usecase = GetPlaceUseCase {
        places: MockPlaceRepo::new(vec![]),
        images: MockImageRepo::empty(),
        reviews: MockReviewRepo::empty(),
    };
    let result = usecase.execute(Uuid::now_v7()).await;
    assert!(matches!(result, Err(ApiError::PlaceNotFound)));
}

#[tokio::test]
async fn should_attach_images_to_listed_places() {
    let place = test_place(Uuid::now_v7());
    let image = PlaceImage {
        id: Uuid::now_v7(),
        place_id: place.id,
        url: "https://img.hbnb.test/1.jpg".to_owned(),
        created_at: Utc::now(),
    };
    let usecase = ListPlacesUseCase {
        places: MockPlaceRepo::new(vec![place.clone(), test_place(Uuid::now_v7())]),
        images: MockImageRepo::new(vec![image.clone()]),
    };

    let listings = usecase
        .execute(PlaceSortBy::default(), PageRequest::default())
        .await
        .unwrap();

    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].images, vec![image]);
    assert!(listings[1].images.is_empty());
}

// ── Ownership ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_forbid_non_owner_update_before_reading_changes() {
    let place = test_place(Uuid::now_v7());
    let usecase = UpdatePlaceUseCase {
        places: MockPlaceRepo::new(vec![place.clone()]),
        images: MockImageRepo::empty(),
    };
    let result = usecase.authorize(Uuid::now_v7(), place.id).await;
    assert!(matches!(result, Err(ApiError::Forbidden)));
}

#[tokio::test]
async fn should_apply_owner_changes_and_replace_amenities() {
    let pool = amenity("pool");
    let place = test_place(Uuid::now_v7());
    let places = MockPlaceRepo::with_catalog(vec![place.clone()], vec![pool.clone()]);
    let links = places.links_handle();
    links.lock().unwrap().push((place.id, amenity("old")));
    let usecase = UpdatePlaceUseCase {
        places,
        images: MockImageRepo::empty(),
    };

    let current = usecase.authorize(place.owner_id, place.id).await.unwrap();
    let listing = usecase
        .execute(
            current,
            PlaceChanges {
                price_by_night: Some(150),
                amenity_ids: Some(vec![pool.id]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(listing.place.price_by_night, 150);
    assert_eq!(listing.place.name, place.name);
    assert_eq!(listing.amenities, vec![pool]);
}

#[tokio::test]
async fn should_forbid_non_owner_delete() {
    let place = test_place(Uuid::now_v7());
    let places = MockPlaceRepo::new(vec![place.clone()]);
    let stored = places.places_handle();
    let usecase = DeletePlaceUseCase { places };

    let result = usecase.execute(Uuid::now_v7(), place.id).await;
    assert!(matches!(result, Err(ApiError::Forbidden)));
    assert_eq!(stored.lock().unwrap().len(), 1);

    usecase.execute(place.owner_id, place.id).await.unwrap();
    assert!(stored.lock().unwrap().is_empty());
}

// ── Amenities ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_require_admin_for_amenity_catalog() {
    let user = test_user("sam");
    let usecase = CreateAmenityUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        amenities: MockAmenityRepo::empty(),
    };
    let result = usecase.execute(user.id, "sauna").await;
    assert!(matches!(result, Err(ApiError::Forbidden)));
}

#[tokio::test]
async fn should_return_existing_amenity_without_creating() {
    let admin = test_admin("root");
    let wifi = amenity("wifi");
    let amenities = MockAmenityRepo::new(vec![wifi.clone()]);
    let handle = amenities.amenities_handle();
    let usecase = CreateAmenityUseCase {
        users: MockUserRepo::new(vec![admin.clone()]),
        amenities,
    };

    let (found, created) = usecase.execute(admin.id, " wifi ").await.unwrap();
    assert_eq!(found, wifi);
    assert!(!created);

    let (_, created) = usecase.execute(admin.id, "sauna").await.unwrap();
    assert!(created);
    assert_eq!(handle.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn should_create_unknown_amenity_when_owner_adds_it() {
    let place = test_place(Uuid::now_v7());
    let amenities = MockAmenityRepo::empty();
    let catalog = amenities.amenities_handle();
    let usecase = AddPlaceAmenityUseCase {
        places: MockPlaceRepo::new(vec![place.clone()]),
        amenities,
    };

    assert!(matches!(
        usecase.authorize(Uuid::now_v7(), place.id).await,
        Err(ApiError::Forbidden)
    ));

    let owned = usecase.authorize(place.owner_id, place.id).await.unwrap();
    let linked = usecase.execute(&owned, "parking").await.unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(catalog.lock().unwrap()[0].name, "parking");
}

// ── Images ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_add_image_from_url_or_upload() {
    let place = test_place(Uuid::now_v7());
    let uploads = MockUploadStore::default();
    let saved = uploads.saved_handle();
    let usecase = AddImageUseCase {
        places: MockPlaceRepo::new(vec![place.clone()]),
        images: MockImageRepo::empty(),
        uploads,
    };
    let owned = usecase.authorize(place.owner_id, place.id).await.unwrap();

    let linked = usecase
        .execute(&owned, ImageSource::Url("https://img.hbnb.test/a.jpg".to_owned()))
        .await
        .unwrap();
    assert_eq!(linked.url, "https://img.hbnb.test/a.jpg");

    let uploaded = usecase
        .execute(
            &owned,
            ImageSource::Upload {
                file_name: Some("b.jpg".to_owned()),
                data: Bytes::from_static(b"jpeg"),
            },
        )
        .await
        .unwrap();
    assert_eq!(uploaded.url, "/uploads/test_b.jpg");
    assert_eq!(saved.lock().unwrap().len(), 1);

    let result = usecase.execute(&owned, ImageSource::Url("  ".to_owned())).await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn should_scope_images_to_their_place() {
    let owner = Uuid::now_v7();
    let place = test_place(owner);
    let other = test_place(owner);
    let image = PlaceImage {
        id: Uuid::now_v7(),
        place_id: other.id,
        url: "/uploads/x.jpg".to_owned(),
        created_at: Utc::now(),
    };
    let usecase = UpdateImageUseCase {
        places: MockPlaceRepo::new(vec![place.clone(), other.clone()]),
        images: MockImageRepo::new(vec![image.clone()]),
    };

    let result = usecase.authorize(owner, place.id, image.id).await;
    assert!(matches!(result, Err(ApiError::ImageNotFound)));

    let found = usecase.authorize(owner, other.id, image.id).await.unwrap();
    let updated = usecase.execute(found, "/uploads/y.jpg").await.unwrap();
    assert_eq!(updated.url, "/uploads/y.jpg");
}

#[tokio::test]
async fn should_forbid_non_owner_image_delete() {
    let place = test_place(Uuid::now_v7());
    let image = PlaceImage {
        id: Uuid::now_v7(),
        place_id: place.id,
        url: "/uploads/x.jpg".to_owned(),
        created_at: Utc::now(),
    };
    let images = MockImageRepo::new(vec![image.clone()]);
    let stored = images.images_handle();
    let usecase = DeleteImageUseCase {
        places: MockPlaceRepo::new(vec![place.clone()]),
        images,
    };

    let result = usecase.execute(Uuid::now_v7(), place.id, image.id).await;
    assert!(matches!(result, Err(ApiError::Forbidden)));

    usecase
        .execute(place.owner_id, place.id, image.id)
        .await
        .unwrap();
    assert!(stored.lock().unwrap().is_empty());
}
