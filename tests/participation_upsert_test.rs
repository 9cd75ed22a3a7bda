//! Integration tests for the participation upsert engine

mod common;

use common::{database::*, fixtures::*};
use eventsphere::error::ServiceError;
use eventsphere::orm::participations::{self, ParticipationStatus};
use eventsphere::orm::users::Role;
use eventsphere::participation;
use sea_orm::{entity::*, query::*, PaginatorTrait};

#[actix_rt::test]
async fn upsert_twice_keeps_a_single_row_with_the_latest_status() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");

    let user = create_test_user(&db, "alice@example.com", Role::User)
        .await
        .expect("Failed to create user");
    let organizer = create_test_user(&db, "org@example.com", Role::Organizer)
        .await
        .expect("Failed to create organizer");
    let cat = create_test_category(&db, "Music")
        .await
        .expect("Failed to create category");
    let event = create_test_event(&db, organizer.id, cat.id, "Concert")
        .await
        .expect("Failed to create event");

    let first = participation::upsert(&db, user.id, event.id, ParticipationStatus::Interested)
        .await
        .expect("First upsert failed");
    assert!(first.id > 0);
    assert_eq!(first.status, ParticipationStatus::Interested);

    let second = participation::upsert(&db, user.id, event.id, ParticipationStatus::Going)
        .await
        .expect("Second upsert failed");

    // Same row mutated in place, not a second row.
    assert_eq!(second.id, first.id);
    assert_eq!(second.status, ParticipationStatus::Going);
    assert_eq!(second.joined_at, first.joined_at);

    let rows = participations::Entity::find()
        .filter(participations::Column::UserId.eq(user.id))
        .filter(participations::Column::EventId.eq(event.id))
        .count(&db)
        .await
        .expect("Count failed");
    assert_eq!(rows, 1);
}

#[actix_rt::test]
async fn duplicate_insert_loses_to_the_unique_constraint() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");

    let user = create_test_user(&db, "bob@example.com", Role::User)
        .await
        .expect("Failed to create user");
    let organizer = create_test_user(&db, "org2@example.com", Role::Organizer)
        .await
        .expect("Failed to create organizer");
    let cat = create_test_category(&db, "Tech")
        .await
        .expect("Failed to create category");
    let event = create_test_event(&db, organizer.id, cat.id, "Meetup")
        .await
        .expect("Failed to create event");

    participation::upsert(&db, user.id, event.id, ParticipationStatus::Going)
        .await
        .expect("Upsert failed");

    // A racing request that missed the lookup ends up here: a raw insert
    // of the same pair must be rejected by the constraint.
    let result = participations::ActiveModel {
        user_id: Set(user.id),
        event_id: Set(event.id),
        status: Set(ParticipationStatus::NotGoing),
        joined_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&db)
    .await;
    assert!(result.is_err());
}

#[actix_rt::test]
async fn upsert_against_a_missing_event_is_not_found() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");

    let user = create_test_user(&db, "carol@example.com", Role::User)
        .await
        .expect("Failed to create user");

    let err = participation::upsert(&db, user.id, 9999, ParticipationStatus::Going)
        .await
        .expect_err("Upsert against missing event should fail");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[actix_rt::test]
async fn removing_a_missing_participation_is_not_found() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");

    let user = create_test_user(&db, "dave@example.com", Role::User)
        .await
        .expect("Failed to create user");
    let organizer = create_test_user(&db, "org3@example.com", Role::Organizer)
        .await
        .expect("Failed to create organizer");
    let cat = create_test_category(&db, "Food")
        .await
        .expect("Failed to create category");
    let event = create_test_event(&db, organizer.id, cat.id, "Tasting")
        .await
        .expect("Failed to create event");

    let err = participation::remove(&db, user.id, event.id)
        .await
        .expect_err("Removing a missing participation should 404");
    assert!(matches!(err, ServiceError::NotFound(_)));

    participation::upsert(&db, user.id, event.id, ParticipationStatus::Going)
        .await
        .expect("Upsert failed");
    participation::remove(&db, user.id, event.id)
        .await
        .expect("Remove failed");

    let rows = participations::Entity::find()
        .count(&db)
        .await
        .expect("Count failed");
    assert_eq!(rows, 0);
}
