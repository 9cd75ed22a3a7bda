//! Integration tests for events: filtered listings, partial updates, and
//! the dependency-guarded delete

mod common;

use chrono::{Duration, Utc};
use common::{database::*, fixtures::*};
use eventsphere::error::ServiceError;
use eventsphere::event::{self, EventFilter, EventPatch};
use eventsphere::orm::participations::ParticipationStatus;
use eventsphere::orm::users::Role;
use eventsphere::participation;

#[actix_rt::test]
async fn creation_requires_an_existing_category_and_binds_the_author() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");

    let organizer = create_test_user(&db, "org@example.com", Role::Organizer)
        .await
        .expect("Failed to create organizer");

    let err = event::create(
        &db,
        organizer.id,
        "Orphan event",
        None,
        Utc::now().naive_utc(),
        9999,
    )
    .await
    .expect_err("Missing category should 404");
    assert!(matches!(err, ServiceError::NotFound(_)));

    let cat = create_test_category(&db, "Music")
        .await
        .expect("Failed to create category");
    let ev = create_test_event(&db, organizer.id, cat.id, "Concert")
        .await
        .expect("Failed to create event");
    assert_eq!(ev.author_id, organizer.id);
}

#[actix_rt::test]
async fn listings_filter_by_category_author_and_date_range() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");

    let organizer = create_test_user(&db, "org@example.com", Role::Organizer)
        .await
        .expect("Failed to create organizer");
    let other = create_test_user(&db, "other@example.com", Role::Organizer)
        .await
        .expect("Failed to create organizer");
    let music = create_test_category(&db, "Music")
        .await
        .expect("Failed to create category");
    let tech = create_test_category(&db, "Tech")
        .await
        .expect("Failed to create category");

    let now = Utc::now().naive_utc();
    event::create(&db, organizer.id, "Near concert", None, now + Duration::days(1), music.id)
        .await
        .expect("Create failed");
    event::create(&db, organizer.id, "Far concert", None, now + Duration::days(30), music.id)
        .await
        .expect("Create failed");
    event::create(&db, other.id, "Conference", None, now + Duration::days(10), tech.id)
        .await
        .expect("Create failed");

    let by_category = event::list(
        &db,
        &EventFilter {
            category_id: Some(music.id),
            ..Default::default()
        },
        0,
        100,
    )
    .await
    .expect("Listing failed");
    assert_eq!(by_category.len(), 2);
    // Newest event_date first.
    assert_eq!(by_category[0].title, "Far concert");

    let by_author = event::list(
        &db,
        &EventFilter {
            author_id: Some(other.id),
            ..Default::default()
        },
        0,
        100,
    )
    .await
    .expect("Listing failed");
    assert_eq!(by_author.len(), 1);
    assert_eq!(by_author[0].title, "Conference");

    let in_window = event::list(
        &db,
        &EventFilter {
            from: Some(now + Duration::days(5)),
            until: Some(now + Duration::days(15)),
            ..Default::default()
        },
        0,
        100,
    )
    .await
    .expect("Listing failed");
    assert_eq!(in_window.len(), 1);
    assert_eq!(in_window[0].title, "Conference");
}

#[actix_rt::test]
async fn partial_update_touches_only_supplied_fields() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");

    let organizer = create_test_user(&db, "org@example.com", Role::Organizer)
        .await
        .expect("Failed to create organizer");
    let cat = create_test_category(&db, "Music")
        .await
        .expect("Failed to create category");
    let ev = create_test_event(&db, organizer.id, cat.id, "Concert")
        .await
        .expect("Failed to create event");

    let updated = event::update(
        &db,
        ev.id,
        EventPatch {
            title: Some("Concert (rescheduled)".to_owned()),
            ..Default::default()
        },
    )
    .await
    .expect("Update failed");
    assert_eq!(updated.title, "Concert (rescheduled)");
    assert_eq!(updated.description, ev.description);
    assert_eq!(updated.event_date, ev.event_date);
    assert_eq!(updated.category_id, ev.category_id);

    let err = event::update(&db, ev.id, EventPatch::default())
        .await
        .expect_err("Empty patch should be rejected");
    assert!(matches!(err, ServiceError::InvalidRequest(_)));

    let err = event::update(
        &db,
        ev.id,
        EventPatch {
            category_id: Some(9999),
            ..Default::default()
        },
    )
    .await
    .expect_err("Moving to a missing category should 404");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[actix_rt::test]
async fn delete_is_guarded_by_referencing_rows() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");

    let organizer = create_test_user(&db, "org@example.com", Role::Organizer)
        .await
        .expect("Failed to create organizer");
    let alice = create_test_user(&db, "alice@example.com", Role::User)
        .await
        .expect("Failed to create user");
    let cat = create_test_category(&db, "Music")
        .await
        .expect("Failed to create category");
    let ev = create_test_event(&db, organizer.id, cat.id, "Concert")
        .await
        .expect("Failed to create event");

    participation::upsert(&db, alice.id, ev.id, ParticipationStatus::Going)
        .await
        .expect("Upsert failed");

    let err = event::delete(&db, ev.id)
        .await
        .expect_err("Delete should be refused while participations exist");
    match err {
        ServiceError::Conflict(msg) => assert!(
            msg.contains("participation"),
            "conflict should name the blocker: {msg}"
        ),
        other => panic!("Expected Conflict, got {other:?}"),
    }

    participation::remove(&db, alice.id, ev.id)
        .await
        .expect("Remove failed");
    event::delete(&db, ev.id)
        .await
        .expect("Delete should succeed once dependents are gone");

    let err = event::get_by_id(&db, ev.id)
        .await
        .expect_err("Deleted event should be gone");
    assert!(matches!(err, ServiceError::NotFound(_)));
}
