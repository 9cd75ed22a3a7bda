//! Integration tests for subscriptions

mod common;

use common::{database::*, fixtures::*};
use eventsphere::error::ServiceError;
use eventsphere::orm::subscriptions;
use eventsphere::orm::users::Role;
use eventsphere::{subscription, user};
use sea_orm::{entity::*, query::*, PaginatorTrait};

#[actix_rt::test]
async fn self_subscription_is_rejected() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");

    let alice = create_test_user(&db, "alice@example.com", Role::User)
        .await
        .expect("Failed to create user");

    let err = subscription::subscribe(&db, alice.id, alice.id)
        .await
        .expect_err("Self-subscription should be rejected");
    assert!(matches!(err, ServiceError::InvalidRequest(_)));
}

#[actix_rt::test]
async fn duplicate_subscription_conflicts() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");

    let alice = create_test_user(&db, "alice@example.com", Role::User)
        .await
        .expect("Failed to create user");
    let bob = create_test_user(&db, "bob@example.com", Role::User)
        .await
        .expect("Failed to create user");

    let edge = subscription::subscribe(&db, alice.id, bob.id)
        .await
        .expect("Subscribe failed");
    assert_eq!(edge.follower_id, alice.id);
    assert_eq!(edge.followee_id, bob.id);

    let err = subscription::subscribe(&db, alice.id, bob.id)
        .await
        .expect_err("Duplicate subscription should conflict");
    assert!(matches!(err, ServiceError::Conflict(_)));

    // The reverse direction is a different edge and is allowed.
    subscription::subscribe(&db, bob.id, alice.id)
        .await
        .expect("Reverse subscription failed");
}

#[actix_rt::test]
async fn duplicate_insert_loses_to_the_unique_constraint() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");

    let alice = create_test_user(&db, "alice@example.com", Role::User)
        .await
        .expect("Failed to create user");
    let bob = create_test_user(&db, "bob@example.com", Role::User)
        .await
        .expect("Failed to create user");

    subscription::subscribe(&db, alice.id, bob.id)
        .await
        .expect("Subscribe failed");

    // A racing request that missed the pre-check is stopped here.
    let result = subscriptions::ActiveModel {
        follower_id: Set(alice.id),
        followee_id: Set(bob.id),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&db)
    .await;
    assert!(result.is_err());
}

#[actix_rt::test]
async fn subscribing_to_a_missing_user_is_not_found() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");

    let alice = create_test_user(&db, "alice@example.com", Role::User)
        .await
        .expect("Failed to create user");

    let err = subscription::subscribe(&db, alice.id, 9999)
        .await
        .expect_err("Subscribing to a missing user should fail");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[actix_rt::test]
async fn unsubscribe_is_idempotent() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");

    let alice = create_test_user(&db, "alice@example.com", Role::User)
        .await
        .expect("Failed to create user");
    let bob = create_test_user(&db, "bob@example.com", Role::User)
        .await
        .expect("Failed to create user");

    // Nothing to remove, still success.
    subscription::unsubscribe(&db, alice.id, bob.id)
        .await
        .expect("Unsubscribe of a missing edge should succeed");

    subscription::subscribe(&db, alice.id, bob.id)
        .await
        .expect("Subscribe failed");
    subscription::unsubscribe(&db, alice.id, bob.id)
        .await
        .expect("Unsubscribe failed");
    subscription::unsubscribe(&db, alice.id, bob.id)
        .await
        .expect("Second unsubscribe should also succeed");

    let edges = subscriptions::Entity::find()
        .count(&db)
        .await
        .expect("Count failed");
    assert_eq!(edges, 0);
}

#[actix_rt::test]
async fn deleting_a_user_cascades_both_edge_directions() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");

    let alice = create_test_user(&db, "alice@example.com", Role::User)
        .await
        .expect("Failed to create user");
    let bob = create_test_user(&db, "bob@example.com", Role::User)
        .await
        .expect("Failed to create user");
    let carol = create_test_user(&db, "carol@example.com", Role::User)
        .await
        .expect("Failed to create user");

    subscription::subscribe(&db, alice.id, bob.id)
        .await
        .expect("Subscribe failed");
    subscription::subscribe(&db, carol.id, alice.id)
        .await
        .expect("Subscribe failed");

    user::delete(&db, alice.id).await.expect("Delete failed");

    let edges = subscriptions::Entity::find()
        .count(&db)
        .await
        .expect("Count failed");
    assert_eq!(edges, 0);
}

#[actix_rt::test]
async fn following_and_follower_listings_are_direction_aware() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");

    let alice = create_test_user(&db, "alice@example.com", Role::User)
        .await
        .expect("Failed to create user");
    let bob = create_test_user(&db, "bob@example.com", Role::User)
        .await
        .expect("Failed to create user");
    let carol = create_test_user(&db, "carol@example.com", Role::User)
        .await
        .expect("Failed to create user");

    subscription::subscribe(&db, alice.id, bob.id)
        .await
        .expect("Subscribe failed");
    subscription::subscribe(&db, carol.id, bob.id)
        .await
        .expect("Subscribe failed");

    let bob_followers = subscription::list_followers(&db, bob.id, 0, 100)
        .await
        .expect("Listing failed");
    assert_eq!(bob_followers.len(), 2);

    let alice_following = subscription::list_following(&db, alice.id, 0, 100)
        .await
        .expect("Listing failed");
    assert_eq!(alice_following.len(), 1);
    assert_eq!(alice_following[0].followee_id, bob.id);

    let err = subscription::list_following(&db, 9999, 0, 100)
        .await
        .expect_err("Listing for a missing user should 404");
    assert!(matches!(err, ServiceError::NotFound(_)));
}
