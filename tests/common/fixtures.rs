//! Shared fixtures for integration tests
#![allow(dead_code)]

use chrono::{Duration, Utc};
use eventsphere::error::ServiceResult;
use eventsphere::orm::users::Role;
use eventsphere::orm::{categories, events, users};
use eventsphere::{category, event, user};
use sea_orm::DatabaseConnection;

pub const TEST_PASSWORD: &str = "password123";

pub async fn create_test_user(
    db: &DatabaseConnection,
    email: &str,
    role: Role,
) -> ServiceResult<users::Model> {
    user::create(db, email, TEST_PASSWORD, None, None, role, true).await
}

pub async fn create_inactive_user(
    db: &DatabaseConnection,
    email: &str,
) -> ServiceResult<users::Model> {
    user::create(db, email, TEST_PASSWORD, None, None, Role::User, false).await
}

pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
) -> ServiceResult<categories::Model> {
    category::create(db, name).await
}

/// An event a week out, authored by `author_id`.
pub async fn create_test_event(
    db: &DatabaseConnection,
    author_id: i32,
    category_id: i32,
    title: &str,
) -> ServiceResult<events::Model> {
    event::create(
        db,
        author_id,
        title,
        Some("fixture event".to_owned()),
        (Utc::now() + Duration::days(7)).naive_utc(),
        category_id,
    )
    .await
}
