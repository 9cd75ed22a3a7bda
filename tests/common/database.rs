//! Test database setup and management
#![allow(dead_code)]

use eventsphere::orm::{
    categories, comments, events, participations, reviews, subscriptions, tickets, users,
};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};

/// Builds a fresh in-memory SQLite database carrying the full schema.
///
/// Tables are generated from the entities (which brings the foreign keys
/// and their cascade rules along); the composite unique indexes the
/// engines rely on are created explicitly, since they live outside the
/// entity definitions. A single pooled connection keeps the in-memory
/// database alive for the whole test.
pub async fn setup_test_database() -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options.max_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await?;
    db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    // Parents before children, FK constraints are inline.
    db.execute(backend.build(&schema.create_table_from_entity(users::Entity)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(categories::Entity)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(events::Entity)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(participations::Entity)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(subscriptions::Entity)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(comments::Entity)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(reviews::Entity)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(tickets::Entity)))
        .await?;

    db.execute_unprepared(
        "CREATE UNIQUE INDEX uq_participations_user_event ON participations (user_id, event_id);",
    )
    .await?;
    db.execute_unprepared(
        "CREATE UNIQUE INDEX uq_subscriptions_follower_followee ON subscriptions (follower_id, followee_id);",
    )
    .await?;
    db.execute_unprepared(
        "CREATE UNIQUE INDEX uq_reviews_author_event ON reviews (author_id, event_id);",
    )
    .await?;
    db.execute_unprepared(
        "CREATE UNIQUE INDEX uq_tickets_user_event ON tickets (user_id, event_id);",
    )
    .await?;

    Ok(db)
}
