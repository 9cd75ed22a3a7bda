//! Events: filtered listings, organizer-gated creation with forced
//! authorship, allow-listed partial updates, and the dependency-guarded
//! delete.

use crate::error::{constraint_error, ServiceError, ServiceResult};
use crate::orm::{categories, comments, events, participations, reviews, tickets};
use chrono::{NaiveDateTime, Utc};
use sea_orm::{entity::*, query::*, DatabaseConnection, PaginatorTrait, TransactionTrait};
use serde::Deserialize;

/// Listing filters. All optional; date bounds are inclusive.
#[derive(Debug, Default)]
pub struct EventFilter {
    pub category_id: Option<i32>,
    pub author_id: Option<i32>,
    pub from: Option<NaiveDateTime>,
    pub until: Option<NaiveDateTime>,
}

/// Allow-listed partial update: title, description, event_date,
/// category_id. Authorship is immutable.
#[derive(Debug, Default, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<NaiveDateTime>,
    pub category_id: Option<i32>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.event_date.is_none()
            && self.category_id.is_none()
    }
}

pub async fn get_by_id(db: &DatabaseConnection, id: i32) -> ServiceResult<events::Model> {
    events::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event {id} does not exist")))
}

pub async fn list(
    db: &DatabaseConnection,
    filter: &EventFilter,
    skip: u64,
    limit: u64,
) -> ServiceResult<Vec<events::Model>> {
    let mut select = events::Entity::find();
    if let Some(category_id) = filter.category_id {
        select = select.filter(events::Column::CategoryId.eq(category_id));
    }
    if let Some(author_id) = filter.author_id {
        select = select.filter(events::Column::AuthorId.eq(author_id));
    }
    if let Some(from) = filter.from {
        select = select.filter(events::Column::EventDate.gte(from));
    }
    if let Some(until) = filter.until {
        select = select.filter(events::Column::EventDate.lte(until));
    }

    Ok(select
        .order_by_desc(events::Column::EventDate)
        .offset(skip)
        .limit(limit)
        .all(db)
        .await?)
}

/// Creates an event authored by `author_id`, which callers must take from
/// the authenticated principal, never from the payload.
pub async fn create(
    db: &DatabaseConnection,
    author_id: i32,
    title: &str,
    description: Option<String>,
    event_date: NaiveDateTime,
    category_id: i32,
) -> ServiceResult<events::Model> {
    categories::Entity::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("category {category_id} does not exist")))?;

    events::ActiveModel {
        title: Set(title.to_owned()),
        description: Set(description),
        event_date: Set(event_date),
        category_id: Set(category_id),
        author_id: Set(author_id),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|err| {
        constraint_error(
            err,
            "event already exists",
            "category or author no longer exists",
        )
    })
}

pub async fn update(
    db: &DatabaseConnection,
    event_id: i32,
    patch: EventPatch,
) -> ServiceResult<events::Model> {
    if patch.is_empty() {
        return Err(ServiceError::InvalidRequest("no fields to update".to_owned()));
    }

    let txn = db.begin().await?;

    let event = events::Entity::find_by_id(event_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event {event_id} does not exist")))?;

    if let Some(category_id) = patch.category_id {
        categories::Entity::find_by_id(category_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("category {category_id} does not exist"))
            })?;
    }

    let mut active = event.into_active_model();
    if let Some(title) = patch.title {
        active.title = Set(title);
    }
    if let Some(description) = patch.description {
        active.description = Set(Some(description));
    }
    if let Some(event_date) = patch.event_date {
        active.event_date = Set(event_date);
    }
    if let Some(category_id) = patch.category_id {
        active.category_id = Set(category_id);
    }

    let updated = active
        .update(&txn)
        .await
        .map_err(|err| constraint_error(err, "event already exists", "category no longer exists"))?;

    txn.commit().await?;
    Ok(updated)
}

/// Refuses deletion while participations, tickets, comments, or reviews
/// still reference the event, mirroring the category guard.
pub async fn delete(db: &DatabaseConnection, event_id: i32) -> ServiceResult<()> {
    let txn = db.begin().await?;

    events::Entity::find_by_id(event_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event {event_id} does not exist")))?;

    let participation_count = participations::Entity::find()
        .filter(participations::Column::EventId.eq(event_id))
        .count(&txn)
        .await?;
    let ticket_count = tickets::Entity::find()
        .filter(tickets::Column::EventId.eq(event_id))
        .count(&txn)
        .await?;
    let comment_count = comments::Entity::find()
        .filter(comments::Column::EventId.eq(event_id))
        .count(&txn)
        .await?;
    let review_count = reviews::Entity::find()
        .filter(reviews::Column::EventId.eq(event_id))
        .count(&txn)
        .await?;

    let mut blockers = Vec::new();
    if participation_count > 0 {
        blockers.push(format!("{participation_count} participation(s)"));
    }
    if ticket_count > 0 {
        blockers.push(format!("{ticket_count} ticket(s)"));
    }
    if comment_count > 0 {
        blockers.push(format!("{comment_count} comment(s)"));
    }
    if review_count > 0 {
        blockers.push(format!("{review_count} review(s)"));
    }
    if !blockers.is_empty() {
        return Err(ServiceError::Conflict(format!(
            "event is still referenced by {}",
            blockers.join(", ")
        )));
    }

    events::Entity::delete_by_id(event_id).exec(&txn).await?;
    txn.commit().await?;
    Ok(())
}
