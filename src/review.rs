//! Event reviews, at most one per (author, event).
//!
//! Uniqueness is enforced by the composite unique index; the existence
//! pre-check only shortcuts the common case with a friendlier message.

use crate::error::{constraint_error, ServiceError, ServiceResult};
use crate::orm::{events, reviews};
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection, TransactionTrait};
use serde::Deserialize;

/// Allow-listed partial update: comment text and rating.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewPatch {
    pub comment: Option<String>,
    pub rating: Option<i32>,
}

impl ReviewPatch {
    pub fn is_empty(&self) -> bool {
        self.comment.is_none() && self.rating.is_none()
    }
}

fn check_rating(rating: i32) -> ServiceResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(ServiceError::InvalidRequest(
            "rating must be between 1 and 5".to_owned(),
        ));
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    event_id: i32,
    author_id: i32,
    comment: &str,
    rating: i32,
) -> ServiceResult<reviews::Model> {
    check_rating(rating)?;

    let txn = db.begin().await?;

    events::Entity::find_by_id(event_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event {event_id} does not exist")))?;

    let existing = reviews::Entity::find()
        .filter(reviews::Column::EventId.eq(event_id))
        .filter(reviews::Column::AuthorId.eq(author_id))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(ServiceError::Conflict(
            "you have already reviewed this event".to_owned(),
        ));
    }

    let model = reviews::ActiveModel {
        event_id: Set(event_id),
        author_id: Set(author_id),
        comment: Set(comment.to_owned()),
        rating: Set(rating),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|err| {
        constraint_error(
            err,
            "you have already reviewed this event",
            "event or author no longer exists",
        )
    })?;

    txn.commit().await?;
    Ok(model)
}

pub async fn get_by_id(db: &DatabaseConnection, id: i32) -> ServiceResult<reviews::Model> {
    reviews::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("review {id} does not exist")))
}

pub async fn update(
    db: &DatabaseConnection,
    review_id: i32,
    patch: ReviewPatch,
) -> ServiceResult<reviews::Model> {
    if patch.is_empty() {
        return Err(ServiceError::InvalidRequest("no fields to update".to_owned()));
    }
    if let Some(rating) = patch.rating {
        check_rating(rating)?;
    }

    let txn = db.begin().await?;

    let review = reviews::Entity::find_by_id(review_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("review {review_id} does not exist")))?;

    let mut active = review.into_active_model();
    if let Some(comment) = patch.comment {
        active.comment = Set(comment);
    }
    if let Some(rating) = patch.rating {
        active.rating = Set(rating);
    }
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

pub async fn delete(db: &DatabaseConnection, review_id: i32) -> ServiceResult<()> {
    let result = reviews::Entity::delete_by_id(review_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound(format!(
            "review {review_id} does not exist"
        )));
    }
    Ok(())
}

/// Reviews for an event, newest first, optionally bounded to a rating
/// range (inclusive).
pub async fn list_for_event(
    db: &DatabaseConnection,
    event_id: i32,
    min_rating: Option<i32>,
    max_rating: Option<i32>,
    skip: u64,
    limit: u64,
) -> ServiceResult<Vec<reviews::Model>> {
    events::Entity::find_by_id(event_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event {event_id} does not exist")))?;

    let mut select = reviews::Entity::find().filter(reviews::Column::EventId.eq(event_id));
    if let Some(min) = min_rating {
        select = select.filter(reviews::Column::Rating.gte(min));
    }
    if let Some(max) = max_rating {
        select = select.filter(reviews::Column::Rating.lte(max));
    }

    Ok(select
        .order_by_desc(reviews::Column::CreatedAt)
        .order_by_desc(reviews::Column::Id)
        .offset(skip)
        .limit(limit)
        .all(db)
        .await?)
}

pub async fn list_by_author(
    db: &DatabaseConnection,
    author_id: i32,
    skip: u64,
    limit: u64,
) -> ServiceResult<Vec<reviews::Model>> {
    Ok(reviews::Entity::find()
        .filter(reviews::Column::AuthorId.eq(author_id))
        .order_by_desc(reviews::Column::CreatedAt)
        .order_by_desc(reviews::Column::Id)
        .offset(skip)
        .limit(limit)
        .all(db)
        .await?)
}
