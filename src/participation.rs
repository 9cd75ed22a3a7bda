//! Participation upsert engine.
//!
//! One row per (user, event), enforced by the composite unique index. The
//! lookup-then-write happens inside a single transaction; when two
//! requests race past the lookup, the constraint decides the winner and
//! the loser surfaces as `Conflict`.

use crate::error::{constraint_error, ServiceError, ServiceResult};
use crate::orm::participations::ParticipationStatus;
use crate::orm::{events, participations};
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection, TransactionTrait};

/// Sets the caller's status for an event, creating the row when absent and
/// mutating `status` in place when present. Returns the stored row with
/// its server-assigned fields.
pub async fn upsert(
    db: &DatabaseConnection,
    user_id: i32,
    event_id: i32,
    status: ParticipationStatus,
) -> ServiceResult<participations::Model> {
    let txn = db.begin().await?;

    events::Entity::find_by_id(event_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event {event_id} does not exist")))?;

    let existing = participations::Entity::find()
        .filter(participations::Column::UserId.eq(user_id))
        .filter(participations::Column::EventId.eq(event_id))
        .one(&txn)
        .await?;

    let model = match existing {
        Some(row) => {
            let mut active = row.into_active_model();
            active.status = Set(status);
            active.update(&txn).await?
        }
        None => participations::ActiveModel {
            user_id: Set(user_id),
            event_id: Set(event_id),
            status: Set(status),
            joined_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|err| {
            constraint_error(
                err,
                "participation was created concurrently",
                "event or user no longer exists",
            )
        })?,
    };

    txn.commit().await?;
    Ok(model)
}

pub async fn get_by_id(db: &DatabaseConnection, id: i32) -> ServiceResult<participations::Model> {
    participations::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("participation {id} does not exist")))
}

/// Removes the caller's participation row. Missing rows 404, the
/// delete-by-id convention; contrast with `subscription::unsubscribe`.
pub async fn remove(db: &DatabaseConnection, user_id: i32, event_id: i32) -> ServiceResult<()> {
    let result = participations::Entity::delete_many()
        .filter(participations::Column::UserId.eq(user_id))
        .filter(participations::Column::EventId.eq(event_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound(
            "no participation for this event".to_owned(),
        ));
    }
    Ok(())
}

pub async fn delete_by_id(db: &DatabaseConnection, id: i32) -> ServiceResult<()> {
    let result = participations::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound(format!(
            "participation {id} does not exist"
        )));
    }
    Ok(())
}

pub async fn list_for_event(
    db: &DatabaseConnection,
    event_id: i32,
    skip: u64,
    limit: u64,
) -> ServiceResult<Vec<participations::Model>> {
    events::Entity::find_by_id(event_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event {event_id} does not exist")))?;

    Ok(participations::Entity::find()
        .filter(participations::Column::EventId.eq(event_id))
        .order_by_desc(participations::Column::JoinedAt)
        .offset(skip)
        .limit(limit)
        .all(db)
        .await?)
}

pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: i32,
    skip: u64,
    limit: u64,
) -> ServiceResult<Vec<participations::Model>> {
    Ok(participations::Entity::find()
        .filter(participations::Column::UserId.eq(user_id))
        .order_by_desc(participations::Column::JoinedAt)
        .offset(skip)
        .limit(limit)
        .all(db)
        .await?)
}
