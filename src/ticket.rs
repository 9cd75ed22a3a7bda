//! Tickets: one per (user, event), a stored price, no settlement logic.

use crate::error::{constraint_error, ServiceError, ServiceResult};
use crate::orm::{events, tickets};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{entity::*, query::*, DatabaseConnection, TransactionTrait};

pub async fn create(
    db: &DatabaseConnection,
    user_id: i32,
    event_id: i32,
    price: Decimal,
) -> ServiceResult<tickets::Model> {
    if price < Decimal::ZERO {
        return Err(ServiceError::InvalidRequest(
            "price cannot be negative".to_owned(),
        ));
    }

    let txn = db.begin().await?;

    events::Entity::find_by_id(event_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event {event_id} does not exist")))?;

    let existing = tickets::Entity::find()
        .filter(tickets::Column::UserId.eq(user_id))
        .filter(tickets::Column::EventId.eq(event_id))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(ServiceError::Conflict(
            "you already hold a ticket for this event".to_owned(),
        ));
    }

    let model = tickets::ActiveModel {
        user_id: Set(user_id),
        event_id: Set(event_id),
        price: Set(price),
        purchased_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|err| {
        constraint_error(
            err,
            "you already hold a ticket for this event",
            "event or user no longer exists",
        )
    })?;

    txn.commit().await?;
    Ok(model)
}

pub async fn get_by_id(db: &DatabaseConnection, id: i32) -> ServiceResult<tickets::Model> {
    tickets::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("ticket {id} does not exist")))
}

pub async fn delete(db: &DatabaseConnection, ticket_id: i32) -> ServiceResult<()> {
    let result = tickets::Entity::delete_by_id(ticket_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound(format!(
            "ticket {ticket_id} does not exist"
        )));
    }
    Ok(())
}

pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: i32,
    skip: u64,
    limit: u64,
) -> ServiceResult<Vec<tickets::Model>> {
    Ok(tickets::Entity::find()
        .filter(tickets::Column::UserId.eq(user_id))
        .order_by_desc(tickets::Column::PurchasedAt)
        .order_by_desc(tickets::Column::Id)
        .offset(skip)
        .limit(limit)
        .all(db)
        .await?)
}

pub async fn list_for_event(
    db: &DatabaseConnection,
    event_id: i32,
    skip: u64,
    limit: u64,
) -> ServiceResult<Vec<tickets::Model>> {
    events::Entity::find_by_id(event_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event {event_id} does not exist")))?;

    Ok(tickets::Entity::find()
        .filter(tickets::Column::EventId.eq(event_id))
        .order_by_desc(tickets::Column::PurchasedAt)
        .order_by_desc(tickets::Column::Id)
        .offset(skip)
        .limit(limit)
        .all(db)
        .await?)
}
