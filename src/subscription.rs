//! User-to-user subscriptions: a directed follower -> followee edge.
//!
//! Subscribe conflicts on a duplicate edge; unsubscribe is deliberately
//! idempotent, unlike the delete-by-id endpoints elsewhere.

use crate::error::{constraint_error, ServiceError, ServiceResult};
use crate::orm::{subscriptions, users};
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection, TransactionTrait};

pub async fn subscribe(
    db: &DatabaseConnection,
    follower_id: i32,
    followee_id: i32,
) -> ServiceResult<subscriptions::Model> {
    if follower_id == followee_id {
        return Err(ServiceError::InvalidRequest(
            "cannot subscribe to yourself".to_owned(),
        ));
    }

    let txn = db.begin().await?;

    users::Entity::find_by_id(followee_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("user {followee_id} does not exist")))?;

    // Fast path for a friendlier message; the unique index is what
    // actually enforces the invariant.
    let existing = subscriptions::Entity::find()
        .filter(subscriptions::Column::FollowerId.eq(follower_id))
        .filter(subscriptions::Column::FolloweeId.eq(followee_id))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(ServiceError::Conflict("already subscribed".to_owned()));
    }

    let model = subscriptions::ActiveModel {
        follower_id: Set(follower_id),
        followee_id: Set(followee_id),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|err| constraint_error(err, "already subscribed", "user no longer exists"))?;

    txn.commit().await?;
    Ok(model)
}

/// Idempotent: a missing edge is success, not `NotFound`.
pub async fn unsubscribe(
    db: &DatabaseConnection,
    follower_id: i32,
    followee_id: i32,
) -> ServiceResult<()> {
    subscriptions::Entity::delete_many()
        .filter(subscriptions::Column::FollowerId.eq(follower_id))
        .filter(subscriptions::Column::FolloweeId.eq(followee_id))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn get_by_id(db: &DatabaseConnection, id: i32) -> ServiceResult<subscriptions::Model> {
    subscriptions::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("subscription {id} does not exist")))
}

pub async fn delete_by_id(db: &DatabaseConnection, id: i32) -> ServiceResult<()> {
    let result = subscriptions::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound(format!(
            "subscription {id} does not exist"
        )));
    }
    Ok(())
}

/// Users this user follows.
pub async fn list_following(
    db: &DatabaseConnection,
    user_id: i32,
    skip: u64,
    limit: u64,
) -> ServiceResult<Vec<subscriptions::Model>> {
    ensure_user(db, user_id).await?;
    Ok(subscriptions::Entity::find()
        .filter(subscriptions::Column::FollowerId.eq(user_id))
        .order_by_desc(subscriptions::Column::CreatedAt)
        .offset(skip)
        .limit(limit)
        .all(db)
        .await?)
}

/// Users following this user.
pub async fn list_followers(
    db: &DatabaseConnection,
    user_id: i32,
    skip: u64,
    limit: u64,
) -> ServiceResult<Vec<subscriptions::Model>> {
    ensure_user(db, user_id).await?;
    Ok(subscriptions::Entity::find()
        .filter(subscriptions::Column::FolloweeId.eq(user_id))
        .order_by_desc(subscriptions::Column::CreatedAt)
        .offset(skip)
        .limit(limit)
        .all(db)
        .await?)
}

async fn ensure_user(db: &DatabaseConnection, user_id: i32) -> ServiceResult<()> {
    users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("user {user_id} does not exist")))?;
    Ok(())
}
