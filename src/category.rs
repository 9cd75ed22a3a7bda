//! Event categories. Admin-only mutations; the delete path is guarded by
//! a referencing-event count rather than a cascade.

use crate::error::{constraint_error, ServiceError, ServiceResult};
use crate::orm::{categories, events};
use sea_orm::{entity::*, query::*, DatabaseConnection, PaginatorTrait, TransactionTrait};

pub async fn get_by_id(db: &DatabaseConnection, id: i32) -> ServiceResult<categories::Model> {
    categories::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("category {id} does not exist")))
}

pub async fn list(
    db: &DatabaseConnection,
    skip: u64,
    limit: u64,
) -> ServiceResult<Vec<categories::Model>> {
    Ok(categories::Entity::find()
        .order_by_asc(categories::Column::Name)
        .offset(skip)
        .limit(limit)
        .all(db)
        .await?)
}

pub async fn create(db: &DatabaseConnection, name: &str) -> ServiceResult<categories::Model> {
    categories::ActiveModel {
        name: Set(name.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|err| {
        constraint_error(
            err,
            "a category with this name already exists",
            "category no longer exists",
        )
    })
}

pub async fn rename(
    db: &DatabaseConnection,
    id: i32,
    name: &str,
) -> ServiceResult<categories::Model> {
    let txn = db.begin().await?;

    let category = categories::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("category {id} does not exist")))?;

    let mut active = category.into_active_model();
    active.name = Set(name.to_owned());
    let updated = active.update(&txn).await.map_err(|err| {
        constraint_error(
            err,
            "a category with this name already exists",
            "category no longer exists",
        )
    })?;

    txn.commit().await?;
    Ok(updated)
}

/// Refuses deletion while any event references the category, naming the
/// count in the error.
pub async fn delete(db: &DatabaseConnection, id: i32) -> ServiceResult<()> {
    let txn = db.begin().await?;

    categories::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("category {id} does not exist")))?;

    let referencing = events::Entity::find()
        .filter(events::Column::CategoryId.eq(id))
        .count(&txn)
        .await?;
    if referencing > 0 {
        return Err(ServiceError::Conflict(format!(
            "category is referenced by {referencing} event(s)"
        )));
    }

    categories::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    Ok(())
}
