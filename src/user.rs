//! User accounts: registration, profile reads, allow-listed partial
//! updates, and the guarded cascade delete.

use crate::error::{constraint_error, ServiceError, ServiceResult};
use crate::orm::users::Role;
use crate::orm::{comments, events, users};
use crate::session;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, DatabaseConnection, PaginatorTrait, TransactionTrait};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Public projection of a user row. The password digest never serializes.
#[derive(Clone, Debug, Serialize)]
pub struct UserView {
    pub id: i32,
    pub email: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub is_active: bool,
    pub role: Role,
    pub created_at: chrono::NaiveDateTime,
}

impl From<users::Model> for UserView {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            bio: user.bio,
            is_active: user.is_active,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Allow-listed partial update. Absent fields are left untouched; `role`
/// and `is_active` additionally require an admin principal (checked by the
/// caller through the policy layer before this reaches storage).
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UserPatch {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
    #[validate(length(min = 8, max = 1000))]
    pub password: Option<String>,
    pub is_active: Option<bool>,
    pub role: Option<Role>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.name.is_none()
            && self.bio.is_none()
            && self.password.is_none()
            && self.is_active.is_none()
            && self.role.is_none()
    }

    /// True when the patch touches fields only administrators may set.
    pub fn touches_admin_fields(&self) -> bool {
        self.is_active.is_some() || self.role.is_some()
    }
}

pub async fn get_by_id(db: &DatabaseConnection, id: i32) -> ServiceResult<users::Model> {
    users::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("user {id} does not exist")))
}

pub async fn get_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> ServiceResult<Option<users::Model>> {
    Ok(users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(db)
        .await?)
}

pub async fn list(
    db: &DatabaseConnection,
    skip: u64,
    limit: u64,
) -> ServiceResult<Vec<users::Model>> {
    Ok(users::Entity::find()
        .order_by_asc(users::Column::Id)
        .offset(skip)
        .limit(limit)
        .all(db)
        .await?)
}

/// Self-service registration. New accounts are active with role `user`.
pub async fn register(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
    name: Option<String>,
) -> ServiceResult<users::Model> {
    create(db, email, password, name, None, Role::User, true).await
}

/// Account creation with explicit role/active flags, used by the admin
/// surface. The unique index on email is the enforcement mechanism; the
/// pre-check only produces a friendlier message ahead of the race.
pub async fn create(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
    name: Option<String>,
    bio: Option<String>,
    role: Role,
    is_active: bool,
) -> ServiceResult<users::Model> {
    if get_by_email(db, email).await?.is_some() {
        return Err(ServiceError::Conflict("email is already registered".to_owned()));
    }

    let digest = session::hash_password(password)?;
    users::ActiveModel {
        email: Set(email.to_owned()),
        password: Set(digest),
        name: Set(name),
        bio: Set(bio),
        is_active: Set(is_active),
        role: Set(role),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|err| constraint_error(err, "email is already registered", "user no longer exists"))
}

/// Applies a sparse patch inside one transaction. Fields absent from the
/// patch are never written.
pub async fn update(
    db: &DatabaseConnection,
    user_id: i32,
    patch: UserPatch,
) -> ServiceResult<users::Model> {
    if patch.is_empty() {
        return Err(ServiceError::InvalidRequest("no fields to update".to_owned()));
    }

    let txn = db.begin().await?;

    let user = users::Entity::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("user {user_id} does not exist")))?;

    let mut active = user.into_active_model();
    if let Some(email) = patch.email {
        active.email = Set(email);
    }
    if let Some(name) = patch.name {
        active.name = Set(Some(name));
    }
    if let Some(bio) = patch.bio {
        active.bio = Set(Some(bio));
    }
    if let Some(password) = patch.password {
        active.password = Set(session::hash_password(&password)?);
    }
    if let Some(is_active) = patch.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(role) = patch.role {
        active.role = Set(role);
    }

    let updated = active.update(&txn).await.map_err(|err| {
        constraint_error(err, "email is already registered", "user no longer exists")
    })?;

    txn.commit().await?;
    Ok(updated)
}

/// Deletes an account. Refused while the user still authors events, the
/// same guard the category delete applies; everything else the user owns
/// (participations, subscriptions, comments, reviews, tickets) is removed
/// by the storage-level cascade. Surviving parents of the user's reply
/// comments get their reply_count decremented first so the counter
/// invariant holds across the cascade.
pub async fn delete(db: &DatabaseConnection, user_id: i32) -> ServiceResult<()> {
    let txn = db.begin().await?;

    users::Entity::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("user {user_id} does not exist")))?;

    let authored = events::Entity::find()
        .filter(events::Column::AuthorId.eq(user_id))
        .count(&txn)
        .await?;
    if authored > 0 {
        return Err(ServiceError::Conflict(format!(
            "user still authors {authored} event(s); delete or reassign them first"
        )));
    }

    let replies = comments::Entity::find()
        .filter(comments::Column::AuthorId.eq(user_id))
        .filter(comments::Column::ParentCommentId.is_not_null())
        .all(&txn)
        .await?;
    for reply in replies {
        if let Some(parent_id) = reply.parent_comment_id {
            // Parents authored by this user vanish with the cascade and do
            // not need fixing; the clamp keeps the count non-negative.
            comments::Entity::update_many()
                .col_expr(
                    comments::Column::ReplyCount,
                    Expr::col(comments::Column::ReplyCount).sub(1),
                )
                .filter(comments::Column::Id.eq(parent_id))
                .filter(comments::Column::AuthorId.ne(user_id))
                .filter(comments::Column::ReplyCount.gt(0))
                .exec(&txn)
                .await?;
        }
    }

    users::Entity::delete_by_id(user_id).exec(&txn).await?;
    txn.commit().await?;

    log::info!("Deleted user {} and their owned rows.", user_id);
    Ok(())
}
