//! Threaded comment engine.
//!
//! Comments nest under a nullable parent up to five levels (depth 0..=4).
//! `reply_count` on each comment tracks its direct children and is written
//! in the same transaction as every insert and delete, so the counter
//! never observably drifts from the row count. Deleting a comment removes
//! its whole subtree through the storage-level cascade; only the immediate
//! parent's counter changes, since the subtree vanishes atomically.

use crate::error::{constraint_error, ServiceError, ServiceResult};
use crate::orm::{comments, events, users};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, DatabaseConnection, TransactionTrait};
use serde::Serialize;
use std::collections::HashMap;

/// Maximum depth of a reply. Depth values run 0..=4, five levels total.
pub const MAX_DEPTH: i32 = 4;

/// How many reply levels event listings eagerly attach below each
/// top-level comment.
const LIST_REPLY_LEVELS: usize = 2;

/// A comment with author info denormalized for display and its replies
/// nested beneath it.
#[derive(Debug, Serialize)]
pub struct CommentNode {
    pub id: i32,
    pub event_id: i32,
    pub author_id: i32,
    pub author_name: Option<String>,
    pub text: String,
    pub parent_comment_id: Option<i32>,
    pub depth: i32,
    pub reply_count: i32,
    pub created_at: chrono::NaiveDateTime,
    pub replies: Vec<CommentNode>,
}

/// Creates a comment, optionally as a reply. The parent must belong to the
/// same event and sit above the depth cap; its `reply_count` increment and
/// the insert commit together.
pub async fn create(
    db: &DatabaseConnection,
    event_id: i32,
    author_id: i32,
    text: &str,
    parent_comment_id: Option<i32>,
) -> ServiceResult<comments::Model> {
    if text.trim().is_empty() {
        return Err(ServiceError::InvalidRequest(
            "comment text cannot be empty".to_owned(),
        ));
    }

    let txn = db.begin().await?;

    events::Entity::find_by_id(event_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event {event_id} does not exist")))?;

    let depth = match parent_comment_id {
        Some(parent_id) => {
            let parent = comments::Entity::find_by_id(parent_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("parent comment {parent_id} does not exist"))
                })?;

            if parent.event_id != event_id {
                return Err(ServiceError::InvalidRequest(
                    "reply must belong to the same event as its parent".to_owned(),
                ));
            }
            if parent.depth >= MAX_DEPTH {
                return Err(ServiceError::InvalidRequest(
                    "maximum reply depth reached".to_owned(),
                ));
            }

            comments::Entity::update_many()
                .col_expr(
                    comments::Column::ReplyCount,
                    Expr::col(comments::Column::ReplyCount).add(1),
                )
                .filter(comments::Column::Id.eq(parent_id))
                .exec(&txn)
                .await?;

            parent.depth + 1
        }
        None => 0,
    };

    let model = comments::ActiveModel {
        event_id: Set(event_id),
        author_id: Set(author_id),
        text: Set(text.to_owned()),
        parent_comment_id: Set(parent_comment_id),
        depth: Set(depth),
        reply_count: Set(0),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|err| {
        constraint_error(
            err,
            "comment already exists",
            "event, author, or parent no longer exists",
        )
    })?;

    txn.commit().await?;
    Ok(model)
}

pub async fn get_by_id(db: &DatabaseConnection, id: i32) -> ServiceResult<comments::Model> {
    comments::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("comment {id} does not exist")))
}

/// Replaces the comment text. Authorization (author-only) happens in the
/// caller before this runs.
pub async fn update(
    db: &DatabaseConnection,
    comment_id: i32,
    text: &str,
) -> ServiceResult<comments::Model> {
    if text.trim().is_empty() {
        return Err(ServiceError::InvalidRequest(
            "comment text cannot be empty".to_owned(),
        ));
    }

    let txn = db.begin().await?;

    let comment = comments::Entity::find_by_id(comment_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("comment {comment_id} does not exist")))?;

    let mut active = comment.into_active_model();
    active.text = Set(text.to_owned());
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Deletes a comment and, via the cascade, its whole reply subtree. The
/// immediate parent's `reply_count` is decremented with a floor of zero;
/// deeper ancestors are untouched because the subtree disappears as one.
pub async fn delete(db: &DatabaseConnection, comment_id: i32) -> ServiceResult<()> {
    let txn = db.begin().await?;

    let comment = comments::Entity::find_by_id(comment_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("comment {comment_id} does not exist")))?;

    if let Some(parent_id) = comment.parent_comment_id {
        // The gt(0) filter clamps the counter at zero even if it has
        // drifted; an update that matches no row is a no-op.
        comments::Entity::update_many()
            .col_expr(
                comments::Column::ReplyCount,
                Expr::col(comments::Column::ReplyCount).sub(1),
            )
            .filter(comments::Column::Id.eq(parent_id))
            .filter(comments::Column::ReplyCount.gt(0))
            .exec(&txn)
            .await?;
    }

    comments::Entity::delete_by_id(comment_id).exec(&txn).await?;
    txn.commit().await?;
    Ok(())
}

/// Top-level comments for an event, newest first, each carrying up to two
/// levels of nested replies.
pub async fn list_top_level(
    db: &DatabaseConnection,
    event_id: i32,
    skip: u64,
    limit: u64,
) -> ServiceResult<Vec<CommentNode>> {
    events::Entity::find_by_id(event_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event {event_id} does not exist")))?;

    let roots = comments::Entity::find()
        .filter(comments::Column::EventId.eq(event_id))
        .filter(comments::Column::ParentCommentId.is_null())
        .order_by_desc(comments::Column::CreatedAt)
        .order_by_desc(comments::Column::Id)
        .offset(skip)
        .limit(limit)
        .all(db)
        .await?;

    build_forest(db, roots, Some(LIST_REPLY_LEVELS)).await
}

/// A single comment with its full reply subtree attached.
pub async fn get_thread(db: &DatabaseConnection, comment_id: i32) -> ServiceResult<CommentNode> {
    let root = get_by_id(db, comment_id).await?;
    let mut forest = build_forest(db, vec![root], None).await?;
    forest
        .pop()
        .ok_or_else(|| ServiceError::Internal("thread root vanished during read".to_owned()))
}

/// Flat newest-first listing of one user's comments, no nesting.
pub async fn list_by_author(
    db: &DatabaseConnection,
    author_id: i32,
    skip: u64,
    limit: u64,
) -> ServiceResult<Vec<comments::Model>> {
    Ok(comments::Entity::find()
        .filter(comments::Column::AuthorId.eq(author_id))
        .order_by_desc(comments::Column::CreatedAt)
        .order_by_desc(comments::Column::Id)
        .offset(skip)
        .limit(limit)
        .all(db)
        .await?)
}

/// Fetches descendants of `roots` level by level (bounded by `levels`, or
/// by the depth cap when None), resolves author names, and assembles the
/// nested nodes.
async fn build_forest(
    db: &DatabaseConnection,
    roots: Vec<comments::Model>,
    levels: Option<usize>,
) -> ServiceResult<Vec<CommentNode>> {
    let mut collected: Vec<comments::Model> = Vec::new();
    let mut frontier: Vec<i32> = roots.iter().map(|c| c.id).collect();
    let mut remaining = levels;

    while !frontier.is_empty() {
        if let Some(0) = remaining {
            break;
        }
        let children = comments::Entity::find()
            .filter(comments::Column::ParentCommentId.is_in(frontier.clone()))
            .order_by_desc(comments::Column::CreatedAt)
            .order_by_desc(comments::Column::Id)
            .all(db)
            .await?;

        frontier = children.iter().map(|c| c.id).collect();
        collected.extend(children);
        remaining = remaining.map(|n| n - 1);
    }

    let mut author_ids: Vec<i32> = roots
        .iter()
        .chain(collected.iter())
        .map(|c| c.author_id)
        .collect();
    author_ids.sort_unstable();
    author_ids.dedup();

    let authors: HashMap<i32, Option<String>> = users::Entity::find()
        .filter(users::Column::Id.is_in(author_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.name))
        .collect();

    let mut children_by_parent: HashMap<i32, Vec<comments::Model>> = HashMap::new();
    for child in collected {
        if let Some(parent_id) = child.parent_comment_id {
            children_by_parent.entry(parent_id).or_default().push(child);
        }
    }

    Ok(roots
        .into_iter()
        .map(|root| assemble(root, &mut children_by_parent, &authors))
        .collect())
}

fn assemble(
    model: comments::Model,
    children_by_parent: &mut HashMap<i32, Vec<comments::Model>>,
    authors: &HashMap<i32, Option<String>>,
) -> CommentNode {
    let children = children_by_parent.remove(&model.id).unwrap_or_default();
    let replies = children
        .into_iter()
        .map(|child| assemble(child, children_by_parent, authors))
        .collect();

    CommentNode {
        id: model.id,
        event_id: model.event_id,
        author_id: model.author_id,
        author_name: authors.get(&model.author_id).cloned().flatten(),
        text: model.text,
        parent_comment_id: model.parent_comment_id,
        depth: model.depth,
        reply_count: model.reply_count,
        created_at: model.created_at,
        replies,
    }
}
