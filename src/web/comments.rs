//! Comment routes: threaded creation, author-only edits, author-or-admin
//! deletion, and nested reads.

use crate::comment;
use crate::db::get_db_pool;
use crate::error::{ServiceError, ServiceResult};
use crate::middleware::ClientCtx;
use crate::orm::users::Role;
use crate::permission;
use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(create_comment)
        .service(create_comment_as_author)
        .service(list_event_comments)
        .service(list_user_comments)
        .service(view_thread)
        .service(update_comment)
        .service(delete_comment);
}

/// Comment listings default to smaller pages than the other resources.
#[derive(Debug, Deserialize)]
pub struct CommentPagination {
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_comment_limit")]
    pub limit: u64,
}

fn default_comment_limit() -> u64 {
    20
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewCommentForm {
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
    pub parent_comment_id: Option<i32>,
}

/// Admin as-author payload: the author is explicit rather than taken from
/// the principal.
#[derive(Debug, Deserialize, Validate)]
pub struct NewCommentAsAuthorForm {
    pub event_id: i32,
    pub author_id: i32,
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
    pub parent_comment_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommentUpdateForm {
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
}

#[post("/events/{event_id}/comments")]
async fn create_comment(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<NewCommentForm>,
) -> ServiceResult<HttpResponse> {
    let principal = client.require_active()?;
    let form = form.into_inner();
    form.validate()
        .map_err(|err| ServiceError::InvalidRequest(err.to_string()))?;

    let created = comment::create(
        get_db_pool(),
        path.into_inner(),
        principal.id,
        &form.text,
        form.parent_comment_id,
    )
    .await?;

    Ok(HttpResponse::Created().json(created))
}

#[post("/comments/as_author")]
async fn create_comment_as_author(
    client: ClientCtx,
    form: web::Json<NewCommentAsAuthorForm>,
) -> ServiceResult<HttpResponse> {
    client.require_role(&[Role::Admin])?;
    let form = form.into_inner();
    form.validate()
        .map_err(|err| ServiceError::InvalidRequest(err.to_string()))?;

    let created = comment::create(
        get_db_pool(),
        form.event_id,
        form.author_id,
        &form.text,
        form.parent_comment_id,
    )
    .await?;

    Ok(HttpResponse::Created().json(created))
}

#[get("/events/{event_id}/comments")]
async fn list_event_comments(
    path: web::Path<i32>,
    page: web::Query<CommentPagination>,
) -> ServiceResult<HttpResponse> {
    let nodes =
        comment::list_top_level(get_db_pool(), path.into_inner(), page.skip, page.limit).await?;
    Ok(HttpResponse::Ok().json(nodes))
}

#[get("/users/{user_id}/comments")]
async fn list_user_comments(
    path: web::Path<i32>,
    page: web::Query<CommentPagination>,
) -> ServiceResult<HttpResponse> {
    let rows =
        comment::list_by_author(get_db_pool(), path.into_inner(), page.skip, page.limit).await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[get("/comments/{comment_id}")]
async fn view_thread(path: web::Path<i32>) -> ServiceResult<HttpResponse> {
    let node = comment::get_thread(get_db_pool(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(node))
}

/// Text edits are author-only; deliberately no admin override here,
/// unlike deletion.
#[patch("/comments/{comment_id}")]
async fn update_comment(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<CommentUpdateForm>,
) -> ServiceResult<HttpResponse> {
    let principal = client.require_active()?;
    let comment_id = path.into_inner();
    let form = form.into_inner();
    form.validate()
        .map_err(|err| ServiceError::InvalidRequest(err.to_string()))?;

    let existing = comment::get_by_id(get_db_pool(), comment_id).await?;
    permission::require_owner(principal, existing.author_id, "comment")?;

    let updated = comment::update(get_db_pool(), comment_id, &form.text).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/comments/{comment_id}")]
async fn delete_comment(client: ClientCtx, path: web::Path<i32>) -> ServiceResult<HttpResponse> {
    let principal = client.require_active()?;
    let comment_id = path.into_inner();

    let existing = comment::get_by_id(get_db_pool(), comment_id).await?;
    permission::require_owner_or_admin(principal, existing.author_id, "comment")?;

    comment::delete(get_db_pool(), comment_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
