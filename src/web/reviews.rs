//! Review routes: one review per user per event, rating-range listings.

use super::Pagination;
use crate::db::get_db_pool;
use crate::error::{ServiceError, ServiceResult};
use crate::middleware::ClientCtx;
use crate::permission;
use crate::review::{self, ReviewPatch};
use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(create_review)
        .service(list_event_reviews)
        .service(list_user_reviews)
        .service(view_review)
        .service(update_review)
        .service(delete_review);
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewReviewForm {
    #[validate(length(min = 1, max = 1000))]
    pub comment: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
}

#[derive(Debug, Deserialize)]
pub struct ReviewListQuery {
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "super::default_limit")]
    pub limit: u64,
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
}

#[post("/events/{event_id}/reviews")]
async fn create_review(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<NewReviewForm>,
) -> ServiceResult<HttpResponse> {
    let principal = client.require_active()?;
    let form = form.into_inner();
    form.validate()
        .map_err(|err| ServiceError::InvalidRequest(err.to_string()))?;

    let created = review::create(
        get_db_pool(),
        path.into_inner(),
        principal.id,
        &form.comment,
        form.rating,
    )
    .await?;

    Ok(HttpResponse::Created().json(created))
}

#[get("/events/{event_id}/reviews")]
async fn list_event_reviews(
    path: web::Path<i32>,
    query: web::Query<ReviewListQuery>,
) -> ServiceResult<HttpResponse> {
    let query = query.into_inner();
    let rows = review::list_for_event(
        get_db_pool(),
        path.into_inner(),
        query.min_rating,
        query.max_rating,
        query.skip,
        query.limit,
    )
    .await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[get("/users/{user_id}/reviews")]
async fn list_user_reviews(
    path: web::Path<i32>,
    page: web::Query<Pagination>,
) -> ServiceResult<HttpResponse> {
    let rows =
        review::list_by_author(get_db_pool(), path.into_inner(), page.skip, page.limit).await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[get("/reviews/{review_id}")]
async fn view_review(path: web::Path<i32>) -> ServiceResult<HttpResponse> {
    let row = review::get_by_id(get_db_pool(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(row))
}

#[patch("/reviews/{review_id}")]
async fn update_review(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<ReviewPatch>,
) -> ServiceResult<HttpResponse> {
    let principal = client.require_active()?;
    let review_id = path.into_inner();

    let existing = review::get_by_id(get_db_pool(), review_id).await?;
    permission::require_owner_or_admin(principal, existing.author_id, "review")?;

    let updated = review::update(get_db_pool(), review_id, form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/reviews/{review_id}")]
async fn delete_review(client: ClientCtx, path: web::Path<i32>) -> ServiceResult<HttpResponse> {
    let principal = client.require_active()?;
    let review_id = path.into_inner();

    let existing = review::get_by_id(get_db_pool(), review_id).await?;
    permission::require_owner_or_admin(principal, existing.author_id, "review")?;

    review::delete(get_db_pool(), review_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
