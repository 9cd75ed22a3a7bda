//! Subscription routes: follow/unfollow other users and list both sides
//! of the edge.

use super::Pagination;
use crate::db::get_db_pool;
use crate::error::ServiceResult;
use crate::middleware::ClientCtx;
use crate::permission;
use crate::subscription;
use actix_web::{delete, get, post, web, HttpResponse};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(subscribe)
        .service(unsubscribe)
        .service(list_following)
        .service(list_followers)
        .service(delete_subscription);
}

#[post("/users/{user_id}/subscribe")]
async fn subscribe(client: ClientCtx, path: web::Path<i32>) -> ServiceResult<HttpResponse> {
    let principal = client.require_active()?;
    let row = subscription::subscribe(get_db_pool(), principal.id, path.into_inner()).await?;
    Ok(HttpResponse::Created().json(row))
}

/// Idempotent: unsubscribing when no edge exists is still a 204.
#[delete("/users/{user_id}/subscribe")]
async fn unsubscribe(client: ClientCtx, path: web::Path<i32>) -> ServiceResult<HttpResponse> {
    let principal = client.require_active()?;
    subscription::unsubscribe(get_db_pool(), principal.id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/users/{user_id}/subscriptions")]
async fn list_following(
    path: web::Path<i32>,
    page: web::Query<Pagination>,
) -> ServiceResult<HttpResponse> {
    let rows =
        subscription::list_following(get_db_pool(), path.into_inner(), page.skip, page.limit)
            .await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[get("/users/{user_id}/subscribers")]
async fn list_followers(
    path: web::Path<i32>,
    page: web::Query<Pagination>,
) -> ServiceResult<HttpResponse> {
    let rows =
        subscription::list_followers(get_db_pool(), path.into_inner(), page.skip, page.limit)
            .await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// Admin override path: remove any subscription edge by id.
#[delete("/subscriptions/{subscription_id}")]
async fn delete_subscription(client: ClientCtx, path: web::Path<i32>) -> ServiceResult<HttpResponse> {
    let principal = client.require_active()?;
    let id = path.into_inner();

    let row = subscription::get_by_id(get_db_pool(), id).await?;
    permission::require_owner_or_admin(principal, row.follower_id, "subscription")?;

    subscription::delete_by_id(get_db_pool(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}
