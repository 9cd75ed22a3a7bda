//! Participation routes. Setting a status is an upsert keyed on the
//! (user, event) pair.

use super::Pagination;
use crate::db::get_db_pool;
use crate::error::ServiceResult;
use crate::middleware::ClientCtx;
use crate::orm::participations::ParticipationStatus;
use crate::participation;
use crate::permission;
use actix_web::{delete, get, put, web, HttpResponse};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(set_participation)
        .service(remove_participation)
        .service(list_event_participations)
        .service(list_user_participations)
        .service(delete_participation);
}

#[derive(Debug, Deserialize)]
pub struct ParticipationForm {
    pub status: ParticipationStatus,
}

#[put("/events/{event_id}/participation")]
async fn set_participation(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<ParticipationForm>,
) -> ServiceResult<HttpResponse> {
    let principal = client.require_active()?;
    let row =
        participation::upsert(get_db_pool(), principal.id, path.into_inner(), form.status).await?;
    Ok(HttpResponse::Ok().json(row))
}

#[delete("/events/{event_id}/participation")]
async fn remove_participation(client: ClientCtx, path: web::Path<i32>) -> ServiceResult<HttpResponse> {
    let principal = client.require_active()?;
    participation::remove(get_db_pool(), principal.id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/events/{event_id}/participations")]
async fn list_event_participations(
    path: web::Path<i32>,
    page: web::Query<Pagination>,
) -> ServiceResult<HttpResponse> {
    let rows =
        participation::list_for_event(get_db_pool(), path.into_inner(), page.skip, page.limit)
            .await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[get("/users/{user_id}/participations")]
async fn list_user_participations(
    path: web::Path<i32>,
    page: web::Query<Pagination>,
) -> ServiceResult<HttpResponse> {
    let rows = participation::list_for_user(get_db_pool(), path.into_inner(), page.skip, page.limit)
        .await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// Admin override path: remove any participation row by id.
#[delete("/participations/{participation_id}")]
async fn delete_participation(client: ClientCtx, path: web::Path<i32>) -> ServiceResult<HttpResponse> {
    let principal = client.require_active()?;
    let id = path.into_inner();

    let row = participation::get_by_id(get_db_pool(), id).await?;
    permission::require_owner_or_admin(principal, row.user_id, "participation")?;

    participation::delete_by_id(get_db_pool(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}
