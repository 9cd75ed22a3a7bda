//! Event routes: filtered listings, organizer-gated creation, and
//! author-only mutations.

use crate::db::get_db_pool;
use crate::error::{ServiceError, ServiceResult};
use crate::event::{self, EventFilter, EventPatch};
use crate::middleware::ClientCtx;
use crate::orm::users::Role;
use crate::permission;
use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::NaiveDateTime;
use serde::Deserialize;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_events)
        .service(create_event)
        .service(view_event)
        .service(update_event)
        .service(delete_event);
}

#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "super::default_limit")]
    pub limit: u64,
    pub category_id: Option<i32>,
    pub author_id: Option<i32>,
    pub from: Option<NaiveDateTime>,
    pub until: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewEventForm {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    pub event_date: NaiveDateTime,
    pub category_id: i32,
}

#[get("/events")]
async fn list_events(query: web::Query<EventListQuery>) -> ServiceResult<HttpResponse> {
    let query = query.into_inner();
    let filter = EventFilter {
        category_id: query.category_id,
        author_id: query.author_id,
        from: query.from,
        until: query.until,
    };
    let events = event::list(get_db_pool(), &filter, query.skip, query.limit).await?;
    Ok(HttpResponse::Ok().json(events))
}

#[get("/events/{event_id}")]
async fn view_event(path: web::Path<i32>) -> ServiceResult<HttpResponse> {
    let event = event::get_by_id(get_db_pool(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(event))
}

/// Event creation is gated to organizers and admins; the author is always
/// the principal, regardless of what the payload claims.
#[post("/events")]
async fn create_event(
    client: ClientCtx,
    form: web::Json<NewEventForm>,
) -> ServiceResult<HttpResponse> {
    let principal = client.require_role(&[Role::Organizer, Role::Admin])?;

    let form = form.into_inner();
    form.validate()
        .map_err(|err| ServiceError::InvalidRequest(err.to_string()))?;

    let created = event::create(
        get_db_pool(),
        principal.id,
        &form.title,
        form.description,
        form.event_date,
        form.category_id,
    )
    .await?;

    Ok(HttpResponse::Created().json(created))
}

#[patch("/events/{event_id}")]
async fn update_event(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<EventPatch>,
) -> ServiceResult<HttpResponse> {
    let principal = client.require_active()?;
    let event_id = path.into_inner();

    let existing = event::get_by_id(get_db_pool(), event_id).await?;
    permission::require_owner(principal, existing.author_id, "event")?;

    let updated = event::update(get_db_pool(), event_id, form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/events/{event_id}")]
async fn delete_event(client: ClientCtx, path: web::Path<i32>) -> ServiceResult<HttpResponse> {
    let principal = client.require_active()?;
    let event_id = path.into_inner();

    let existing = event::get_by_id(get_db_pool(), event_id).await?;
    permission::require_owner(principal, existing.author_id, "event")?;

    event::delete(get_db_pool(), event_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
