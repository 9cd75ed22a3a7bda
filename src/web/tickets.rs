//! Ticket routes. Access to a ticket extends beyond its holder to the
//! author of the ticket's event and admins.

use super::Pagination;
use crate::db::get_db_pool;
use crate::error::ServiceResult;
use crate::event;
use crate::middleware::ClientCtx;
use crate::permission;
use crate::ticket;
use actix_web::{delete, get, post, web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(purchase_ticket)
        .service(view_ticket)
        .service(delete_ticket)
        .service(list_user_tickets)
        .service(list_event_tickets);
}

#[derive(Debug, Deserialize)]
pub struct NewTicketForm {
    pub price: Decimal,
}

#[post("/events/{event_id}/tickets")]
async fn purchase_ticket(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<NewTicketForm>,
) -> ServiceResult<HttpResponse> {
    let principal = client.require_active()?;
    let created =
        ticket::create(get_db_pool(), principal.id, path.into_inner(), form.price).await?;
    Ok(HttpResponse::Created().json(created))
}

#[get("/tickets/{ticket_id}")]
async fn view_ticket(client: ClientCtx, path: web::Path<i32>) -> ServiceResult<HttpResponse> {
    let principal = client.require_active()?;

    let row = ticket::get_by_id(get_db_pool(), path.into_inner()).await?;
    let event = event::get_by_id(get_db_pool(), row.event_id).await?;
    permission::require_ticket_access(principal, row.user_id, event.author_id)?;

    Ok(HttpResponse::Ok().json(row))
}

#[delete("/tickets/{ticket_id}")]
async fn delete_ticket(client: ClientCtx, path: web::Path<i32>) -> ServiceResult<HttpResponse> {
    let principal = client.require_active()?;
    let ticket_id = path.into_inner();

    let row = ticket::get_by_id(get_db_pool(), ticket_id).await?;
    let event = event::get_by_id(get_db_pool(), row.event_id).await?;
    permission::require_ticket_access(principal, row.user_id, event.author_id)?;

    ticket::delete(get_db_pool(), ticket_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/users/{user_id}/tickets")]
async fn list_user_tickets(
    client: ClientCtx,
    path: web::Path<i32>,
    page: web::Query<Pagination>,
) -> ServiceResult<HttpResponse> {
    let principal = client.require_active()?;
    let user_id = path.into_inner();

    permission::require_owner_or_admin(principal, user_id, "ticket listing")?;
    let rows = ticket::list_for_user(get_db_pool(), user_id, page.skip, page.limit).await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[get("/events/{event_id}/tickets")]
async fn list_event_tickets(
    client: ClientCtx,
    path: web::Path<i32>,
    page: web::Query<Pagination>,
) -> ServiceResult<HttpResponse> {
    let principal = client.require_active()?;
    let event_id = path.into_inner();

    let event = event::get_by_id(get_db_pool(), event_id).await?;
    permission::require_owner_or_admin(principal, event.author_id, "event ticket listing")?;

    let rows = ticket::list_for_event(get_db_pool(), event_id, page.skip, page.limit).await?;
    Ok(HttpResponse::Ok().json(rows))
}
