//! User resource routes: listings, profile reads, allow-listed updates,
//! and the guarded delete.

use super::Pagination;
use crate::db::get_db_pool;
use crate::error::{ServiceError, ServiceResult};
use crate::middleware::ClientCtx;
use crate::orm::users::Role;
use crate::permission;
use crate::user::{self, UserPatch, UserView};
use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_users)
        .service(create_user)
        .service(view_user)
        .service(update_user)
        .service(delete_user);
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewUserForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 1000))]
    pub password: String,
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

#[get("/users")]
async fn list_users(page: web::Query<Pagination>) -> ServiceResult<HttpResponse> {
    let users = user::list(get_db_pool(), page.skip, page.limit).await?;
    let views: Vec<UserView> = users.into_iter().map(UserView::from).collect();
    Ok(HttpResponse::Ok().json(views))
}

#[get("/users/{user_id}")]
async fn view_user(path: web::Path<i32>) -> ServiceResult<HttpResponse> {
    let user = user::get_by_id(get_db_pool(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserView::from(user)))
}

/// Admin-side account creation with explicit role/active flags.
#[post("/users")]
async fn create_user(
    client: ClientCtx,
    form: web::Json<NewUserForm>,
) -> ServiceResult<HttpResponse> {
    client.require_role(&[Role::Admin])?;

    let form = form.into_inner();
    form.validate()
        .map_err(|err| ServiceError::InvalidRequest(err.to_string()))?;

    let created = user::create(
        get_db_pool(),
        &form.email,
        &form.password,
        form.name,
        form.bio,
        form.role.unwrap_or_default(),
        form.is_active.unwrap_or(true),
    )
    .await?;

    Ok(HttpResponse::Created().json(UserView::from(created)))
}

#[patch("/users/{user_id}")]
async fn update_user(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<UserPatch>,
) -> ServiceResult<HttpResponse> {
    let principal = client.require_active()?;
    let user_id = path.into_inner();
    let patch = form.into_inner();

    patch
        .validate()
        .map_err(|err| ServiceError::InvalidRequest(err.to_string()))?;
    permission::require_owner_or_admin(principal, user_id, "user profile")?;
    permission::require_admin_fields(principal, patch.touches_admin_fields())?;

    let updated = user::update(get_db_pool(), user_id, patch).await?;
    Ok(HttpResponse::Ok().json(UserView::from(updated)))
}

#[delete("/users/{user_id}")]
async fn delete_user(client: ClientCtx, path: web::Path<i32>) -> ServiceResult<HttpResponse> {
    let principal = client.require_active()?;
    let user_id = path.into_inner();

    permission::require_owner_or_admin(principal, user_id, "user account")?;
    user::delete(get_db_pool(), user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
