//! Category routes. Reads are public; every mutation is admin-only.

use super::Pagination;
use crate::category;
use crate::db::get_db_pool;
use crate::error::{ServiceError, ServiceResult};
use crate::middleware::ClientCtx;
use crate::orm::users::Role;
use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_categories)
        .service(create_category)
        .service(view_category)
        .service(update_category)
        .service(delete_category);
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

#[get("/categories")]
async fn list_categories(page: web::Query<Pagination>) -> ServiceResult<HttpResponse> {
    let categories = category::list(get_db_pool(), page.skip, page.limit).await?;
    Ok(HttpResponse::Ok().json(categories))
}

#[get("/categories/{category_id}")]
async fn view_category(path: web::Path<i32>) -> ServiceResult<HttpResponse> {
    let category = category::get_by_id(get_db_pool(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(category))
}

#[post("/categories")]
async fn create_category(
    client: ClientCtx,
    form: web::Json<CategoryForm>,
) -> ServiceResult<HttpResponse> {
    client.require_role(&[Role::Admin])?;
    form.validate()
        .map_err(|err| ServiceError::InvalidRequest(err.to_string()))?;

    let created = category::create(get_db_pool(), &form.name).await?;
    Ok(HttpResponse::Created().json(created))
}

#[patch("/categories/{category_id}")]
async fn update_category(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<CategoryForm>,
) -> ServiceResult<HttpResponse> {
    client.require_role(&[Role::Admin])?;
    form.validate()
        .map_err(|err| ServiceError::InvalidRequest(err.to_string()))?;

    let updated = category::rename(get_db_pool(), path.into_inner(), &form.name).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/categories/{category_id}")]
async fn delete_category(client: ClientCtx, path: web::Path<i32>) -> ServiceResult<HttpResponse> {
    client.require_role(&[Role::Admin])?;
    category::delete(get_db_pool(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
