//! Registration and token issuance.

use crate::db::get_db_pool;
use crate::error::{ServiceError, ServiceResult};
use crate::session;
use crate::user::{self, UserView};
use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(register).service(token);
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 1000))]
    pub password: String,
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

#[post("/auth/register")]
async fn register(form: web::Json<RegisterForm>) -> ServiceResult<HttpResponse> {
    let form = form.into_inner();
    form.validate()
        .map_err(|err| ServiceError::InvalidRequest(err.to_string()))?;

    let user = user::register(get_db_pool(), &form.email, &form.password, form.name).await?;
    let access_token = session::issue_token(user.id)?;
    log::info!("User registered: {} (id {})", user.email, user.id);

    Ok(HttpResponse::Created().json(serde_json::json!({
        "user": UserView::from(user),
        "token": TokenResponse {
            access_token,
            token_type: "bearer",
        },
    })))
}

#[post("/auth/token")]
async fn token(form: web::Json<TokenForm>) -> ServiceResult<HttpResponse> {
    let form = form.into_inner();

    let user = user::get_by_email(get_db_pool(), &form.email).await?;
    let user = match user {
        Some(user) if session::verify_password(&form.password, &user.password) => user,
        _ => {
            log::warn!("Failed login attempt for {}.", form.email);
            return Err(ServiceError::Unauthenticated);
        }
    };

    if !user.is_active {
        log::warn!("Inactive account login attempt: {}.", form.email);
        return Err(ServiceError::Forbidden("account is deactivated".to_owned()));
    }

    let access_token = session::issue_token(user.id)?;
    log::info!("User logged in: {} (id {})", user.email, user.id);

    Ok(HttpResponse::Ok().json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}
