//! Request principal resolution.
//!
//! `ClientCtx` is extracted once per handler. A missing Authorization
//! header yields a guest context; a header that is present but does not
//! verify, or whose subject no longer resolves to a user row, fails the
//! request with `Unauthenticated` before the handler body runs.

use crate::db::get_db_pool;
use crate::error::{ServiceError, ServiceResult};
use crate::orm::users::{self, Role};
use crate::session;
use actix_web::dev::Payload;
use actix_web::{http::header, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use sea_orm::EntityTrait;

/// Client context passed to routes. Holds the resolved principal, if any.
#[derive(Clone, Debug, Default)]
pub struct ClientCtx {
    client: Option<users::Model>,
}

impl ClientCtx {
    /// Returns either the user's id or None for guests.
    pub fn get_id(&self) -> Option<i32> {
        self.client.as_ref().map(|u| u.id)
    }

    pub fn get_user(&self) -> Option<&users::Model> {
        self.client.as_ref()
    }

    pub fn is_user(&self) -> bool {
        self.client.is_some()
    }

    /// Require an authenticated principal.
    pub fn require_login(&self) -> ServiceResult<&users::Model> {
        self.client.as_ref().ok_or(ServiceError::Unauthenticated)
    }

    /// Require an authenticated principal whose account is active.
    pub fn require_active(&self) -> ServiceResult<&users::Model> {
        let user = self.require_login()?;
        crate::permission::require_active(user)?;
        Ok(user)
    }

    /// Require an active principal holding one of the allowed roles.
    pub fn require_role(&self, allowed: &[Role]) -> ServiceResult<&users::Model> {
        let user = self.require_active()?;
        crate::permission::require_role(user, allowed)?;
        Ok(user)
    }
}

impl FromRequest for ClientCtx {
    type Error = ServiceError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let header = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        Box::pin(async move {
            let value = match header {
                Some(value) => value,
                None => return Ok(ClientCtx::default()),
            };

            let token = value
                .strip_prefix("Bearer ")
                .ok_or(ServiceError::Unauthenticated)?;
            let user_id = session::verify_token(token).ok_or(ServiceError::Unauthenticated)?;

            let user = users::Entity::find_by_id(user_id)
                .one(get_db_pool())
                .await?
                .ok_or_else(|| {
                    log::warn!("Valid token for user {} who no longer exists.", user_id);
                    ServiceError::Unauthenticated
                })?;

            Ok(ClientCtx { client: Some(user) })
        })
    }
}
