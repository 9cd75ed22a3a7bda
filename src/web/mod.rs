pub mod auth;
pub mod categories;
pub mod comments;
pub mod events;
pub mod participations;
pub mod reviews;
pub mod subscriptions;
pub mod tickets;
pub mod users;

use serde::Deserialize;

/// Shared skip/limit query parameters for list endpoints.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    100
}

/// Configures the web app by adding services from each resource module.
///
/// @see https://docs.rs/actix-web/4.5.0/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    auth::configure(conf);
    categories::configure(conf);
    comments::configure(conf);
    events::configure(conf);
    participations::configure(conf);
    reviews::configure(conf);
    subscriptions::configure(conf);
    tickets::configure(conf);
    users::configure(conf);
}
