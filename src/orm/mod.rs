pub mod categories;
pub mod comments;
pub mod events;
pub mod participations;
pub mod reviews;
pub mod subscriptions;
pub mod tickets;
pub mod users;
