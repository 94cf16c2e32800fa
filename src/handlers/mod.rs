pub mod auth;
pub mod config;
pub mod donations;
pub mod payments;
pub mod projects;
pub mod users;
pub mod webhooks;
