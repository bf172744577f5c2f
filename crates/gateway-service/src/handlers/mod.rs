pub mod auth_handler;
pub mod health;
pub mod home;
pub mod metrics;
