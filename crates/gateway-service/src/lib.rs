//! Token Gateway Service Library
//!
//! A bearer-token authentication gateway: validates user credentials,
//! issues signed access/refresh token pairs, and guards protected routes
//! by verifying the bearer token presented on each request.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - Cryptographic operations (JWT signing, password hashing)
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - Request guards for protected routes
//! - `models` - Data models
//! - `services` - Business logic layer

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;
