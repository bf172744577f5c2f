//! Shared primitives for the token gateway.

#![warn(clippy::pedantic)]

/// Module for JWT claim types, size limits and header inspection
pub mod jwt;

/// Module for secret types that prevent accidental logging
pub mod secret;
