//! Wiring layer: assembles the stores, token codec and policies from
//! configuration, mounts the routes and runs the server.

pub mod auth_service;
pub mod tracing;

pub use crate::auth_service::{AuthService, build_auth_state};
pub use crate::tracing::init_tracing;
