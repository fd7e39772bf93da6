//! Axum surface of the Gatehouse authentication service.
//!
//! Route handlers stay thin: they extract credentials and cookies, delegate to
//! the use cases in `gatehouse_application`, and translate the outcome into
//! HTTP statuses and Set-Cookie headers. All state lives in [`AuthState`],
//! which the service crate assembles from configuration.

pub mod cookies;
pub mod error;
pub mod routes;
pub mod state;

pub use cookies::CookiePolicy;
pub use error::ApiError;
pub use state::AuthState;
