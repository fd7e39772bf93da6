//! # Gatehouse - Session-Based JWT Authentication Service
//!
//! Facade crate that re-exports the public APIs of the Gatehouse components.
//! Depend on this crate to get the whole stack in one place.
//!
//! ## Structure
//!
//! - **Core domain types**: `Email`, `Password`, `User`, `SessionRecord`, etc.
//! - **Ports**: `UserStore`, `KvStore`, `EmailClient`
//! - **Use cases**: `RegisterUseCase`, `LoginUseCase`, `RefreshUseCase`, etc.
//! - **Adapters**: `PostgresUserStore`, `RedisKvStore`, `PostmarkEmailClient`, etc.
//! - **Service**: `AuthService` - the runnable HTTP service

/// Core domain types and value objects
pub mod core {
    pub use gatehouse_core::*;
}

pub use gatehouse_core::{
    Email, EmailError, Password, PasswordPolicyViolation, Role, SessionRecord, User, UserProfile,
    UserStatus,
};

/// Port (trait) definitions
pub mod ports {
    pub use gatehouse_core::{
        EmailClient, EmailClientError, KvStore, KvStoreError, UserStore, UserStoreError,
    };
}

pub use gatehouse_core::{
    EmailClient, EmailClientError, KvStore, KvStoreError, UserStore, UserStoreError,
};

/// Application use cases and auth components
pub mod application {
    pub use gatehouse_application::*;
}

pub use gatehouse_application::{
    AccessGuard, ForgotPasswordUseCase, GetProfileUseCase, LoginUseCase, LogoutUseCase,
    RateLimiter, RefreshUseCase, RegisterUseCase, ResetPasswordUseCase, SessionManager,
    TokenCodec, TokenDenylist,
};

/// Infrastructure adapters
pub mod adapters {
    /// Persistence implementations
    pub mod persistence {
        pub use gatehouse_adapters::persistence::*;
    }

    /// Email client implementations
    pub mod email {
        pub use gatehouse_adapters::email::*;
    }

    /// Configuration
    pub mod config {
        pub use gatehouse_adapters::config::*;
    }
}

pub use gatehouse_adapters::{
    email::{MockEmailClient, PostmarkEmailClient},
    persistence::{HashMapUserStore, InMemoryKvStore, PostgresUserStore, RedisKvStore},
};

/// HTTP surface (route handlers, state, errors)
pub mod http_api {
    pub use gatehouse_axum::*;
}

pub use gatehouse_axum::{ApiError, AuthState, CookiePolicy};

/// Runnable auth service
pub use gatehouse_service::{AuthService, build_auth_state, init_tracing};

/// Re-export async-trait for implementing the port traits
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};

pub use http;
