//! Application layer of the Gatehouse authentication service.
//!
//! Composes the domain ports from `gatehouse_core` into the auth flows:
//! dual-token issuance bound to server-side sessions, single-use refresh
//! rotation, a jti denylist for immediate access-token revocation, and
//! rate-limited login / password-reset.

pub mod access;
pub mod denylist;
pub mod keys;
pub mod password_hash;
pub mod rate_limit;
pub mod refresh_store;
pub mod reset_tokens;
pub mod sessions;
pub mod tokens;
pub mod use_cases;

pub use access::{AccessError, AccessGuard};
pub use denylist::TokenDenylist;
pub use keys::KeyNamespace;
pub use password_hash::{PasswordHashError, compute_password_hash, verify_password_hash};
pub use rate_limit::{RateLimitError, RateLimitPolicy, RateLimiter, RateScope};
pub use refresh_store::{RefreshRecord, RefreshTokenStore};
pub use reset_tokens::ResetTokenStore;
pub use sessions::SessionManager;
pub use tokens::{
    Claims, IssuedToken, TokenCodec, TokenCodecConfig, TokenError, TokenIdentity, TokenPair,
    TokenType,
};
pub use use_cases::{
    forgot_password::{ForgotPasswordError, ForgotPasswordUseCase},
    get_profile::{GetProfileError, GetProfileUseCase},
    login::{LoginError, LoginUseCase},
    logout::LogoutUseCase,
    refresh::{RefreshError, RefreshUseCase},
    register::{RegisterError, RegisterUseCase},
    reset_password::{ResetPasswordError, ResetPasswordUseCase},
};
