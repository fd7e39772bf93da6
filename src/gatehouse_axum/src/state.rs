use std::sync::Arc;

use gatehouse_application::{
    AccessGuard, ForgotPasswordUseCase, GetProfileUseCase, LoginUseCase, LogoutUseCase,
    RateLimitPolicy, RateLimiter, RefreshTokenStore, RefreshUseCase, RegisterUseCase,
    ResetPasswordUseCase, ResetTokenStore, SessionManager, TokenCodec, TokenDenylist,
};
use gatehouse_core::{EmailClient, KvStore, UserStore};

use crate::cookies::CookiePolicy;

/// Everything the route handlers need, assembled once at startup.
///
/// Stores are cheap to clone (they share their backing connection through an
/// internal `Arc`), so each request clones what it needs into a use case.
pub struct AuthState<U, K, E>
where
    U: UserStore + Clone,
    K: KvStore + Clone,
    E: EmailClient + Clone,
{
    pub user_store: U,
    pub email_client: E,
    pub codec: Arc<TokenCodec>,
    pub sessions: SessionManager<K>,
    pub refresh_tokens: RefreshTokenStore<K>,
    pub denylist: TokenDenylist<K>,
    pub rate_limiter: RateLimiter<K>,
    pub reset_tokens: ResetTokenStore<K>,
    pub access_guard: AccessGuard<K>,
    pub login_limits: RateLimitPolicy,
    pub forgot_email_limits: RateLimitPolicy,
    pub forgot_ip_limits: RateLimitPolicy,
    pub hash_cost: u32,
    pub public_origin: String,
    pub cookies: CookiePolicy,
}

impl<U, K, E> Clone for AuthState<U, K, E>
where
    U: UserStore + Clone,
    K: KvStore + Clone,
    E: EmailClient + Clone,
{
    fn clone(&self) -> Self {
        Self {
            user_store: self.user_store.clone(),
            email_client: self.email_client.clone(),
            codec: self.codec.clone(),
            sessions: self.sessions.clone(),
            refresh_tokens: self.refresh_tokens.clone(),
            denylist: self.denylist.clone(),
            rate_limiter: self.rate_limiter.clone(),
            reset_tokens: self.reset_tokens.clone(),
            access_guard: self.access_guard.clone(),
            login_limits: self.login_limits,
            forgot_email_limits: self.forgot_email_limits,
            forgot_ip_limits: self.forgot_ip_limits,
            hash_cost: self.hash_cost,
            public_origin: self.public_origin.clone(),
            cookies: self.cookies.clone(),
        }
    }
}

impl<U, K, E> AuthState<U, K, E>
where
    U: UserStore + Clone,
    K: KvStore + Clone,
    E: EmailClient + Clone,
{
    pub fn register_use_case(&self) -> RegisterUseCase<U> {
        RegisterUseCase::new(self.user_store.clone(), self.hash_cost)
    }

    pub fn login_use_case(&self) -> LoginUseCase<U, K> {
        LoginUseCase::new(
            self.user_store.clone(),
            self.rate_limiter.clone(),
            self.sessions.clone(),
            self.refresh_tokens.clone(),
            self.codec.clone(),
            self.login_limits,
        )
    }

    pub fn refresh_use_case(&self) -> RefreshUseCase<U, K> {
        RefreshUseCase::new(
            self.user_store.clone(),
            self.sessions.clone(),
            self.refresh_tokens.clone(),
            self.codec.clone(),
        )
    }

    pub fn logout_use_case(&self) -> LogoutUseCase<K> {
        LogoutUseCase::new(
            self.sessions.clone(),
            self.refresh_tokens.clone(),
            self.denylist.clone(),
        )
    }

    pub fn forgot_password_use_case(&self) -> ForgotPasswordUseCase<U, K, E> {
        ForgotPasswordUseCase::new(
            self.user_store.clone(),
            self.rate_limiter.clone(),
            self.reset_tokens.clone(),
            self.email_client.clone(),
            self.forgot_email_limits,
            self.forgot_ip_limits,
            self.public_origin.clone(),
        )
    }

    pub fn reset_password_use_case(&self) -> ResetPasswordUseCase<U, K> {
        ResetPasswordUseCase::new(
            self.user_store.clone(),
            self.reset_tokens.clone(),
            self.sessions.clone(),
            self.hash_cost,
        )
    }

    pub fn get_profile_use_case(&self) -> GetProfileUseCase<U> {
        GetProfileUseCase::new(self.user_store.clone())
    }
}
