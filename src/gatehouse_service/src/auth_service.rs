use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, request},
    routing::{get, post},
};
use gatehouse_adapters::config::{AllowedOrigins, Settings, TtlParseError, parse_ttl};
use gatehouse_application::{
    AccessGuard, KeyNamespace, RateLimitPolicy, RateLimiter, RefreshTokenStore, ResetTokenStore,
    SessionManager, TokenCodec, TokenCodecConfig, TokenDenylist,
};
use gatehouse_axum::{
    AuthState, CookiePolicy,
    routes::{
        forgot_password, healthz, login, logout, me, refresh, register, reset_password,
        verify_token,
    },
};
use gatehouse_core::{EmailClient, KvStore, UserStore};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::tracing::{make_span_with_request_id, on_request, on_response};

/// The authentication service: all auth routes mounted over a shared
/// [`AuthState`].
pub struct AuthService {
    router: Router,
}

impl AuthService {
    pub fn new<U, K, E>(state: AuthState<U, K, E>) -> Self
    where
        U: UserStore + Clone + 'static,
        K: KvStore + Clone + 'static,
        E: EmailClient + Clone + 'static,
    {
        let router = Router::new()
            .route("/register", post(register::<U, K, E>))
            .route("/login", post(login::<U, K, E>))
            .route("/refresh", post(refresh::<U, K, E>))
            .route("/logout", post(logout::<U, K, E>))
            .route("/forgot-password", post(forgot_password::<U, K, E>))
            .route("/reset-password", post(reset_password::<U, K, E>))
            .route("/me", get(me::<U, K, E>))
            .route("/verify-token", post(verify_token::<U, K, E>))
            .route("/healthz", get(healthz))
            .with_state(state);

        Self { router }
    }

    fn with_trace_layer(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(make_span_with_request_id)
                .on_request(on_request)
                .on_response(on_response),
        );
        self
    }

    /// Convert into a router that can be nested under another application.
    ///
    /// An absent or empty origin allow-list means no cross-origin access; the
    /// CORS layer is only installed when there is at least one origin to allow.
    pub fn as_nested_router(mut self, allowed_origins: Option<AllowedOrigins>) -> Router {
        if let Some(allowed_origins) = allowed_origins.filter(|origins| !origins.is_empty()) {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(
                    move |origin: &HeaderValue, _request_parts: &request::Parts| {
                        allowed_origins.contains(origin)
                    },
                ));

            self.router = self.router.layer(cors);
        }
        self.with_trace_layer().router
    }

    /// Run as a standalone server on the given listener.
    pub async fn run_standalone(
        self,
        listener: TcpListener,
        allowed_origins: Option<AllowedOrigins>,
    ) -> Result<(), std::io::Error> {
        let router = self.as_nested_router(allowed_origins);

        tracing::info!("Auth service listening on {}", listener.local_addr()?);

        axum::serve(listener, router).await
    }
}

/// Builds the shared route state from configuration and the chosen store
/// implementations.
pub fn build_auth_state<U, K, E>(
    settings: &Settings,
    user_store: U,
    kv: K,
    email_client: E,
) -> Result<AuthState<U, K, E>, TtlParseError>
where
    U: UserStore + Clone,
    K: KvStore + Clone,
    E: EmailClient + Clone,
{
    let access_ttl = settings.jwt.access_ttl_seconds()?;
    let refresh_ttl = settings.jwt.refresh_ttl_seconds()?;
    let reset_ttl = parse_ttl(&settings.reset.token_ttl)?;

    let codec = Arc::new(TokenCodec::new(&TokenCodecConfig {
        access_secret: settings.jwt.access_secret.clone(),
        refresh_secret: settings.jwt.refresh_secret.clone(),
        access_ttl_seconds: access_ttl,
        refresh_ttl_seconds: refresh_ttl,
    }));

    let keys = KeyNamespace::default();
    let sessions = SessionManager::new(kv.clone(), keys.clone(), refresh_ttl);
    let refresh_tokens = RefreshTokenStore::new(kv.clone(), keys.clone(), refresh_ttl);
    let denylist = TokenDenylist::new(kv.clone(), keys.clone());
    let rate_limiter = RateLimiter::new(kv.clone(), keys.clone());
    let reset_tokens = ResetTokenStore::new(kv, keys, reset_ttl);
    let access_guard = AccessGuard::new(codec.clone(), sessions.clone(), denylist.clone());

    Ok(AuthState {
        user_store,
        email_client,
        codec,
        sessions,
        refresh_tokens,
        denylist,
        rate_limiter,
        reset_tokens,
        access_guard,
        login_limits: RateLimitPolicy {
            max_attempts: settings.rate_limits.login_max_attempts,
            window_seconds: parse_ttl(&settings.rate_limits.login_window)?,
        },
        forgot_email_limits: RateLimitPolicy {
            max_attempts: settings.rate_limits.forgot_email_max_attempts,
            window_seconds: parse_ttl(&settings.rate_limits.forgot_email_window)?,
        },
        forgot_ip_limits: RateLimitPolicy {
            max_attempts: settings.rate_limits.forgot_ip_max_attempts,
            window_seconds: parse_ttl(&settings.rate_limits.forgot_ip_window)?,
        },
        hash_cost: settings.hashing.cost,
        public_origin: settings.application.public_origin.clone(),
        cookies: CookiePolicy {
            access_name: settings.cookies.access_name.clone(),
            refresh_name: settings.cookies.refresh_name.clone(),
            secure: settings.cookies.secure,
        },
    })
}
