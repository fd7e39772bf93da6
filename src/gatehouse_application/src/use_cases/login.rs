use std::sync::Arc;

use gatehouse_core::{Email, KvStore, KvStoreError, UserStore, UserStoreError};
use secrecy::Secret;

use crate::{
    password_hash::{PasswordHashError, equalize_hash_effort, verify_password_hash},
    rate_limit::{RateLimitError, RateLimitPolicy, RateLimiter, RateScope},
    refresh_store::{RefreshRecord, RefreshTokenStore},
    sessions::SessionManager,
    tokens::{TokenCodec, TokenError, TokenIdentity, TokenPair},
};

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Too many login attempts, retry in {retry_after_minutes} minutes")]
    RateLimited { retry_after_minutes: u64 },
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Account is disabled")]
    AccountDisabled,
    #[error("User store error: {0}")]
    UserStoreError(#[from] UserStoreError),
    #[error("Key-value store error: {0}")]
    StoreError(#[from] KvStoreError),
    #[error("Failed to issue tokens: {0}")]
    TokenError(#[from] TokenError),
    #[error("Password hashing error: {0}")]
    HashingError(PasswordHashError),
}

/// Login use case - authenticates credentials, opens a session and mints the
/// session-bound token pair.
pub struct LoginUseCase<U, K>
where
    U: UserStore,
    K: KvStore + Clone,
{
    user_store: U,
    rate_limiter: RateLimiter<K>,
    sessions: SessionManager<K>,
    refresh_tokens: RefreshTokenStore<K>,
    codec: Arc<TokenCodec>,
    limits: RateLimitPolicy,
}

impl<U, K> LoginUseCase<U, K>
where
    U: UserStore,
    K: KvStore + Clone,
{
    pub fn new(
        user_store: U,
        rate_limiter: RateLimiter<K>,
        sessions: SessionManager<K>,
        refresh_tokens: RefreshTokenStore<K>,
        codec: Arc<TokenCodec>,
        limits: RateLimitPolicy,
    ) -> Self {
        Self {
            user_store,
            rate_limiter,
            sessions,
            refresh_tokens,
            codec,
            limits,
        }
    }

    #[tracing::instrument(
        name = "LoginUseCase::execute",
        skip(self, password, user_agent, ip_address)
    )]
    pub async fn execute(
        &self,
        email: &str,
        password: Secret<String>,
        user_agent: Option<String>,
        ip_address: Option<String>,
    ) -> Result<TokenPair, LoginError> {
        // A malformed email can never match an account; same uniform failure
        // as a wrong password.
        let Ok(email) = Email::parse(email) else {
            return Err(LoginError::InvalidCredentials);
        };

        // Checked before any credential lookup so a rate-limited caller learns
        // nothing about the account from response timing.
        self.rate_limiter
            .check(RateScope::Login, email.as_str(), self.limits)
            .await
            .map_err(|e| match e {
                RateLimitError::Exceeded {
                    retry_after_minutes,
                } => LoginError::RateLimited {
                    retry_after_minutes,
                },
                RateLimitError::Store(e) => LoginError::StoreError(e),
            })?;

        let Some(user) = self.user_store.find_by_email(&email).await? else {
            equalize_hash_effort().await;
            self.record_failure(&email).await;
            return Err(LoginError::InvalidCredentials);
        };

        match verify_password_hash(user.password_hash.clone(), password).await {
            Ok(()) => {}
            Err(PasswordHashError::Mismatch) => {
                self.record_failure(&email).await;
                return Err(LoginError::InvalidCredentials);
            }
            Err(other) => return Err(LoginError::HashingError(other)),
        }

        if !user.is_active() {
            // Deliberately distinct from InvalidCredentials; documented
            // tradeoff, the password was correct.
            return Err(LoginError::AccountDisabled);
        }

        self.rate_limiter
            .clear(RateScope::Login, email.as_str())
            .await?;

        let session = self
            .sessions
            .create(&user.id, user_agent, ip_address)
            .await?;

        let pair = self.codec.issue_token_pair(&TokenIdentity {
            user_id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            session_id: session.session_id.clone(),
        })?;

        self.refresh_tokens
            .put(
                &pair.refresh.jti,
                &RefreshRecord {
                    user_id: user.id.clone(),
                    session_id: session.session_id.clone(),
                },
            )
            .await?;

        tracing::info!(user_id = %user.id, session_id = %session.session_id, "login succeeded");
        Ok(pair)
    }

    async fn record_failure(&self, email: &Email) {
        if let Err(e) = self
            .rate_limiter
            .record_failure(RateScope::Login, email.as_str(), self.limits)
            .await
        {
            tracing::warn!(error = %e, "failed to record login attempt");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyNamespace;
    use crate::tokens::TokenCodecConfig;
    use gatehouse_adapters::persistence::{HashMapUserStore, InMemoryKvStore};
    use gatehouse_core::{NewUser, Role, UserStatus};

    const REFRESH_TTL: u64 = 604_800;

    fn components(kv: InMemoryKvStore) -> (RateLimiter<InMemoryKvStore>, SessionManager<InMemoryKvStore>, RefreshTokenStore<InMemoryKvStore>, Arc<TokenCodec>) {
        let keys = KeyNamespace::default();
        let codec = Arc::new(TokenCodec::new(&TokenCodecConfig {
            access_secret: Secret::from("access-secret".to_string()),
            refresh_secret: Secret::from("refresh-secret".to_string()),
            access_ttl_seconds: 900,
            refresh_ttl_seconds: REFRESH_TTL,
        }));
        (
            RateLimiter::new(kv.clone(), keys.clone()),
            SessionManager::new(kv.clone(), keys.clone(), REFRESH_TTL),
            RefreshTokenStore::new(kv, keys, REFRESH_TTL),
            codec,
        )
    }

    async fn seeded_user_store(status: UserStatus) -> HashMapUserStore {
        let store = HashMapUserStore::default();
        let hash = crate::password_hash::compute_password_hash(
            Secret::from("Abc12345!".to_string()),
            2,
        )
        .await
        .unwrap();
        store
            .create(NewUser {
                name: "Alice".to_string(),
                email: Email::parse("alice@example.com").unwrap(),
                password_hash: hash,
                role: Role::Customer,
                status,
            })
            .await
            .unwrap();
        store
    }

    fn use_case(
        users: HashMapUserStore,
        kv: InMemoryKvStore,
        limits: RateLimitPolicy,
    ) -> LoginUseCase<HashMapUserStore, InMemoryKvStore> {
        let (rate_limiter, sessions, refresh_tokens, codec) = components(kv);
        LoginUseCase::new(users, rate_limiter, sessions, refresh_tokens, codec, limits)
    }

    fn limits() -> RateLimitPolicy {
        RateLimitPolicy {
            max_attempts: 5,
            window_seconds: 300,
        }
    }

    #[tokio::test]
    async fn login_creates_session_and_refresh_record() {
        let kv = InMemoryKvStore::default();
        let users = seeded_user_store(UserStatus::Active).await;
        let use_case = use_case(users, kv.clone(), limits());

        let pair = use_case
            .execute(
                "alice@example.com",
                Secret::from("Abc12345!".to_string()),
                Some("test-agent".to_string()),
                None,
            )
            .await
            .unwrap();

        let keys = KeyNamespace::default();
        let sessions = SessionManager::new(kv.clone(), keys.clone(), REFRESH_TTL);
        let claims = TokenCodec::decode_unsafe(&pair.access.token).unwrap();

        let session = sessions.validate(&claims.sid).await.unwrap().unwrap();
        assert_eq!(session.user_agent.as_deref(), Some("test-agent"));

        let refresh_tokens = RefreshTokenStore::new(kv, keys, REFRESH_TTL);
        let record = refresh_tokens.get(&pair.refresh.jti).await.unwrap().unwrap();
        assert_eq!(record.session_id, claims.sid);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_fail_uniformly() {
        let kv = InMemoryKvStore::default();
        let users = seeded_user_store(UserStatus::Active).await;
        let use_case = use_case(users, kv, limits());

        let wrong = use_case
            .execute(
                "alice@example.com",
                Secret::from("Wrong1234!".to_string()),
                None,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(wrong, LoginError::InvalidCredentials));

        let unknown = use_case
            .execute(
                "nobody@example.com",
                Secret::from("Abc12345!".to_string()),
                None,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(unknown, LoginError::InvalidCredentials));
    }

    #[tokio::test]
    async fn disabled_account_is_reported_distinctly() {
        let kv = InMemoryKvStore::default();
        let users = seeded_user_store(UserStatus::Disabled).await;
        let use_case = use_case(users, kv, limits());

        let err = use_case
            .execute(
                "alice@example.com",
                Secret::from("Abc12345!".to_string()),
                None,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LoginError::AccountDisabled));
    }

    #[tokio::test]
    async fn sixth_attempt_is_rate_limited_even_with_correct_password() {
        let kv = InMemoryKvStore::default();
        let users = seeded_user_store(UserStatus::Active).await;
        let use_case = use_case(users, kv, limits());

        for _ in 0..5 {
            let err = use_case
                .execute(
                    "alice@example.com",
                    Secret::from("Wrong1234!".to_string()),
                    None,
                    None,
                )
                .await
                .unwrap_err();
            assert!(matches!(err, LoginError::InvalidCredentials));
        }

        let err = use_case
            .execute(
                "alice@example.com",
                Secret::from("Abc12345!".to_string()),
                None,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LoginError::RateLimited {
                retry_after_minutes: 5
            }
        ));
    }

    #[tokio::test]
    async fn successful_login_clears_the_attempt_counter() {
        let kv = InMemoryKvStore::default();
        let users = seeded_user_store(UserStatus::Active).await;
        let use_case = use_case(users, kv.clone(), limits());

        for _ in 0..4 {
            let _ = use_case
                .execute(
                    "alice@example.com",
                    Secret::from("Wrong1234!".to_string()),
                    None,
                    None,
                )
                .await;
        }

        use_case
            .execute(
                "alice@example.com",
                Secret::from("Abc12345!".to_string()),
                None,
                None,
            )
            .await
            .unwrap();

        // Counter reset: four more failures are allowed before the limit.
        let limiter = RateLimiter::new(kv, KeyNamespace::default());
        limiter
            .check(RateScope::Login, "alice@example.com", limits())
            .await
            .unwrap();
    }
}
