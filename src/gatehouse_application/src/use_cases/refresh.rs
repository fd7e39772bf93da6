use std::sync::Arc;

use gatehouse_core::{KvStore, KvStoreError, UserStore, UserStoreError};

use crate::{
    refresh_store::{RefreshRecord, RefreshTokenStore},
    sessions::SessionManager,
    tokens::{TokenCodec, TokenError, TokenIdentity, TokenPair},
};

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("Invalid refresh token")]
    InvalidRefreshToken,
    #[error("Session is no longer valid")]
    SessionInvalid,
    #[error("User not found")]
    UserNotFound,
    #[error("Account is disabled")]
    AccountDisabled,
    #[error("User store error: {0}")]
    UserStoreError(#[from] UserStoreError),
    #[error("Key-value store error: {0}")]
    StoreError(#[from] KvStoreError),
    #[error("Failed to issue tokens: {0}")]
    TokenError(#[from] TokenError),
}

/// Refresh use case - rotates a verified refresh token into a new pair and
/// slides the session forward.
///
/// The caller has already verified the refresh token cryptographically; this
/// use case owns the stateful checks (live session, unconsumed record) and the
/// rotation.
pub struct RefreshUseCase<U, K>
where
    U: UserStore,
    K: KvStore + Clone,
{
    user_store: U,
    sessions: SessionManager<K>,
    refresh_tokens: RefreshTokenStore<K>,
    codec: Arc<TokenCodec>,
}

impl<U, K> RefreshUseCase<U, K>
where
    U: UserStore,
    K: KvStore + Clone,
{
    pub fn new(
        user_store: U,
        sessions: SessionManager<K>,
        refresh_tokens: RefreshTokenStore<K>,
        codec: Arc<TokenCodec>,
    ) -> Self {
        Self {
            user_store,
            sessions,
            refresh_tokens,
            codec,
        }
    }

    #[tracing::instrument(name = "RefreshUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        user_id: &str,
        refresh_jti: &str,
        session_id: &str,
    ) -> Result<TokenPair, RefreshError> {
        let session = self.sessions.validate(session_id).await?;
        match session {
            Some(record) if record.user_id == user_id => {}
            _ => return Err(RefreshError::SessionInvalid),
        }

        // Single-use: a rotated-away jti has no record and must not mint
        // another pair, even while the session is still alive.
        let record = self.refresh_tokens.get(refresh_jti).await?;
        match record {
            Some(r) if r.user_id == user_id && r.session_id == session_id => {}
            _ => return Err(RefreshError::InvalidRefreshToken),
        }

        let user = self
            .user_store
            .find_by_id(user_id)
            .await?
            .ok_or(RefreshError::UserNotFound)?;
        if !user.is_active() {
            return Err(RefreshError::AccountDisabled);
        }

        let pair = self.codec.issue_token_pair(&TokenIdentity {
            user_id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            session_id: session_id.to_string(),
        })?;

        // Rotation is three best-effort single-key writes, completed before
        // the pair is handed out so the new refresh token is never unbacked.
        // A crash partway leaves either a dangling old record or a missing new
        // one; the session remains the authority, so neither extends access.
        if let Err(e) = self.refresh_tokens.remove(refresh_jti).await {
            tracing::warn!(error = %e, refresh_jti, "failed to delete rotated refresh record");
        }
        self.refresh_tokens
            .put(
                &pair.refresh.jti,
                &RefreshRecord {
                    user_id: user.id.clone(),
                    session_id: session_id.to_string(),
                },
            )
            .await?;
        match self
            .sessions
            .touch(session_id, self.codec.refresh_ttl_seconds())
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(session_id, "session disappeared during refresh rotation");
            }
            Err(e) => {
                tracing::warn!(error = %e, session_id, "failed to slide session TTL");
            }
        }

        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyNamespace;
    use crate::rate_limit::{RateLimitPolicy, RateLimiter};
    use crate::tokens::TokenCodecConfig;
    use crate::use_cases::login::LoginUseCase;
    use gatehouse_adapters::persistence::{HashMapUserStore, InMemoryKvStore};
    use gatehouse_core::{Email, NewUser, Role, UserStatus};
    use secrecy::Secret;

    const REFRESH_TTL: u64 = 604_800;

    struct Fixture {
        kv: InMemoryKvStore,
        users: HashMapUserStore,
        codec: Arc<TokenCodec>,
    }

    impl Fixture {
        async fn new() -> Self {
            let users = HashMapUserStore::default();
            let hash = crate::password_hash::compute_password_hash(
                Secret::from("Abc12345!".to_string()),
                2,
            )
            .await
            .unwrap();
            users
                .create(NewUser {
                    name: "Alice".to_string(),
                    email: Email::parse("alice@example.com").unwrap(),
                    password_hash: hash,
                    role: Role::Customer,
                    status: UserStatus::Active,
                })
                .await
                .unwrap();

            let codec = Arc::new(TokenCodec::new(&TokenCodecConfig {
                access_secret: Secret::from("access-secret".to_string()),
                refresh_secret: Secret::from("refresh-secret".to_string()),
                access_ttl_seconds: 900,
                refresh_ttl_seconds: REFRESH_TTL,
            }));

            Self {
                kv: InMemoryKvStore::default(),
                users,
                codec,
            }
        }

        fn sessions(&self) -> SessionManager<InMemoryKvStore> {
            SessionManager::new(self.kv.clone(), KeyNamespace::default(), REFRESH_TTL)
        }

        fn refresh_tokens(&self) -> RefreshTokenStore<InMemoryKvStore> {
            RefreshTokenStore::new(self.kv.clone(), KeyNamespace::default(), REFRESH_TTL)
        }

        async fn login(&self) -> TokenPair {
            let use_case = LoginUseCase::new(
                self.users.clone(),
                RateLimiter::new(self.kv.clone(), KeyNamespace::default()),
                self.sessions(),
                self.refresh_tokens(),
                self.codec.clone(),
                RateLimitPolicy {
                    max_attempts: 5,
                    window_seconds: 300,
                },
            );
            use_case
                .execute(
                    "alice@example.com",
                    Secret::from("Abc12345!".to_string()),
                    None,
                    None,
                )
                .await
                .unwrap()
        }

        fn refresh_use_case(&self) -> RefreshUseCase<HashMapUserStore, InMemoryKvStore> {
            RefreshUseCase::new(
                self.users.clone(),
                self.sessions(),
                self.refresh_tokens(),
                self.codec.clone(),
            )
        }
    }

    #[tokio::test]
    async fn refresh_rotates_the_record() {
        let fixture = Fixture::new().await;
        let pair = fixture.login().await;
        let claims = fixture.codec.verify_refresh_token(&pair.refresh.token).unwrap();

        let use_case = fixture.refresh_use_case();
        let new_pair = use_case
            .execute(&claims.sub, &claims.jti, &claims.sid)
            .await
            .unwrap();

        assert_ne!(new_pair.refresh.jti, pair.refresh.jti);

        // Old record is gone, new record is live.
        let store = fixture.refresh_tokens();
        assert!(store.get(&pair.refresh.jti).await.unwrap().is_none());
        let record = store.get(&new_pair.refresh.jti).await.unwrap().unwrap();
        assert_eq!(record.session_id, claims.sid);

        // New tokens keep the same session id.
        let new_claims = fixture
            .codec
            .verify_refresh_token(&new_pair.refresh.token)
            .unwrap();
        assert_eq!(new_claims.sid, claims.sid);
    }

    #[tokio::test]
    async fn consumed_refresh_token_cannot_be_replayed() {
        let fixture = Fixture::new().await;
        let pair = fixture.login().await;
        let claims = fixture.codec.verify_refresh_token(&pair.refresh.token).unwrap();

        let use_case = fixture.refresh_use_case();
        use_case
            .execute(&claims.sub, &claims.jti, &claims.sid)
            .await
            .unwrap();

        let err = use_case
            .execute(&claims.sub, &claims.jti, &claims.sid)
            .await
            .unwrap_err();
        assert!(matches!(err, RefreshError::InvalidRefreshToken));
    }

    #[tokio::test]
    async fn refresh_after_session_revocation_fails() {
        let fixture = Fixture::new().await;
        let pair = fixture.login().await;
        let claims = fixture.codec.verify_refresh_token(&pair.refresh.token).unwrap();

        fixture.sessions().delete(&claims.sid).await.unwrap();

        let err = fixture
            .refresh_use_case()
            .execute(&claims.sub, &claims.jti, &claims.sid)
            .await
            .unwrap_err();
        assert!(matches!(err, RefreshError::SessionInvalid));
    }

    #[tokio::test]
    async fn refresh_for_mismatched_user_fails() {
        let fixture = Fixture::new().await;
        let pair = fixture.login().await;
        let claims = fixture.codec.verify_refresh_token(&pair.refresh.token).unwrap();

        let err = fixture
            .refresh_use_case()
            .execute("someone-else", &claims.jti, &claims.sid)
            .await
            .unwrap_err();
        assert!(matches!(err, RefreshError::SessionInvalid));
    }
}
