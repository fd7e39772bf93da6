use gatehouse_core::{Email, EmailClient, KvStore, KvStoreError, UserStore, UserStoreError};

use crate::{
    rate_limit::{RateLimitError, RateLimitPolicy, RateLimiter, RateScope},
    reset_tokens::ResetTokenStore,
};

#[derive(Debug, thiserror::Error)]
pub enum ForgotPasswordError {
    #[error("Too many attempts, retry in {retry_after_minutes} minutes")]
    RateLimited { retry_after_minutes: u64 },
    #[error("User store error: {0}")]
    UserStoreError(#[from] UserStoreError),
    #[error("Key-value store error: {0}")]
    StoreError(#[from] KvStoreError),
}

/// Forgot-password use case - issues a reset token and emails a reset link.
///
/// Succeeds identically whether or not the account exists, so the endpoint
/// cannot be used to enumerate emails. Only rate limiting is allowed to fail
/// loudly.
pub struct ForgotPasswordUseCase<U, K, E>
where
    U: UserStore,
    K: KvStore + Clone,
    E: EmailClient,
{
    user_store: U,
    rate_limiter: RateLimiter<K>,
    reset_tokens: ResetTokenStore<K>,
    email_client: E,
    email_limits: RateLimitPolicy,
    ip_limits: RateLimitPolicy,
    public_origin: String,
}

impl<U, K, E> ForgotPasswordUseCase<U, K, E>
where
    U: UserStore,
    K: KvStore + Clone,
    E: EmailClient,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_store: U,
        rate_limiter: RateLimiter<K>,
        reset_tokens: ResetTokenStore<K>,
        email_client: E,
        email_limits: RateLimitPolicy,
        ip_limits: RateLimitPolicy,
        public_origin: String,
    ) -> Self {
        Self {
            user_store,
            rate_limiter,
            reset_tokens,
            email_client,
            email_limits,
            ip_limits,
            public_origin,
        }
    }

    #[tracing::instrument(name = "ForgotPasswordUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        email: &str,
        ip_address: Option<String>,
    ) -> Result<(), ForgotPasswordError> {
        let Ok(email) = Email::parse(email) else {
            // A malformed address matches no account; acknowledge and move on.
            return Ok(());
        };

        self.check(RateScope::ForgotPasswordEmail, email.as_str(), self.email_limits)
            .await?;
        if let Some(ip) = ip_address.as_deref() {
            self.check(RateScope::ForgotPasswordIp, ip, self.ip_limits)
                .await?;
        }

        // Attempts are counted regardless of outcome; a flood of requests for
        // unknown addresses is still a flood.
        self.rate_limiter
            .record_failure(RateScope::ForgotPasswordEmail, email.as_str(), self.email_limits)
            .await?;
        if let Some(ip) = ip_address.as_deref() {
            self.rate_limiter
                .record_failure(RateScope::ForgotPasswordIp, ip, self.ip_limits)
                .await?;
        }

        let user = match self.user_store.find_by_email(&email).await? {
            Some(user) if user.is_active() => user,
            _ => return Ok(()),
        };

        let token = self.reset_tokens.issue(&user.id).await?;
        let reset_url = format!("{}/reset-password?token={}", self.public_origin, token);

        if let Err(e) = self
            .email_client
            .send_password_reset_email(&user.email, &user.name, &reset_url)
            .await
        {
            // Delivery failures are logged, never surfaced to the caller.
            tracing::warn!(error = %e, user_id = %user.id, "failed to send password reset email");
        }

        Ok(())
    }

    async fn check(
        &self,
        scope: RateScope,
        identifier: &str,
        policy: RateLimitPolicy,
    ) -> Result<(), ForgotPasswordError> {
        self.rate_limiter
            .check(scope, identifier, policy)
            .await
            .map_err(|e| match e {
                RateLimitError::Exceeded {
                    retry_after_minutes,
                } => ForgotPasswordError::RateLimited {
                    retry_after_minutes,
                },
                RateLimitError::Store(e) => ForgotPasswordError::StoreError(e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyNamespace;
    use gatehouse_adapters::email::MockEmailClient;
    use gatehouse_adapters::persistence::{HashMapUserStore, InMemoryKvStore};
    use gatehouse_core::{NewUser, Role, UserStatus};
    use secrecy::Secret;

    fn policy(max_attempts: i64) -> RateLimitPolicy {
        RateLimitPolicy {
            max_attempts,
            window_seconds: 600,
        }
    }

    async fn seeded_users() -> HashMapUserStore {
        let store = HashMapUserStore::default();
        store
            .create(NewUser {
                name: "Alice".to_string(),
                email: Email::parse("alice@example.com").unwrap(),
                password_hash: Secret::from("$argon2id$placeholder".to_string()),
                role: Role::Customer,
                status: UserStatus::Active,
            })
            .await
            .unwrap();
        store
    }

    fn use_case(
        users: HashMapUserStore,
        kv: InMemoryKvStore,
        email_client: MockEmailClient,
        max_attempts: i64,
    ) -> ForgotPasswordUseCase<HashMapUserStore, InMemoryKvStore, MockEmailClient> {
        let keys = KeyNamespace::default();
        ForgotPasswordUseCase::new(
            users,
            RateLimiter::new(kv.clone(), keys.clone()),
            ResetTokenStore::new(kv, keys, 1800),
            email_client,
            policy(max_attempts),
            policy(max_attempts * 3),
            "https://blog.example.com".to_string(),
        )
    }

    #[tokio::test]
    async fn known_email_receives_a_reset_link() {
        let users = seeded_users().await;
        let email_client = MockEmailClient::default();
        let use_case = use_case(users, InMemoryKvStore::default(), email_client.clone(), 3);

        use_case
            .execute("alice@example.com", Some("10.0.0.1".to_string()))
            .await
            .unwrap();

        let sent = email_client.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient.as_str(), "alice@example.com");
        assert!(sent[0]
            .reset_url
            .starts_with("https://blog.example.com/reset-password?token="));
    }

    #[tokio::test]
    async fn unknown_email_acknowledges_without_sending() {
        let users = seeded_users().await;
        let email_client = MockEmailClient::default();
        let use_case = use_case(users, InMemoryKvStore::default(), email_client.clone(), 3);

        use_case.execute("nobody@example.com", None).await.unwrap();

        assert!(email_client.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn email_scope_rate_limits_independently() {
        let users = seeded_users().await;
        let email_client = MockEmailClient::default();
        let use_case = use_case(users, InMemoryKvStore::default(), email_client, 2);

        use_case.execute("alice@example.com", None).await.unwrap();
        use_case.execute("alice@example.com", None).await.unwrap();

        let err = use_case
            .execute("alice@example.com", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ForgotPasswordError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn attempts_count_even_for_unknown_emails() {
        let users = seeded_users().await;
        let email_client = MockEmailClient::default();
        let use_case = use_case(users, InMemoryKvStore::default(), email_client, 2);

        use_case.execute("nobody@example.com", None).await.unwrap();
        use_case.execute("nobody@example.com", None).await.unwrap();

        let err = use_case
            .execute("nobody@example.com", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ForgotPasswordError::RateLimited { .. }));
    }
}
