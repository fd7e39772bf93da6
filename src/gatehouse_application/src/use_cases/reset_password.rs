use gatehouse_core::{
    KvStore, KvStoreError, Password, PasswordPolicyViolation, UserStore, UserStoreError,
};
use secrecy::Secret;

use crate::{
    password_hash::{PasswordHashError, compute_password_hash},
    reset_tokens::ResetTokenStore,
    sessions::SessionManager,
};

#[derive(Debug, thiserror::Error)]
pub enum ResetPasswordError {
    #[error("Password does not meet the strength requirements")]
    WeakPassword(Vec<PasswordPolicyViolation>),
    #[error("Invalid or expired reset token")]
    InvalidOrExpiredToken,
    #[error("User store error: {0}")]
    UserStoreError(#[from] UserStoreError),
    #[error("Key-value store error: {0}")]
    StoreError(#[from] KvStoreError),
    #[error("Failed to hash password: {0}")]
    HashingError(#[from] PasswordHashError),
}

/// Reset-password use case - consumes a reset token, replaces the hash and
/// revokes every session the user had open.
pub struct ResetPasswordUseCase<U, K>
where
    U: UserStore,
    K: KvStore + Clone,
{
    user_store: U,
    reset_tokens: ResetTokenStore<K>,
    sessions: SessionManager<K>,
    hash_cost: u32,
}

impl<U, K> ResetPasswordUseCase<U, K>
where
    U: UserStore,
    K: KvStore + Clone,
{
    pub fn new(
        user_store: U,
        reset_tokens: ResetTokenStore<K>,
        sessions: SessionManager<K>,
        hash_cost: u32,
    ) -> Self {
        Self {
            user_store,
            reset_tokens,
            sessions,
            hash_cost,
        }
    }

    #[tracing::instrument(name = "ResetPasswordUseCase::execute", skip(self, token, new_password))]
    pub async fn execute(
        &self,
        token: &str,
        new_password: Secret<String>,
    ) -> Result<(), ResetPasswordError> {
        let new_password =
            Password::parse(new_password).map_err(ResetPasswordError::WeakPassword)?;

        let user_id = self
            .reset_tokens
            .lookup(token)
            .await?
            .ok_or(ResetPasswordError::InvalidOrExpiredToken)?;

        // Same generic failure whether the token is bad or the account has
        // been disabled since the email went out.
        let user = match self.user_store.find_by_id(&user_id).await? {
            Some(user) if user.is_active() => user,
            _ => return Err(ResetPasswordError::InvalidOrExpiredToken),
        };

        let password_hash =
            compute_password_hash(new_password.as_ref().clone(), self.hash_cost).await?;
        self.user_store
            .update_password_hash(&user.id, password_hash)
            .await?;

        self.reset_tokens.consume(token).await?;

        let revoked = self.sessions.revoke_all_for_user(&user.id).await?;
        tracing::info!(user_id = %user.id, revoked, "password reset, sessions revoked");

        Ok(())
    }
}
