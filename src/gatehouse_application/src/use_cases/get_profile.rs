use gatehouse_core::{UserProfile, UserStore, UserStoreError};

#[derive(Debug, thiserror::Error)]
pub enum GetProfileError {
    #[error("User not found")]
    UserNotFound,
    #[error("User store error: {0}")]
    UserStoreError(#[from] UserStoreError),
}

/// Get-profile use case - read-through to the user directory.
pub struct GetProfileUseCase<U>
where
    U: UserStore,
{
    user_store: U,
}

impl<U> GetProfileUseCase<U>
where
    U: UserStore,
{
    pub fn new(user_store: U) -> Self {
        Self { user_store }
    }

    #[tracing::instrument(name = "GetProfileUseCase::execute", skip(self))]
    pub async fn execute(&self, user_id: &str) -> Result<UserProfile, GetProfileError> {
        let user = self
            .user_store
            .find_by_id(user_id)
            .await?
            .ok_or(GetProfileError::UserNotFound)?;

        Ok(UserProfile::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_adapters::persistence::HashMapUserStore;
    use gatehouse_core::{Email, NewUser, Role, UserStatus};
    use secrecy::Secret;

    #[tokio::test]
    async fn profile_is_returned_without_the_hash() {
        let store = HashMapUserStore::default();
        let user = store
            .create(NewUser {
                name: "Alice".to_string(),
                email: Email::parse("alice@example.com").unwrap(),
                password_hash: Secret::from("$argon2id$secret".to_string()),
                role: Role::Staff,
                status: UserStatus::Active,
            })
            .await
            .unwrap();

        let profile = GetProfileUseCase::new(store).execute(&user.id).await.unwrap();
        assert_eq!(profile.id, user.id);
        assert_eq!(profile.role, Role::Staff);

        let serialized = serde_json::to_string(&profile).unwrap();
        assert!(!serialized.contains("argon2id"));
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let store = HashMapUserStore::default();
        let err = GetProfileUseCase::new(store)
            .execute("no-such-id")
            .await
            .unwrap_err();
        assert!(matches!(err, GetProfileError::UserNotFound));
    }
}
