use gatehouse_core::{
    Email, EmailError, NewUser, Password, PasswordPolicyViolation, Role, UserProfile, UserStatus,
    UserStore, UserStoreError,
};
use secrecy::Secret;

use crate::password_hash::{PasswordHashError, compute_password_hash};

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
    #[error("Password does not meet the strength requirements")]
    WeakPassword(Vec<PasswordPolicyViolation>),
    #[error("An account with this email already exists")]
    DuplicateEmail,
    #[error("User store error: {0}")]
    UserStoreError(#[from] UserStoreError),
    #[error("Failed to hash password: {0}")]
    HashingError(#[from] PasswordHashError),
}

/// Register use case - creates a CUSTOMER account from validated input.
pub struct RegisterUseCase<U>
where
    U: UserStore,
{
    user_store: U,
    hash_cost: u32,
}

impl<U> RegisterUseCase<U>
where
    U: UserStore,
{
    pub fn new(user_store: U, hash_cost: u32) -> Self {
        Self {
            user_store,
            hash_cost,
        }
    }

    #[tracing::instrument(name = "RegisterUseCase::execute", skip(self, password))]
    pub async fn execute(
        &self,
        name: &str,
        email: &str,
        password: Secret<String>,
    ) -> Result<UserProfile, RegisterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegisterError::EmptyName);
        }

        let email = Email::parse(email)?;
        let password = Password::parse(password).map_err(RegisterError::WeakPassword)?;

        if self.user_store.find_by_email(&email).await?.is_some() {
            return Err(RegisterError::DuplicateEmail);
        }

        let password_hash =
            compute_password_hash(password.as_ref().clone(), self.hash_cost).await?;

        let user = self
            .user_store
            .create(NewUser {
                name: name.to_string(),
                email,
                password_hash,
                role: Role::Customer,
                status: UserStatus::Active,
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration for the same email.
                UserStoreError::UserAlreadyExists => RegisterError::DuplicateEmail,
                other => RegisterError::UserStoreError(other),
            })?;

        Ok(UserProfile::from(&user))
    }
}
