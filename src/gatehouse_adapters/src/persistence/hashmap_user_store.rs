use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use secrecy::Secret;
use tokio::sync::RwLock;
use uuid::Uuid;

use gatehouse_core::{Email, NewUser, User, UserStore, UserStoreError};

/// In-memory `UserStore` for tests and local development.
#[derive(Clone, Default)]
pub struct HashMapUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

#[async_trait::async_trait]
impl UserStore for HashMapUserStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserStoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| &u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, UserStoreError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn create(&self, fields: NewUser) -> Result<User, UserStoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == fields.email) {
            return Err(UserStoreError::UserAlreadyExists);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: fields.name,
            email: fields.email,
            password_hash: fields.password_hash,
            role: fields.role,
            status: fields.status,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn update_password_hash(
        &self,
        id: &str,
        password_hash: Secret<String>,
    ) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(id).ok_or(UserStoreError::UserNotFound)?;
        user.password_hash = password_hash;
        user.updated_at = Utc::now();
        Ok(())
    }
}
