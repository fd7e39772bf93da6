use std::sync::Arc;

use gatehouse_core::{KvStore, KvStoreError};
use thiserror::Error;

use crate::{denylist::TokenDenylist, sessions::SessionManager, tokens::Claims, tokens::TokenCodec};

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Session is no longer valid")]
    SessionInvalid,
    #[error(transparent)]
    Store(#[from] KvStoreError),
}

/// Full access-token validity check: signature and expiry, `type == access`,
/// jti not denylisted, and the backing session still alive. The session check
/// is what makes logout take effect before the JWT itself expires.
#[derive(Clone)]
pub struct AccessGuard<K> {
    codec: Arc<TokenCodec>,
    sessions: SessionManager<K>,
    denylist: TokenDenylist<K>,
}

impl<K: KvStore + Clone> AccessGuard<K> {
    pub fn new(
        codec: Arc<TokenCodec>,
        sessions: SessionManager<K>,
        denylist: TokenDenylist<K>,
    ) -> Self {
        Self {
            codec,
            sessions,
            denylist,
        }
    }

    pub async fn validate(&self, token: &str) -> Result<Claims, AccessError> {
        let claims = self.codec.verify_access_token(token).map_err(|e| {
            tracing::debug!(error = %e, "access token rejected");
            AccessError::InvalidToken
        })?;

        if claims.jti.is_empty() || self.denylist.contains(&claims.jti).await? {
            return Err(AccessError::InvalidToken);
        }

        if self.sessions.validate(&claims.sid).await?.is_none() {
            return Err(AccessError::SessionInvalid);
        }

        Ok(claims)
    }
}
