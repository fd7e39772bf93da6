use gatehouse_core::KvStore;

use crate::{
    denylist::TokenDenylist, refresh_store::RefreshTokenStore, sessions::SessionManager,
    tokens::TokenCodec,
};

/// Logout use case - best-effort cleanup of everything tied to a login.
///
/// Deleting the session is the step that matters: it immediately invalidates
/// every token carrying that `sid`. The refresh-record delete and the access
/// denylist entry are belt-and-braces, so each step runs regardless of the
/// others failing and logout always reports success.
pub struct LogoutUseCase<K>
where
    K: KvStore + Clone,
{
    sessions: SessionManager<K>,
    refresh_tokens: RefreshTokenStore<K>,
    denylist: TokenDenylist<K>,
}

impl<K> LogoutUseCase<K>
where
    K: KvStore + Clone,
{
    pub fn new(
        sessions: SessionManager<K>,
        refresh_tokens: RefreshTokenStore<K>,
        denylist: TokenDenylist<K>,
    ) -> Self {
        Self {
            sessions,
            refresh_tokens,
            denylist,
        }
    }

    #[tracing::instrument(name = "LogoutUseCase::execute", skip(self, access_token))]
    pub async fn execute(
        &self,
        session_id: Option<String>,
        refresh_jti: Option<String>,
        access_token: Option<String>,
    ) {
        if let Some(session_id) = session_id {
            if let Err(e) = self.sessions.delete(&session_id).await {
                tracing::warn!(error = %e, session_id, "failed to delete session on logout");
            }
        }

        if let Some(jti) = refresh_jti {
            if let Err(e) = self.refresh_tokens.remove(&jti).await {
                tracing::warn!(error = %e, jti, "failed to delete refresh record on logout");
            }
        }

        if let Some(token) = access_token {
            // The token may already be expired; decode without verifying so an
            // expired login can still be cleaned up.
            if let Some(claims) = TokenCodec::decode_unsafe(&token) {
                if !claims.jti.is_empty() {
                    let remaining = TokenCodec::remaining_ttl_seconds(&token);
                    if let Err(e) = self.denylist.block(&claims.jti, remaining).await {
                        tracing::warn!(error = %e, jti = claims.jti, "failed to denylist access token");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyNamespace;
    use crate::tokens::{TokenCodecConfig, TokenIdentity};
    use gatehouse_adapters::persistence::InMemoryKvStore;
    use gatehouse_core::{Email, Role};
    use secrecy::Secret;
    use std::sync::Arc;

    const REFRESH_TTL: u64 = 604_800;

    fn use_case(kv: InMemoryKvStore) -> LogoutUseCase<InMemoryKvStore> {
        let keys = KeyNamespace::default();
        LogoutUseCase::new(
            SessionManager::new(kv.clone(), keys.clone(), REFRESH_TTL),
            RefreshTokenStore::new(kv.clone(), keys.clone(), REFRESH_TTL),
            TokenDenylist::new(kv, keys),
        )
    }

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(&TokenCodecConfig {
            access_secret: Secret::from("access-secret".to_string()),
            refresh_secret: Secret::from("refresh-secret".to_string()),
            access_ttl_seconds: 900,
            refresh_ttl_seconds: REFRESH_TTL,
        }))
    }

    #[tokio::test]
    async fn logout_deletes_session_and_denylists_access_token() {
        let kv = InMemoryKvStore::default();
        let keys = KeyNamespace::default();
        let sessions = SessionManager::new(kv.clone(), keys.clone(), REFRESH_TTL);
        let session = sessions.create("user-1", None, None).await.unwrap();

        let codec = codec();
        let access = codec
            .issue_access_token(&TokenIdentity {
                user_id: "user-1".to_string(),
                email: Email::parse("alice@example.com").unwrap(),
                role: Role::Customer,
                session_id: session.session_id.clone(),
            })
            .unwrap();

        use_case(kv.clone())
            .execute(
                Some(session.session_id.clone()),
                None,
                Some(access.token.clone()),
            )
            .await;

        assert!(sessions.validate(&session.session_id).await.unwrap().is_none());

        let denylist = TokenDenylist::new(kv, keys);
        assert!(denylist.contains(&access.jti).await.unwrap());

        // The denylist entry self-expires with the token.
        let remaining = denylist.remaining_seconds(&access.jti).await.unwrap().unwrap();
        assert!(remaining <= 900, "remaining={remaining}");
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let kv = InMemoryKvStore::default();
        let sessions = SessionManager::new(kv.clone(), KeyNamespace::default(), REFRESH_TTL);
        let session = sessions.create("user-1", None, None).await.unwrap();

        let use_case = use_case(kv);
        use_case
            .execute(Some(session.session_id.clone()), None, None)
            .await;
        // Second logout with the already-deleted session id must not error.
        use_case
            .execute(Some(session.session_id), None, None)
            .await;
    }

    #[tokio::test]
    async fn logout_tolerates_garbage_access_token() {
        let kv = InMemoryKvStore::default();
        use_case(kv)
            .execute(None, None, Some("not-a-token".to_string()))
            .await;
    }
}
