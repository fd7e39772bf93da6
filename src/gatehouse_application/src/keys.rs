/// Key prefixes for everything the auth core writes to the key-value store.
///
/// Prefixes prevent collisions with other tenants of the shared store and are
/// configurable so deployments can namespace per environment.
#[derive(Debug, Clone)]
pub struct KeyNamespace {
    pub session: String,
    pub user_sessions: String,
    pub refresh: String,
    pub denylist: String,
    pub reset: String,
    pub attempts: String,
}

impl Default for KeyNamespace {
    fn default() -> Self {
        Self {
            session: "session".to_string(),
            user_sessions: "user-sessions".to_string(),
            refresh: "refresh-token".to_string(),
            denylist: "denylist".to_string(),
            reset: "password-reset".to_string(),
            attempts: "attempts".to_string(),
        }
    }
}

impl KeyNamespace {
    pub fn session_key(&self, session_id: &str) -> String {
        format!("{}:{}", self.session, session_id)
    }

    /// Marker key indexing a session under its owner, so that all of a user's
    /// sessions can be found and revoked without scanning every session.
    pub fn user_session_key(&self, user_id: &str, session_id: &str) -> String {
        format!("{}:{}:{}", self.user_sessions, user_id, session_id)
    }

    pub fn user_session_pattern(&self, user_id: &str) -> String {
        format!("{}:{}:*", self.user_sessions, user_id)
    }

    pub fn refresh_key(&self, jti: &str) -> String {
        format!("{}:{}", self.refresh, jti)
    }

    pub fn denylist_key(&self, jti: &str) -> String {
        format!("{}:{}", self.denylist, jti)
    }

    pub fn reset_key(&self, token: &str) -> String {
        format!("{}:{}", self.reset, token)
    }

    pub fn attempt_key(&self, scope: &str, identifier: &str) -> String {
        format!("{}:{}:{}", self.attempts, scope, identifier)
    }
}
