use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use gatehouse_core::{Email, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims carried by both token kinds. `type` distinguishes them, `sid` binds
/// the token to a server-side session, `jti` identifies the individual token
/// for denylisting (access) and single-use rotation (refresh).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub email: Email,
    pub role: Role,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub sid: String,
    #[serde(default)]
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// The identity a token pair is minted for.
#[derive(Debug, Clone)]
pub struct TokenIdentity {
    pub user_id: String,
    pub email: Email,
    pub role: Role,
    pub session_id: String,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_in_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

#[derive(Debug, Error, PartialEq)]
pub enum TokenError {
    #[error("Invalid token signature")]
    InvalidSignature,
    #[error("Token has expired")]
    Expired,
    #[error("Unexpected token type")]
    WrongType,
    #[error("Missing jti claim")]
    MissingJti,
    #[error("Failed to encode token: {0}")]
    Encoding(String),
}

pub struct TokenCodecConfig {
    pub access_secret: Secret<String>,
    pub refresh_secret: Secret<String>,
    pub access_ttl_seconds: u64,
    pub refresh_ttl_seconds: u64,
}

/// Signs and verifies both token kinds.
///
/// Access and refresh differ only in signing key, lifetime and expected
/// `type` claim, so both are instances of one `TokenPolicy`.
pub struct TokenCodec {
    access: TokenPolicy,
    refresh: TokenPolicy,
}

struct TokenPolicy {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: u64,
    token_type: TokenType,
}

impl TokenPolicy {
    fn new(secret: &Secret<String>, ttl_seconds: u64, token_type: TokenType) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            ttl_seconds,
            token_type,
        }
    }

    fn issue(&self, identity: &TokenIdentity) -> Result<IssuedToken, TokenError> {
        let now = Utc::now().timestamp();
        let jti = Uuid::new_v4().to_string();
        let claims = Claims {
            sub: identity.user_id.clone(),
            email: identity.email.clone(),
            role: identity.role,
            token_type: self.token_type,
            sid: identity.session_id.clone(),
            jti: jti.clone(),
            iat: now,
            exp: now + self.ttl_seconds as i64,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;

        Ok(IssuedToken {
            token,
            jti,
            expires_in_seconds: self.ttl_seconds,
        })
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                kind => {
                    tracing::debug!(?kind, "token verification failed");
                    TokenError::InvalidSignature
                }
            })?;

        if claims.token_type != self.token_type {
            return Err(TokenError::WrongType);
        }

        Ok(claims)
    }
}

impl TokenCodec {
    pub fn new(config: &TokenCodecConfig) -> Self {
        Self {
            access: TokenPolicy::new(
                &config.access_secret,
                config.access_ttl_seconds,
                TokenType::Access,
            ),
            refresh: TokenPolicy::new(
                &config.refresh_secret,
                config.refresh_ttl_seconds,
                TokenType::Refresh,
            ),
        }
    }

    pub fn access_ttl_seconds(&self) -> u64 {
        self.access.ttl_seconds
    }

    pub fn refresh_ttl_seconds(&self) -> u64 {
        self.refresh.ttl_seconds
    }

    pub fn issue_access_token(&self, identity: &TokenIdentity) -> Result<IssuedToken, TokenError> {
        self.access.issue(identity)
    }

    pub fn issue_refresh_token(&self, identity: &TokenIdentity) -> Result<IssuedToken, TokenError> {
        self.refresh.issue(identity)
    }

    pub fn issue_token_pair(&self, identity: &TokenIdentity) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access: self.access.issue(identity)?,
            refresh: self.refresh.issue(identity)?,
        })
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.access.verify(token)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.refresh.verify(token)?;
        if claims.jti.is_empty() {
            return Err(TokenError::MissingJti);
        }
        Ok(claims)
    }

    /// Decodes without checking signature or expiry. Only for best-effort
    /// cleanup paths that need `sid`/`jti` off an already-expired token.
    pub fn decode_unsafe(token: &str) -> Option<Claims> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.set_required_spec_claims::<&str>(&[]);

        decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .ok()
    }

    /// Seconds until the token's `exp`, read without verification. Returns 0
    /// for expired or malformed input; used to size denylist entries.
    pub fn remaining_ttl_seconds(token: &str) -> u64 {
        Self::decode_unsafe(token)
            .map(|claims| (claims.exp - Utc::now().timestamp()).max(0) as u64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(&TokenCodecConfig {
            access_secret: Secret::from("access-secret".to_string()),
            refresh_secret: Secret::from("refresh-secret".to_string()),
            access_ttl_seconds: 900,
            refresh_ttl_seconds: 604_800,
        })
    }

    fn identity() -> TokenIdentity {
        TokenIdentity {
            user_id: "user-1".to_string(),
            email: Email::parse("alice@example.com").unwrap(),
            role: Role::Customer,
            session_id: "session-1".to_string(),
        }
    }

    #[test]
    fn access_token_round_trip() {
        let codec = codec();
        let issued = codec.issue_access_token(&identity()).unwrap();
        assert_eq!(issued.token.split('.').count(), 3);

        let claims = codec.verify_access_token(&issued.token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email.as_str(), "alice@example.com");
        assert_eq!(claims.role, Role::Customer);
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.sid, "session-1");
        assert_eq!(claims.jti, issued.jti);
    }

    #[test]
    fn refresh_token_is_not_a_valid_access_token() {
        let codec = codec();
        let issued = codec.issue_refresh_token(&identity()).unwrap();
        // Different signing key, so the signature check fails before the type
        // check ever runs.
        assert_eq!(
            codec.verify_access_token(&issued.token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn same_key_wrong_type_is_rejected() {
        let config = TokenCodecConfig {
            access_secret: Secret::from("shared".to_string()),
            refresh_secret: Secret::from("shared".to_string()),
            access_ttl_seconds: 900,
            refresh_ttl_seconds: 900,
        };
        let codec = TokenCodec::new(&config);
        let issued = codec.issue_refresh_token(&identity()).unwrap();
        assert_eq!(
            codec.verify_access_token(&issued.token),
            Err(TokenError::WrongType)
        );
    }

    #[test]
    fn expired_token_is_rejected_but_decodable() {
        let codec = codec();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "user-1".to_string(),
            email: Email::parse("alice@example.com").unwrap(),
            role: Role::Customer,
            token_type: TokenType::Access,
            sid: "session-1".to_string(),
            jti: "jti-1".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"access-secret"),
        )
        .unwrap();

        assert_eq!(codec.verify_access_token(&token), Err(TokenError::Expired));

        let decoded = TokenCodec::decode_unsafe(&token).unwrap();
        assert_eq!(decoded.sid, "session-1");
        assert_eq!(decoded.jti, "jti-1");
        assert_eq!(TokenCodec::remaining_ttl_seconds(&token), 0);
    }

    #[test]
    fn remaining_ttl_tolerates_garbage() {
        assert_eq!(TokenCodec::remaining_ttl_seconds("not-a-token"), 0);
        assert_eq!(TokenCodec::remaining_ttl_seconds(""), 0);
        assert!(TokenCodec::decode_unsafe("a.b.c").is_none());
    }

    #[test]
    fn remaining_ttl_tracks_expiry() {
        let codec = codec();
        let issued = codec.issue_access_token(&identity()).unwrap();
        let remaining = TokenCodec::remaining_ttl_seconds(&issued.token);
        assert!(remaining > 890 && remaining <= 900, "remaining={remaining}");
    }

    #[test]
    fn tampered_token_is_rejected() {
        let codec = codec();
        let issued = codec.issue_access_token(&identity()).unwrap();
        let tampered = format!("{}AA", issued.token);
        assert_eq!(
            codec.verify_access_token(&tampered),
            Err(TokenError::InvalidSignature)
        );
    }
}
