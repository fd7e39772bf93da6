use http::HeaderValue;
use secrecy::Secret;
use serde::Deserialize;
use thiserror::Error;

/// Full configuration surface of the service, loaded from an optional
/// `config.json` plus `GATEHOUSE__`-prefixed environment variables
/// (e.g. `GATEHOUSE__JWT__ACCESS_SECRET`).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub cookies: CookieSettings,
    #[serde(default)]
    pub hashing: HashingSettings,
    #[serde(default)]
    pub rate_limits: RateLimitSettings,
    #[serde(default)]
    pub reset: ResetSettings,
    pub redis: RedisSettings,
    pub postgres: PostgresSettings,
    pub email_client: EmailClientSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    /// Origin used when building password-reset URLs, e.g. `https://blog.example.com`.
    pub public_origin: String,
    /// Comma-separated list of allowed CORS origins.
    #[serde(default)]
    pub allowed_origins: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    pub access_secret: Secret<String>,
    pub refresh_secret: Secret<String>,
    #[serde(default = "default_access_ttl")]
    pub access_ttl: String,
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl: String,
}

impl JwtSettings {
    pub fn access_ttl_seconds(&self) -> Result<u64, TtlParseError> {
        parse_ttl(&self.access_ttl)
    }

    pub fn refresh_ttl_seconds(&self) -> Result<u64, TtlParseError> {
        parse_ttl(&self.refresh_ttl)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CookieSettings {
    #[serde(default = "default_access_cookie")]
    pub access_name: String,
    #[serde(default = "default_refresh_cookie")]
    pub refresh_name: String,
    /// Disabled only for plain-http test environments.
    #[serde(default = "default_true")]
    pub secure: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            access_name: default_access_cookie(),
            refresh_name: default_refresh_cookie(),
            secure: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HashingSettings {
    /// argon2 time cost; the knob that bounds worst-case login latency.
    #[serde(default = "default_hash_cost")]
    pub cost: u32,
}

impl Default for HashingSettings {
    fn default() -> Self {
        Self {
            cost: default_hash_cost(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_login_max_attempts")]
    pub login_max_attempts: i64,
    #[serde(default = "default_login_window")]
    pub login_window: String,
    #[serde(default = "default_forgot_max_attempts")]
    pub forgot_email_max_attempts: i64,
    #[serde(default = "default_forgot_window")]
    pub forgot_email_window: String,
    #[serde(default = "default_forgot_ip_max_attempts")]
    pub forgot_ip_max_attempts: i64,
    #[serde(default = "default_forgot_window")]
    pub forgot_ip_window: String,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            login_max_attempts: default_login_max_attempts(),
            login_window: default_login_window(),
            forgot_email_max_attempts: default_forgot_max_attempts(),
            forgot_email_window: default_forgot_window(),
            forgot_ip_max_attempts: default_forgot_ip_max_attempts(),
            forgot_ip_window: default_forgot_window(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetSettings {
    #[serde(default = "default_reset_ttl")]
    pub token_ttl: String,
}

impl Default for ResetSettings {
    fn default() -> Self {
        Self {
            token_ttl: default_reset_ttl(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    pub host_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresSettings {
    pub url: Secret<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub sender: String,
    pub auth_token: Secret<String>,
    #[serde(default = "default_email_timeout_ms")]
    pub timeout_milliseconds: u64,
}

fn default_listen_address() -> String {
    "0.0.0.0:3000".to_string()
}
fn default_access_ttl() -> String {
    "15m".to_string()
}
fn default_refresh_ttl() -> String {
    "7d".to_string()
}
fn default_access_cookie() -> String {
    "access_token".to_string()
}
fn default_refresh_cookie() -> String {
    "refresh_token".to_string()
}
fn default_true() -> bool {
    true
}
fn default_hash_cost() -> u32 {
    3
}
fn default_login_max_attempts() -> i64 {
    5
}
fn default_login_window() -> String {
    "15m".to_string()
}
fn default_forgot_max_attempts() -> i64 {
    3
}
fn default_forgot_ip_max_attempts() -> i64 {
    10
}
fn default_forgot_window() -> String {
    "1h".to_string()
}
fn default_reset_ttl() -> String {
    "30m".to_string()
}
fn default_email_timeout_ms() -> u64 {
    10_000
}

impl Settings {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("GATEHOUSE").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TtlParseError {
    #[error("Invalid duration: {0:?}")]
    Invalid(String),
}

/// Parses `"900"`, `"15m"`, `"12h"`, `"7d"` style duration strings to seconds.
pub fn parse_ttl(raw: &str) -> Result<u64, TtlParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TtlParseError::Invalid(raw.to_string()));
    }
    if let Ok(seconds) = raw.parse::<u64>() {
        return Ok(seconds);
    }

    let unit = raw.chars().last().unwrap_or_default();
    let value = &raw[..raw.len() - unit.len_utf8()];
    let value: u64 = value
        .parse()
        .map_err(|_| TtlParseError::Invalid(raw.to_string()))?;

    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 3_600,
        'd' => 86_400,
        _ => return Err(TtlParseError::Invalid(raw.to_string())),
    };

    Ok(value * multiplier)
}

/// CORS origin allow-list, parsed from a comma-separated string.
#[derive(Debug, Clone, Default)]
pub struct AllowedOrigins(Vec<HeaderValue>);

impl AllowedOrigins {
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(|s| HeaderValue::from_str(s).ok())
                .collect(),
        )
    }

    pub fn contains(&self, origin: &HeaderValue) -> bool {
        self.0.contains(origin)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_duration_strings() {
        assert_eq!(parse_ttl("900"), Ok(900));
        assert_eq!(parse_ttl("45s"), Ok(45));
        assert_eq!(parse_ttl("15m"), Ok(900));
        assert_eq!(parse_ttl("12h"), Ok(43_200));
        assert_eq!(parse_ttl("7d"), Ok(604_800));
        assert_eq!(parse_ttl(" 7d "), Ok(604_800));
    }

    #[test]
    fn rejects_malformed_durations() {
        for raw in ["", "m", "15x", "-5m", "1.5h"] {
            assert!(parse_ttl(raw).is_err(), "{raw:?}");
        }
    }

    #[test]
    fn blank_origin_list_is_empty() {
        assert!(AllowedOrigins::parse("").is_empty());
        assert!(AllowedOrigins::parse(" , ").is_empty());
        assert!(!AllowedOrigins::parse("https://blog.example.com").is_empty());
    }

    #[test]
    fn allowed_origins_match_exactly() {
        let origins = AllowedOrigins::parse("https://blog.example.com, https://admin.example.com");
        assert!(origins.contains(&HeaderValue::from_static("https://blog.example.com")));
        assert!(!origins.contains(&HeaderValue::from_static("https://evil.example.com")));
    }
}
