//! Route handlers.
//!
//! Handlers are generic over the store traits so the same router serves the
//! production Postgres/Redis stores and the in-memory stores used in tests.

pub mod forgot_password;
pub mod healthz;
pub mod login;
pub mod logout;
pub mod me;
pub mod refresh;
pub mod register;
pub mod reset_password;
pub mod verify_token;

pub use forgot_password::forgot_password;
pub use healthz::healthz;
pub use login::login;
pub use logout::logout;
pub use me::me;
pub use refresh::refresh;
pub use register::register;
pub use reset_password::reset_password;
pub use verify_token::verify_token;

use axum::http::HeaderMap;

/// First hop of `X-Forwarded-For`, when a proxy supplied one.
pub(crate) fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}

pub(crate) fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_ip_takes_the_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn client_ip_is_absent_without_the_header() {
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }
}
