//! Set-Cookie construction for the token pair.
//!
//! Tokens travel in httpOnly cookies so page scripts never see them. The
//! `secure` flag is configurable because integration tests run over plain
//! http on a loopback address.

/// Cookie names and attributes shared by every route that sets or clears
/// auth cookies.
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    pub access_name: String,
    pub refresh_name: String,
    pub secure: bool,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            access_name: "access_token".to_string(),
            refresh_name: "refresh_token".to_string(),
            secure: true,
        }
    }
}

impl CookiePolicy {
    pub fn access_cookie(&self, token: &str, max_age_seconds: u64) -> String {
        build_cookie(&self.access_name, token, max_age_seconds, self.secure)
    }

    pub fn refresh_cookie(&self, token: &str, max_age_seconds: u64) -> String {
        build_cookie(&self.refresh_name, token, max_age_seconds, self.secure)
    }

    pub fn access_removal_cookie(&self) -> String {
        build_cookie(&self.access_name, "", 0, self.secure)
    }

    pub fn refresh_removal_cookie(&self) -> String {
        build_cookie(&self.refresh_name, "", 0, self.secure)
    }
}

fn build_cookie(name: &str, value: &str, max_age_seconds: u64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!("{name}={value}; HttpOnly{secure}; SameSite=Strict; Path=/; Max-Age={max_age_seconds}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_cookie_carries_the_hardening_attributes() {
        let policy = CookiePolicy::default();
        let cookie = policy.access_cookie("abc.def.ghi", 900);

        assert!(cookie.starts_with("access_token=abc.def.ghi;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=900"));
    }

    #[test]
    fn secure_flag_can_be_disabled() {
        let policy = CookiePolicy {
            secure: false,
            ..CookiePolicy::default()
        };
        assert!(!policy.refresh_cookie("t", 60).contains("Secure"));
    }

    #[test]
    fn removal_cookie_clears_value_and_expiry() {
        let cookie = CookiePolicy::default().refresh_removal_cookie();
        assert!(cookie.starts_with("refresh_token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
