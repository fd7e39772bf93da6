use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

/// A candidate password that satisfied the strength policy.
///
/// Login deliberately takes a raw `Secret<String>` instead: existing accounts
/// may predate the policy, and authentication must still accept them.
#[derive(Clone, Debug)]
pub struct Password(Secret<String>);

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicyViolation {
    #[error("Password must be at least 8 characters long")]
    TooShort,
    #[error("Password must be at most 72 characters long")]
    TooLong,
    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,
    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,
    #[error("Password must contain at least one digit")]
    MissingDigit,
    #[error("Password must contain at least one special character")]
    MissingSpecial,
}

impl Password {
    /// Checks every policy rule and reports all violations, not just the first.
    pub fn parse(candidate: Secret<String>) -> Result<Self, Vec<PasswordPolicyViolation>> {
        let violations = Self::check(candidate.expose_secret());
        if violations.is_empty() {
            Ok(Self(candidate))
        } else {
            Err(violations)
        }
    }

    fn check(raw: &str) -> Vec<PasswordPolicyViolation> {
        use PasswordPolicyViolation::*;

        let mut violations = Vec::new();
        let length = raw.chars().count();
        if length < 8 {
            violations.push(TooShort);
        }
        if length > 72 {
            violations.push(TooLong);
        }
        if !raw.chars().any(|c| c.is_ascii_lowercase()) {
            violations.push(MissingLowercase);
        }
        if !raw.chars().any(|c| c.is_ascii_uppercase()) {
            violations.push(MissingUppercase);
        }
        if !raw.chars().any(|c| c.is_ascii_digit()) {
            violations.push(MissingDigit);
        }
        if !raw.chars().any(|c| !c.is_alphanumeric()) {
            violations.push(MissingSpecial);
        }
        violations
    }
}

impl AsRef<Secret<String>> for Password {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}
