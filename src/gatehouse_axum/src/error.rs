use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gatehouse_application::{
    AccessError, ForgotPasswordError, GetProfileError, LoginError, RefreshError, RegisterError,
    ResetPasswordError,
};
use gatehouse_core::PasswordPolicyViolation;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Password does not meet the strength requirements")]
    WeakPassword(Vec<PasswordPolicyViolation>),

    #[error("An account with this email already exists")]
    DuplicateEmail,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Too many attempts, retry in {retry_after_minutes} minutes")]
    RateLimited { retry_after_minutes: u64 },

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Session is no longer valid")]
    SessionInvalid,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            ApiError::InvalidInput(_) | ApiError::WeakPassword(_) => StatusCode::BAD_REQUEST,

            ApiError::DuplicateEmail => StatusCode::CONFLICT,

            ApiError::InvalidCredentials
            | ApiError::AccountDisabled
            | ApiError::RateLimited { .. }
            | ApiError::InvalidToken
            | ApiError::InvalidRefreshToken
            | ApiError::SessionInvalid
            | ApiError::InvalidResetToken => StatusCode::UNAUTHORIZED,

            ApiError::UserNotFound => StatusCode::NOT_FOUND,

            ApiError::UnexpectedError(e) => {
                tracing::error!(error = %e, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Strength failures list every unmet rule so the client can render
        // them all at once.
        let body = match &self {
            ApiError::WeakPassword(violations) => Json(json!({
                "error": self.to_string(),
                "violations": violations.iter().map(ToString::to_string).collect::<Vec<_>>(),
            })),
            _ => Json(json!({ "error": self.to_string() })),
        };

        (status_code, body).into_response()
    }
}

impl From<RegisterError> for ApiError {
    fn from(error: RegisterError) -> Self {
        match error {
            RegisterError::EmptyName | RegisterError::InvalidEmail(_) => {
                ApiError::InvalidInput(error.to_string())
            }
            RegisterError::WeakPassword(violations) => ApiError::WeakPassword(violations),
            RegisterError::DuplicateEmail => ApiError::DuplicateEmail,
            RegisterError::UserStoreError(e) => ApiError::UnexpectedError(e.to_string()),
            RegisterError::HashingError(e) => ApiError::UnexpectedError(e.to_string()),
        }
    }
}

impl From<LoginError> for ApiError {
    fn from(error: LoginError) -> Self {
        match error {
            LoginError::RateLimited {
                retry_after_minutes,
            } => ApiError::RateLimited {
                retry_after_minutes,
            },
            LoginError::InvalidCredentials => ApiError::InvalidCredentials,
            LoginError::AccountDisabled => ApiError::AccountDisabled,
            LoginError::UserStoreError(e) => ApiError::UnexpectedError(e.to_string()),
            LoginError::StoreError(e) => ApiError::UnexpectedError(e.to_string()),
            LoginError::TokenError(e) => ApiError::UnexpectedError(e.to_string()),
            LoginError::HashingError(e) => ApiError::UnexpectedError(e.to_string()),
        }
    }
}

impl From<RefreshError> for ApiError {
    fn from(error: RefreshError) -> Self {
        match error {
            RefreshError::InvalidRefreshToken => ApiError::InvalidRefreshToken,
            RefreshError::SessionInvalid => ApiError::SessionInvalid,
            // A vanished account reads the same as a consumed token; no need
            // to confirm the account ever existed.
            RefreshError::UserNotFound => ApiError::InvalidRefreshToken,
            RefreshError::AccountDisabled => ApiError::AccountDisabled,
            RefreshError::UserStoreError(e) => ApiError::UnexpectedError(e.to_string()),
            RefreshError::StoreError(e) => ApiError::UnexpectedError(e.to_string()),
            RefreshError::TokenError(e) => ApiError::UnexpectedError(e.to_string()),
        }
    }
}

impl From<ForgotPasswordError> for ApiError {
    fn from(error: ForgotPasswordError) -> Self {
        match error {
            ForgotPasswordError::RateLimited {
                retry_after_minutes,
            } => ApiError::RateLimited {
                retry_after_minutes,
            },
            ForgotPasswordError::UserStoreError(e) => ApiError::UnexpectedError(e.to_string()),
            ForgotPasswordError::StoreError(e) => ApiError::UnexpectedError(e.to_string()),
        }
    }
}

impl From<ResetPasswordError> for ApiError {
    fn from(error: ResetPasswordError) -> Self {
        match error {
            ResetPasswordError::WeakPassword(violations) => ApiError::WeakPassword(violations),
            ResetPasswordError::InvalidOrExpiredToken => ApiError::InvalidResetToken,
            ResetPasswordError::UserStoreError(e) => ApiError::UnexpectedError(e.to_string()),
            ResetPasswordError::StoreError(e) => ApiError::UnexpectedError(e.to_string()),
            ResetPasswordError::HashingError(e) => ApiError::UnexpectedError(e.to_string()),
        }
    }
}

impl From<GetProfileError> for ApiError {
    fn from(error: GetProfileError) -> Self {
        match error {
            GetProfileError::UserNotFound => ApiError::UserNotFound,
            GetProfileError::UserStoreError(e) => ApiError::UnexpectedError(e.to_string()),
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(error: AccessError) -> Self {
        match error {
            AccessError::InvalidToken => ApiError::InvalidToken,
            AccessError::SessionInvalid => ApiError::SessionInvalid,
            AccessError::Store(e) => ApiError::UnexpectedError(e.to_string()),
        }
    }
}
