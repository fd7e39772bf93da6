use async_trait::async_trait;
use thiserror::Error;

use crate::domain::email::Email;

#[derive(Debug, Error)]
pub enum EmailClientError {
    #[error("Email delivery failed: {0}")]
    Delivery(String),
}

/// Outbound mail contract. The only template the auth core needs is the
/// password-reset message.
#[async_trait]
pub trait EmailClient: Send + Sync {
    async fn send_password_reset_email(
        &self,
        recipient: &Email,
        recipient_name: &str,
        reset_url: &str,
    ) -> Result<(), EmailClientError>;
}
