use std::sync::{Arc, Mutex};

use gatehouse_core::{Email, EmailClient, EmailClientError};

#[derive(Debug, Clone)]
pub struct SentResetEmail {
    pub recipient: Email,
    pub recipient_name: String,
    pub reset_url: String,
}

/// Records every message instead of sending anything; tests assert against
/// `sent_messages`.
#[derive(Clone, Default)]
pub struct MockEmailClient {
    sent: Arc<Mutex<Vec<SentResetEmail>>>,
}

impl MockEmailClient {
    pub fn sent_messages(&self) -> Vec<SentResetEmail> {
        self.sent.lock().expect("mock email lock poisoned").clone()
    }
}

#[async_trait::async_trait]
impl EmailClient for MockEmailClient {
    async fn send_password_reset_email(
        &self,
        recipient: &Email,
        recipient_name: &str,
        reset_url: &str,
    ) -> Result<(), EmailClientError> {
        self.sent
            .lock()
            .expect("mock email lock poisoned")
            .push(SentResetEmail {
                recipient: recipient.clone(),
                recipient_name: recipient_name.to_string(),
                reset_url: reset_url.to_string(),
            });
        Ok(())
    }
}
