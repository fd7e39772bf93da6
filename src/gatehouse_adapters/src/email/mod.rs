pub mod mock_email_client;
pub mod postmark_email_client;

pub use mock_email_client::{MockEmailClient, SentResetEmail};
pub use postmark_email_client::PostmarkEmailClient;
