use gatehouse_core::{Email, EmailClient, EmailClientError};
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};

#[derive(Clone)]
pub struct PostmarkEmailClient {
    http_client: Client,
    base_url: String,
    sender: Email,
    authorization_token: Secret<String>,
}

impl PostmarkEmailClient {
    pub fn new(
        base_url: String,
        sender: Email,
        authorization_token: Secret<String>,
        http_client: Client,
    ) -> Self {
        Self {
            http_client,
            base_url,
            sender,
            authorization_token,
        }
    }
}

#[async_trait::async_trait]
impl EmailClient for PostmarkEmailClient {
    #[tracing::instrument(name = "Sending password reset email", skip_all)]
    async fn send_password_reset_email(
        &self,
        recipient: &Email,
        recipient_name: &str,
        reset_url: &str,
    ) -> Result<(), EmailClientError> {
        let base =
            Url::parse(&self.base_url).map_err(|e| EmailClientError::Delivery(e.to_string()))?;
        let url = base
            .join("/email")
            .map_err(|e| EmailClientError::Delivery(e.to_string()))?;

        let text_body = format!(
            "Hi {recipient_name},\n\n\
             We received a request to reset your password. Open the link below \
             to choose a new one. The link expires shortly.\n\n\
             {reset_url}\n\n\
             If you did not request this, you can safely ignore this email."
        );
        let html_body = format!(
            "<p>Hi {recipient_name},</p>\
             <p>We received a request to reset your password. Click the link \
             below to choose a new one. The link expires shortly.</p>\
             <p><a href=\"{reset_url}\">Reset your password</a></p>\
             <p>If you did not request this, you can safely ignore this email.</p>"
        );

        let request_body = SendEmailRequest {
            from: self.sender.as_str(),
            to: recipient.as_str(),
            subject: "Reset your password",
            html_body: &html_body,
            text_body: &text_body,
            message_stream: MESSAGE_STREAM,
        };

        let request = self
            .http_client
            .post(url)
            .header(
                POSTMARK_AUTH_HEADER,
                self.authorization_token.expose_secret(),
            )
            .json(&request_body);

        request
            .send()
            .await
            .map_err(|e| EmailClientError::Delivery(e.to_string()))?
            .error_for_status()
            .map_err(|e| EmailClientError::Delivery(e.to_string()))?;

        Ok(())
    }
}

const MESSAGE_STREAM: &str = "outbound";
const POSTMARK_AUTH_HEADER: &str = "X-Postmark-Server-Token";

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
    message_stream: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: String) -> PostmarkEmailClient {
        PostmarkEmailClient::new(
            base_url,
            Email::parse("no-reply@blog.example.com").unwrap(),
            Secret::from("postmark-token".to_string()),
            Client::new(),
        )
    }

    #[tokio::test]
    async fn sends_reset_email_with_auth_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/email"))
            .and(header_exists(POSTMARK_AUTH_HEADER))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        client(mock_server.uri())
            .send_password_reset_email(
                &Email::parse("alice@example.com").unwrap(),
                "Alice",
                "https://blog.example.com/reset-password?token=abc",
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn server_error_surfaces_as_delivery_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/email"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = client(mock_server.uri())
            .send_password_reset_email(
                &Email::parse("alice@example.com").unwrap(),
                "Alice",
                "https://blog.example.com/reset-password?token=abc",
            )
            .await;

        assert!(matches!(result, Err(EmailClientError::Delivery(_))));
    }
}
