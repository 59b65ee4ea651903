//! WhatsApp gateway messaging provider.
//!
//! Talks to a whapi-style HTTP gateway: `POST {api_url}/messages/text` with
//! a bearer token, a target group id, and the message body.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::WhatsappConfig;
use crate::messaging::{MessageReceipt, MessagingError, MessagingProvider, Result};

pub struct WhatsappProvider {
    client: Client,
    config: WhatsappConfig,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    id: Option<String>,
}

impl WhatsappProvider {
    pub fn new(config: WhatsappConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }
}

#[async_trait]
impl MessagingProvider for WhatsappProvider {
    async fn send_group_message(&self, text: &str, group_override: Option<&str>) -> Result<MessageReceipt> {
        let group_id = group_override.unwrap_or(&self.config.group_id).to_string();

        let url = format!("{}/messages/text", self.config.api_url.as_str().trim_end_matches('/'));
        let payload = json!({
            "to": group_id,
            "body": text,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MessagingError::Api(format!("HTTP {} - {}", status.as_u16(), body)));
        }

        // The gateway returns a message id on success; tolerate bodies that
        // don't parse rather than failing a delivered send.
        let message_id = response.json::<SendResponse>().await.ok().and_then(|r| r.id);

        tracing::debug!(group_id = %group_id, message_id = ?message_id, "Sent group message");

        Ok(MessageReceipt { message_id, group_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> WhatsappConfig {
        WhatsappConfig {
            api_url: server.uri().parse().unwrap(),
            api_token: "test-token".to_string(),
            group_id: "padel-group@g.us".to_string(),
            timeout: Duration::from_secs(2),
        }
    }

    #[tokio::test]
    async fn test_sends_to_configured_group() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages/text"))
            .and(bearer_token("test-token"))
            .and(body_partial_json(json!({ "to": "padel-group@g.us" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg-1" })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = WhatsappProvider::new(config_for(&server));
        let receipt = provider.send_group_message("1 spot free in Monday Padel", None).await.unwrap();

        assert_eq!(receipt.message_id.as_deref(), Some("msg-1"));
        assert_eq!(receipt.group_id, "padel-group@g.us");
    }

    #[tokio::test]
    async fn test_club_group_override_wins() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages/text"))
            .and(body_partial_json(json!({ "to": "dive-center@g.us" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg-2" })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = WhatsappProvider::new(config_for(&server));
        let receipt = provider.send_group_message("hello", Some("dive-center@g.us")).await.unwrap();

        assert_eq!(receipt.group_id, "dive-center@g.us");
    }

    #[tokio::test]
    async fn test_api_errors_propagate() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages/text"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
            .mount(&server)
            .await;

        let provider = WhatsappProvider::new(config_for(&server));
        let err = provider.send_group_message("hello", None).await.unwrap_err();

        match err {
            MessagingError::Api(message) => {
                assert!(message.contains("401"));
                assert!(message.contains("invalid token"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
