//! Telegram Bot API notifier

use crate::notify::{NotifyError, Notifier};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Public Telegram Bot API endpoint
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends messages through a Telegram bot
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    token: String,
    chat_id: String,
    api_base: String,
}

impl TelegramNotifier {
    pub fn new(client: Client, token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            client,
            token: token.into(),
            chat_id: chat_id.into(),
            api_base: TELEGRAM_API_BASE.to_string(),
        }
    }

    /// Points the notifier at another API server
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        if self.token.is_empty() || self.chat_id.is_empty() {
            return Err(NotifyError::MissingCredentials);
        }

        let chat_id: i64 = self
            .chat_id
            .trim()
            .parse()
            .map_err(|_| NotifyError::InvalidChatId(self.chat_id.clone()))?;

        let response = self
            .client
            .post(self.endpoint())
            .json(&SendMessage {
                chat_id,
                text: message,
            })
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.without_url().to_string()))?;

        let status = response.status();
        let body: Option<ApiResponse> = response.json().await.ok();

        match body {
            Some(api) if status.is_success() && api.ok => {
                tracing::info!("Telegram notification sent to chat {}", chat_id);
                Ok(())
            }
            Some(api) => Err(NotifyError::Api {
                status: status.as_u16(),
                description: api.description.unwrap_or_else(|| "unknown error".to_string()),
            }),
            None if status.is_success() => Ok(()),
            None => Err(NotifyError::Api {
                status: status.as_u16(),
                description: status.canonical_reason().unwrap_or("unknown error").to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn notifier(server: &MockServer, token: &str, chat_id: &str) -> TelegramNotifier {
        TelegramNotifier::new(Client::new(), token, chat_id).with_api_base(server.uri())
    }

    #[tokio::test]
    async fn test_send_posts_chat_id_and_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN123/sendMessage"))
            .and(body_json(serde_json::json!({
                "chat_id": -100200300,
                "text": "hello"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": {}
            })))
            .expect(1)
            .mount(&server)
            .await;

        notifier(&server, "TOKEN123", "-100200300")
            .send("hello")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let server = MockServer::start().await;
        let err = notifier(&server, "", "42").send("x").await.unwrap_err();
        assert!(matches!(err, NotifyError::MissingCredentials));

        let err = notifier(&server, "token", "").send("x").await.unwrap_err();
        assert!(matches!(err, NotifyError::MissingCredentials));
    }

    #[tokio::test]
    async fn test_non_numeric_chat_id() {
        let server = MockServer::start().await;
        let err = notifier(&server, "token", "@channel").send("x").await.unwrap_err();
        assert!(matches!(err, NotifyError::InvalidChatId(id) if id == "@channel"));
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .mount(&server)
            .await;

        let err = notifier(&server, "token", "1").send("x").await.unwrap_err();
        match err {
            NotifyError::Api {
                status,
                description,
            } => {
                assert_eq!(status, 400);
                assert_eq!(description, "Bad Request: chat not found");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_api() {
        let notifier = TelegramNotifier::new(Client::new(), "token", "1")
            .with_api_base("http://127.0.0.1:1");
        let err = notifier.send("x").await.unwrap_err();
        assert!(matches!(err, NotifyError::Request(_)));
    }
}
