//! Chat-completion proxy
//!
//! Forwards a single user message to an OpenAI-compatible chat-completions
//! endpoint and returns the first choice's text.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ProviderError;

pub const DEFAULT_CHAT_URL: &str = "https://router.huggingface.co/v1/chat/completions";
pub const DEFAULT_CHAT_MODEL: &str = "deepseek-ai/DeepSeek-V3.2-Exp:novita";

/// Reply used when the model returns no usable text
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't understand that.";
/// Reply used when the upstream call fails
pub const ERROR_REPLY: &str = "Server error.";

const PROVIDER: &str = "chat";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Deserialize)]
struct Completion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl Completion {
    fn into_reply(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_REPLY.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ChatProxy {
    client: Client,
    url: String,
    model: String,
    token: Option<String>,
}

impl ChatProxy {
    pub fn new(client: Client, url: String, model: String, token: Option<String>) -> Self {
        Self {
            client,
            url,
            model,
            token,
        }
    }

    /// Send `message` as a user turn and return the model's reply
    pub async fn complete(&self, message: &str) -> Result<String, ProviderError> {
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": message }],
        });

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        let completion: Completion = serde_json::from_str(&response.text().await?)?;
        Ok(completion.into_reply())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn proxy(server: &MockServer) -> ChatProxy {
        ChatProxy::new(
            Client::new(),
            server.uri(),
            "test-model".to_string(),
            Some("hf_token".to_string()),
        )
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer hf_token"))
            .and(body_partial_json(json!({
                "model": "test-model",
                "messages": [{ "role": "user", "content": "When should I sow wheat?" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "Early November." } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = proxy(&server)
            .complete("When should I sow wheat?")
            .await
            .expect("complete");

        assert_eq!(reply, "Early November.");
    }

    #[tokio::test]
    async fn test_empty_choices_use_fallback_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let reply = proxy(&server).complete("hello").await.expect("complete");

        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_upstream_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = proxy(&server).complete("hello").await.unwrap_err();

        assert!(matches!(err, ProviderError::Status { status: 401, .. }));
    }
}
