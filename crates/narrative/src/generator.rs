use std::{future::Future, pin::Pin, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{GenerationError, NarratorConfig, Prompt};

pub type Generation<'a> = Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>>;

/// External text generation service.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a Prompt) -> Generation<'a>;

    /// `false` when calls cannot succeed, e.g. no credentials.
    fn is_configured(&self) -> bool {
        true
    }
}

const API_VERSION: &str = "2023-06-01";

/// Client for the Anthropic messages API.
#[derive(Clone, Debug)]
pub struct AnthropicClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl AnthropicClient {
    /// The key is read by the caller from the environment, never from files.
    pub fn new(config: &NarratorConfig, api_key: Option<String>) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|err| GenerationError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/v1/messages", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    async fn send(&self, prompt: &Prompt) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::NotConfigured)?;

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: prompt.max_tokens,
            system: &prompt.system,
            messages: [Message {
                role: "user",
                content: &prompt.user,
            }],
        };

        let res = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let message = res
                .json::<ErrorResponse>()
                .await
                .map(|err| err.error.message)
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(GenerationError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let reply: MessagesResponse = res.json().await?;
        reply
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| GenerationError::Malformed("reply has no text content".to_string()))
    }
}

impl TextGenerator for AnthropicClient {
    fn generate<'a>(&'a self, prompt: &'a Prompt) -> Generation<'a> {
        Box::pin(self.send(prompt))
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_messages_api() {
        let body = MessagesRequest {
            model: "claude-3-5-sonnet-20241022",
            max_tokens: 2000,
            system: "sys",
            messages: [Message {
                role: "user",
                content: "hello",
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "claude-3-5-sonnet-20241022",
                "max_tokens": 2000,
                "system": "sys",
                "messages": [{"role": "user", "content": "hello"}]
            })
        );
    }

    #[test]
    fn blank_key_is_not_configured() {
        let config = NarratorConfig::default();
        let client = AnthropicClient::new(&config, Some("  ".to_string())).unwrap();
        assert!(!client.is_configured());
        assert_eq!(client.endpoint, "https://api.anthropic.com/v1/messages");
    }

    #[tokio::test]
    async fn missing_key_fails_without_a_request() {
        let client = AnthropicClient::new(&NarratorConfig::default(), None).unwrap();
        let prompt = Prompt {
            system: String::new(),
            user: "hi".to_string(),
            max_tokens: 10,
        };
        assert!(matches!(
            client.generate(&prompt).await,
            Err(GenerationError::NotConfigured)
        ));
    }
}
