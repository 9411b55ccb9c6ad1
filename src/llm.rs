//! Generative-text boundary: chat message types, the [`ChatClient`] trait and
//! an OpenAI-compatible HTTP client.
//!
//! The pipeline only ever talks to `dyn ChatClient`, so tests and alternative
//! backends plug in without touching the network.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Completion response, reduced to the fields the pipeline reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl ChatCompletion {
    /// Text of the first choice.
    pub fn first_text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

/// Anything that can answer a chat completion request.
pub trait ChatClient {
    /// Send `messages` to `model`. Failures carry a human-readable message and
    /// are never retried here.
    fn complete(&self, messages: &[ChatMessage], model: &str) -> Result<ChatCompletion>;
}

#[cfg(feature = "openai")]
pub use openai::{OpenAiClient, DEFAULT_API_KEY_VAR, DEFAULT_BASE_URL};

#[cfg(feature = "openai")]
mod openai {
    use reqwest::header::{ACCEPT, AUTHORIZATION};
    use serde::{Deserialize, Serialize};

    use super::{ChatClient, ChatCompletion, ChatMessage};
    use crate::{Error, Result};

    pub const DEFAULT_API_KEY_VAR: &str = "OPENAI_API_KEY";
    pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
    pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

    #[derive(Serialize)]
    struct CompletionRequest<'a> {
        model: &'a str,
        messages: &'a [ChatMessage],
    }

    #[derive(Deserialize, Debug)]
    struct ApiErrorResponse {
        error: ApiErrorDetail,
    }

    #[derive(Deserialize, Debug)]
    struct ApiErrorDetail {
        message: String,
    }

    /// Blocking client for `POST {base_url}/chat/completions`.
    #[derive(Debug, Clone)]
    pub struct OpenAiClient {
        http: reqwest::blocking::Client,
        api_key: String,
        base_url: String,
    }

    impl OpenAiClient {
        pub fn new(api_key: impl Into<String>) -> Self {
            Self {
                http: reqwest::blocking::Client::new(),
                api_key: api_key.into(),
                base_url: DEFAULT_BASE_URL.to_string(),
            }
        }

        /// Reads `OPENAI_API_KEY` and, if set, `OPENAI_BASE_URL`.
        pub fn from_env() -> Result<Self> {
            Self::from_env_var(DEFAULT_API_KEY_VAR)
        }

        /// Like [`OpenAiClient::from_env`] with a custom key variable.
        pub fn from_env_var(key_var: &str) -> Result<Self> {
            let api_key = std::env::var(key_var)
                .ok()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| Error::MissingCredential(key_var.to_string()))?;
            let mut client = Self::new(api_key);
            if let Ok(base) = std::env::var(BASE_URL_VAR) {
                if !base.trim().is_empty() {
                    client = client.with_base_url(base);
                }
            }
            Ok(client)
        }

        pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
            self.base_url = base_url.into().trim_end_matches('/').to_string();
            self
        }

        pub fn endpoint(&self) -> String {
            format!("{}/chat/completions", self.base_url)
        }
    }

    impl ChatClient for OpenAiClient {
        fn complete(&self, messages: &[ChatMessage], model: &str) -> Result<ChatCompletion> {
            log::info!("Requesting completion from {} ({model})", self.base_url);
            let response = self
                .http
                .post(self.endpoint())
                .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
                .header(ACCEPT, "application/json")
                .json(&CompletionRequest { model, messages })
                .send()?;

            let status = response.status();
            let body = response.text()?;
            if !status.is_success() {
                return Err(Error::Upstream(error_message(status.as_u16(), &body)));
            }
            let completion: ChatCompletion = serde_json::from_str(&body)?;
            if let Some(usage) = &completion.usage {
                log::debug!(
                    "Token usage: prompt {}, completion {}, total {}",
                    usage.prompt_tokens,
                    usage.completion_tokens,
                    usage.total_tokens
                );
            }
            Ok(completion)
        }
    }

    /// The API's own `error.message` if the body carries one, otherwise the
    /// status and raw body.
    pub(super) fn error_message(status: u16, body: &str) -> String {
        match serde_json::from_str::<ApiErrorResponse>(body) {
            Ok(api) => api.error.message,
            Err(_) => format!("API request failed with status {status}: {}", body.trim()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&ChatMessage::system("hi")).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"hi"}"#);
        let back: ChatMessage = serde_json::from_str(r#"{"role":"assistant","content":"x"}"#).unwrap();
        assert_eq!(back, ChatMessage::assistant("x"));
    }

    #[test]
    fn completion_parses_api_shape() {
        let body = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "<h1>Hi</h1>" }, "finish_reason": "stop" }
            ],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        }"#;
        let completion: ChatCompletion = serde_json::from_str(body).unwrap();
        assert_eq!(completion.first_text(), Some("<h1>Hi</h1>"));
        assert_eq!(completion.choices[0].finish_reason.as_deref(), Some("stop"));
        assert_eq!(completion.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn completion_without_usage_or_choices() {
        let completion: ChatCompletion = serde_json::from_str(r#"{ "choices": [] }"#).unwrap();
        assert!(completion.usage.is_none());
        assert!(completion.first_text().is_none());
    }

    #[cfg(feature = "openai")]
    #[test]
    fn missing_key_is_a_credential_error() {
        let err = OpenAiClient::from_env_var("SLIDE_FORGE_TEST_KEY_THAT_IS_NEVER_SET").unwrap_err();
        assert!(matches!(err, crate::Error::MissingCredential(ref v) if v == "SLIDE_FORGE_TEST_KEY_THAT_IS_NEVER_SET"));
        assert_eq!(
            err.to_string(),
            "Missing credential: SLIDE_FORGE_TEST_KEY_THAT_IS_NEVER_SET is not set"
        );
    }

    #[cfg(feature = "openai")]
    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = OpenAiClient::new("sk-test").with_base_url("http://localhost:8080/v1/");
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[cfg(feature = "openai")]
    #[test]
    fn api_error_message_is_extracted() {
        let body = r#"{ "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" } }"#;
        assert_eq!(openai::error_message(401, body), "Incorrect API key provided");
        assert_eq!(
            openai::error_message(502, "Bad gateway\n"),
            "API request failed with status 502: Bad gateway"
        );
    }
}
