//! OpenAI-compatible chat completions client.
//!
//! Works against any server exposing `POST {base_url}/chat/completions`
//! (OpenAI, Ollama, vLLM, llama.cpp). No retries and no client-side deadline;
//! the host decides how long to wait.

use super::{AssistantReply, ChatModel, ChatRequest};
use crate::error::ModelError;
use aetherforge_core::AppConfig;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantReply,
}

/// Chat client for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiChatClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ModelError> {
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .map_err(|e| ModelError::Network(Arc::new(e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url, api_key: api_key.into() })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ModelError> {
        Self::new(&config.base_url, &config.api_key)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatModel for OpenAiChatClient {
    async fn complete(&self, request: &ChatRequest<'_>) -> Result<AssistantReply, ModelError> {
        tracing::debug!(model = request.model, messages = request.messages.len(), "sending chat completion");

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Http { status: status.as_u16(), body });
        }

        let bytes = response.bytes().await?;
        let completion: ChatCompletionResponse =
            serde_json::from_slice(&bytes).map_err(|e| ModelError::Parse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(ModelError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Message;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion(message: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "model": "stub-model",
            "choices": [{"index": 0, "message": message, "finish_reason": "stop"}]
        }))
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = OpenAiChatClient::new("http://localhost:11434/v1/", "local").unwrap();
        assert_eq!(client.endpoint(), "http://localhost:11434/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_complete_parses_tool_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer local"))
            .and(body_partial_json(json!({"model": "stub-model", "tool_choice": "auto"})))
            .respond_with(completion(json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "web_search", "arguments": "{\"query\":\"rust\"}"}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiChatClient::new(format!("{}/v1", server.uri()), "local").unwrap();
        let messages = vec![Message::user("hi")];
        let request =
            ChatRequest { model: "stub-model", messages: &messages, tools: &[], tool_choice: Some("auto"), temperature: 0.2 };

        let reply = client.complete(&request).await.unwrap();
        assert_eq!(reply.tool_calls().len(), 1);
        assert_eq!(reply.tool_calls()[0].function.name, "web_search");
        assert_eq!(reply.tool_calls()[0].function.arguments, r#"{"query":"rust"}"#);
    }

    #[tokio::test]
    async fn test_complete_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = OpenAiChatClient::new(server.uri(), "local").unwrap();
        let messages = vec![Message::user("hi")];
        let request = ChatRequest { model: "m", messages: &messages, tools: &[], tool_choice: None, temperature: 0.0 };

        let result = client.complete(&request).await;
        assert!(matches!(result, Err(ModelError::Http { status: 500, ref body }) if body == "boom"));
    }

    #[tokio::test]
    async fn test_complete_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let client = OpenAiChatClient::new(server.uri(), "local").unwrap();
        let messages = vec![Message::user("hi")];
        let request = ChatRequest { model: "m", messages: &messages, tools: &[], tool_choice: None, temperature: 0.0 };

        assert!(matches!(client.complete(&request).await, Err(ModelError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_complete_unreachable() {
        let client = OpenAiChatClient::new("http://127.0.0.1:1/v1", "local").unwrap();
        let messages = vec![Message::user("hi")];
        let request = ChatRequest { model: "m", messages: &messages, tools: &[], tool_choice: None, temperature: 0.0 };

        assert!(matches!(client.complete(&request).await, Err(ModelError::Network(_))));
    }
}
