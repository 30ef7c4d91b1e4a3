//! Bounded tool-calling conversation loop.

use crate::error::ModelError;
use crate::model::{ChatModel, ChatRequest, Message, ToolDefinition};
use crate::tools::{ToolDispatcher, tool_definitions};
use serde::Serialize;

pub const SYSTEM_PROMPT: &str =
    "You are AetherForge, a local assistant. Use tools when you need fresh information, then cite sources.";

/// Returned when the model still wants tools after the last round.
pub const ROUND_LIMIT_MESSAGE: &str = "I hit the tool-call limit before finishing. Try a narrower query.";

pub const DEFAULT_MAX_ROUNDS: usize = 3;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Final answer plus the URLs fetched on the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatOutcome {
    pub answer: String,
    /// Every non-empty URL returned by fetch_url, in call order, duplicates kept.
    pub sources: Vec<String>,
    /// Model requests made.
    pub rounds: usize,
}

/// Drives one user prompt through the model and the tools.
pub struct Agent {
    model: Box<dyn ChatModel>,
    model_name: String,
    tools: ToolDispatcher,
    definitions: Vec<ToolDefinition>,
    temperature: f32,
}

impl Agent {
    pub fn new(model: impl ChatModel + 'static, model_name: impl Into<String>, tools: ToolDispatcher) -> Self {
        Self {
            model: Box::new(model),
            model_name: model_name.into(),
            tools,
            definitions: tool_definitions(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn tools(&self) -> &ToolDispatcher {
        &self.tools
    }

    /// Answer `prompt`, letting the model call tools for at most `max_rounds`
    /// requests. Tool failures are fed back to the model; only model errors
    /// abort the conversation.
    pub async fn chat_with_tools(&self, prompt: &str, max_rounds: usize) -> Result<ChatOutcome, ModelError> {
        let mut messages = vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)];
        let mut sources = Vec::new();

        for round in 1..=max_rounds {
            let request = ChatRequest {
                model: &self.model_name,
                messages: &messages,
                tools: &self.definitions,
                tool_choice: Some("auto"),
                temperature: self.temperature,
            };
            let reply = self.model.complete(&request).await?;

            let calls = reply.tool_calls().to_vec();
            if calls.is_empty() {
                let answer = reply.content.unwrap_or_default().trim().to_string();
                tracing::info!(round, sources = sources.len(), "conversation finished");
                return Ok(ChatOutcome { answer, sources, rounds: round });
            }

            tracing::info!(round, calls = calls.len(), "model requested tools");
            messages.push(Message::Assistant { content: reply.content, tool_calls: calls.clone() });

            for call in &calls {
                let output = self.tools.call_tool(&call.function.name, &call.function.arguments).await;
                if let Some(url) = output.source_url() {
                    sources.push(url.to_string());
                }
                messages.push(Message::tool_result(call, output.to_content()));
            }
        }

        tracing::warn!(max_rounds, "tool-call round limit reached");
        Ok(ChatOutcome { answer: ROUND_LIMIT_MESSAGE.to_string(), sources, rounds: max_rounds })
    }
}
