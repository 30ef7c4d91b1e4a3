//! Tools exposed to the model and their dispatch.
//!
//! A tool call arrives as a name plus a JSON argument string. It is decoded
//! into a closed [`ToolCall`] enum before anything runs; every outcome,
//! including unknown names, comes back as a JSON object the model can read.

pub mod fetch_url;
pub mod web_search;

pub use fetch_url::{FetchUrlArgs, FetchUrlOutput};
pub use web_search::{WebSearchArgs, WebSearchOutput};

use crate::error::DispatchError;
use crate::model::{FunctionDefinition, ToolDefinition};
use aetherforge_client::{FetchOptions, Fetcher};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// Characters of page text returned to the model per fetch.
pub const DEFAULT_TEXT_LIMIT: usize = 2_000;

pub const WEB_SEARCH: &str = "web_search";
pub const FETCH_URL: &str = "fetch_url";

/// A decoded tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    WebSearch(WebSearchArgs),
    FetchUrl(FetchUrlArgs),
}

impl ToolCall {
    /// Decode a tool name and its JSON argument string.
    ///
    /// Arguments that are not a JSON object are treated as `{}`.
    pub fn decode(name: &str, args_json: &str) -> Result<Self, DispatchError> {
        let args = match serde_json::from_str::<Value>(args_json) {
            Ok(value @ Value::Object(_)) => value,
            _ => {
                if !args_json.trim().is_empty() {
                    tracing::debug!("undecodable arguments for {}: {}", name, args_json);
                }
                json!({})
            }
        };

        match name {
            WEB_SEARCH => decode_args(WEB_SEARCH, args).map(ToolCall::WebSearch),
            FETCH_URL => decode_args(FETCH_URL, args).map(ToolCall::FetchUrl),
            other => Err(DispatchError::UnknownTool(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::WebSearch(_) => WEB_SEARCH,
            ToolCall::FetchUrl(_) => FETCH_URL,
        }
    }
}

fn decode_args<T: DeserializeOwned>(tool: &'static str, args: Value) -> Result<T, DispatchError> {
    serde_json::from_value(args).map_err(|e| DispatchError::InvalidArguments { tool, reason: e.to_string() })
}

/// Result handed back to the model for one tool call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    WebSearch(WebSearchOutput),
    FetchUrl(FetchUrlOutput),
    Error { error: String },
}

impl ToolOutput {
    /// URL of a fetch, if this output came from one and it is non-empty.
    pub fn source_url(&self) -> Option<&str> {
        match self {
            ToolOutput::FetchUrl(out) if !out.url.is_empty() => Some(&out.url),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| json!({ "error": e.to_string() }))
    }

    /// Serialized form used as tool message content.
    pub fn to_content(&self) -> String {
        self.to_json().to_string()
    }
}

impl From<DispatchError> for ToolOutput {
    fn from(err: DispatchError) -> Self {
        ToolOutput::Error { error: err.to_string() }
    }
}

/// Executes tool calls against the fetcher and search stub.
pub struct ToolDispatcher {
    fetcher: Fetcher,
    fetch_defaults: FetchOptions,
    text_limit: usize,
}

impl ToolDispatcher {
    pub fn new(fetcher: Fetcher, fetch_defaults: FetchOptions) -> Self {
        Self { fetcher, fetch_defaults, text_limit: DEFAULT_TEXT_LIMIT }
    }

    /// Override how many characters of page text reach the model.
    pub fn with_text_limit(mut self, text_limit: usize) -> Self {
        self.text_limit = text_limit;
        self
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Decode and run one tool call. Never fails.
    pub async fn call_tool(&self, name: &str, args_json: &str) -> ToolOutput {
        match ToolCall::decode(name, args_json) {
            Ok(call) => self.execute(&call).await,
            Err(e) => {
                tracing::warn!("tool dispatch rejected {}: {}", name, e);
                e.into()
            }
        }
    }

    pub async fn execute(&self, call: &ToolCall) -> ToolOutput {
        tracing::info!(tool = call.name(), "executing tool call");
        match call {
            ToolCall::WebSearch(args) => ToolOutput::WebSearch(web_search::search_impl(args)),
            ToolCall::FetchUrl(args) => ToolOutput::FetchUrl(
                fetch_url::fetch_impl(&self.fetcher, &self.fetch_defaults, args, self.text_limit).await,
            ),
        }
    }
}

/// Declarations of the two tools in the OpenAI `tools` format.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            kind: "function",
            function: FunctionDefinition {
                name: WEB_SEARCH,
                description: "Search the web and return candidate links.",
                parameters: json!({
                    "type": "object",
                    "properties": {"query": {"type": "string"}},
                    "required": ["query"]
                }),
            },
        },
        ToolDefinition {
            kind: "function",
            function: FunctionDefinition {
                name: FETCH_URL,
                description: "Fetch a web page and return a cleaned title and text.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "url": {"type": "string"},
                        "timeout": {"type": "integer", "minimum": 1, "maximum": 60}
                    },
                    "required": ["url"]
                }),
            },
        },
    ]
}
