//! AetherForge agent: a bounded tool-calling loop over an OpenAI-compatible
//! chat endpoint, with web_search and fetch_url tools.

pub mod conversation;
pub mod error;
pub mod model;
pub mod tools;

pub use conversation::{Agent, ChatOutcome, ROUND_LIMIT_MESSAGE, SYSTEM_PROMPT};
pub use error::{DispatchError, ModelError};
pub use model::{AssistantReply, ChatModel, ChatRequest, Message, OpenAiChatClient, ToolCallRequest};
pub use tools::{ToolCall, ToolDispatcher, ToolOutput, tool_definitions};
