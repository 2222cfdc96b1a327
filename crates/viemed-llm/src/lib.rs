//! LLM provider abstraction and the medical tool-calling agent.

pub mod agent;
pub mod calculator;
pub mod error;
pub mod gemini;
pub mod prompt;
pub mod provider;

pub use agent::{AgentReply, ContextSource, MedicalAgent, ToolCallRecord};
pub use error::LlmError;
pub use gemini::GeminiProvider;
pub use prompt::PromptBuilder;
pub use provider::{LlmProvider, Message, Role};
