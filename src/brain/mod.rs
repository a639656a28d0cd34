mod anthropic;
mod chatbot;
mod gateway;
mod llm_client;
mod ollama;
mod openai;
pub mod parse;
pub mod prompt;
pub mod router;

pub use anthropic::{AnthropicBrain, AnthropicConfig};
pub use chatbot::{BrainChatbot, ChatReply, Chatbot, HISTORY_WINDOW};
pub use gateway::{BrainGateway, UNREACHABLE_RESPONSE};
pub use llm_client::{LlmClient, LlmConfig, ReplyFormat};
pub use ollama::{OllamaBrain, OllamaConfig};
pub use openai::OpenAiBrain;
pub use parse::normalize_plan;
pub use router::{parse_brain_prefix, route, Availability};

use crate::types::*;
use anyhow::anyhow;
use async_trait::async_trait;

#[async_trait]
pub trait Brain: Send + Sync {
    fn id(&self) -> BrainId;

    async fn is_available(&self) -> bool;

    /// Never fails: transport and parse problems come back as a plan with no
    /// steps and an explanatory response.
    async fn plan(&self, text: &str) -> Plan;

    async fn chat(&self, _history: &[ChatTurn], _text: &str) -> anyhow::Result<String> {
        Err(anyhow!("{} brain does not support conversation", self.id()))
    }
}
