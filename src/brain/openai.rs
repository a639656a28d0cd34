use super::llm_client::{LlmClient, LlmConfig, ReplyFormat};
use super::parse::{normalize_plan, transport_failure};
use super::prompt::{CHAT_SYSTEM_PROMPT, PLANNER_SYSTEM_PROMPT};
use super::Brain;
use crate::types::{BrainId, ChatTurn, Plan};
use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

/// OpenAI-compatible chat-completions brain. Serves the `cloud-a` slot and
/// handles the vision-flavoured requests the router sends its way.
pub struct OpenAiBrain {
    client: LlmClient,
}

impl OpenAiBrain {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = LlmClient::new(config)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Brain for OpenAiBrain {
    fn id(&self) -> BrainId {
        BrainId::CloudA
    }

    async fn is_available(&self) -> bool {
        self.client.has_credentials()
    }

    async fn plan(&self, text: &str) -> Plan {
        match self
            .client
            .chat(PLANNER_SYSTEM_PROMPT, &[], text, ReplyFormat::Json)
            .await
        {
            Ok(content) => {
                debug!("{} planner output: {}", self.client.config().model, content);
                normalize_plan(&content)
            }
            Err(e) => {
                warn!("cloud-a planning failed: {}", e);
                transport_failure("cloud-a", &e)
            }
        }
    }

    async fn chat(&self, history: &[ChatTurn], text: &str) -> Result<String> {
        self.client
            .chat(CHAT_SYSTEM_PROMPT, history, text, ReplyFormat::Text)
            .await
    }
}
