use super::gateway::BrainGateway;
use crate::types::{BrainId, ChatTurn};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

pub const HISTORY_WINDOW: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    pub brain: String,
}

/// Conversational fallback for plans that carry no tool work.
#[async_trait]
pub trait Chatbot: Send + Sync {
    async fn chat(&self, text: &str, history: &[ChatTurn]) -> Result<ChatReply>;
}

pub struct BrainChatbot {
    gateway: Arc<BrainGateway>,
    order: Vec<BrainId>,
}

impl BrainChatbot {
    pub fn new(gateway: Arc<BrainGateway>) -> Self {
        Self {
            gateway,
            order: vec![BrainId::Local, BrainId::CloudA, BrainId::CloudB],
        }
    }
}

#[async_trait]
impl Chatbot for BrainChatbot {
    async fn chat(&self, text: &str, history: &[ChatTurn]) -> Result<ChatReply> {
        let window = &history[history.len().saturating_sub(HISTORY_WINDOW)..];
        let mut last_err = anyhow!("no conversational brain available");

        for id in &self.order {
            let Some(brain) = self.gateway.get(*id) else {
                continue;
            };
            if !brain.is_available().await {
                continue;
            }
            match brain.chat(window, text).await {
                Ok(reply) if !reply.trim().is_empty() => {
                    return Ok(ChatReply {
                        reply: reply.trim().to_string(),
                        brain: id.to_string(),
                    })
                }
                Ok(_) => last_err = anyhow!("{} returned an empty reply", id),
                Err(e) => {
                    debug!("chat via {} failed: {}", id, e);
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }
}
