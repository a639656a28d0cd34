use super::parse::{normalize_plan, transport_failure};
use super::prompt::{CHAT_SYSTEM_PROMPT, PLANNER_SYSTEM_PROMPT};
use super::Brain;
use crate::types::{BrainId, ChatTurn, Plan};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
    pub request_timeout: Duration,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://api.anthropic.com".to_string(),
            model: "claude-3-5-sonnet-latest".to_string(),
            max_tokens: 2048,
            request_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Messages-API brain for the `cloud-b` slot.
pub struct AnthropicBrain {
    http: reqwest::Client,
    config: AnthropicConfig,
}

impl AnthropicBrain {
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    async fn send(&self, system: &str, history: &[ChatTurn], user: &str) -> Result<String> {
        let mut messages: Vec<Message> = history
            .iter()
            .map(|t| Message {
                role: if t.role == "assistant" { "assistant" } else { "user" },
                content: t.content.as_str(),
            })
            .collect();
        messages.push(Message {
            role: "user",
            content: user,
        });

        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system,
            messages,
        };

        let url = format!("{}/v1/messages", self.config.api_base.trim_end_matches('/'));
        let resp = self
            .http
            .post(url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("anthropic returned HTTP {}: {}", status, body));
        }

        let body: MessagesResponse = resp.json().await?;
        let text = body
            .content
            .into_iter()
            .filter(|b| b.kind == "text")
            .map(|b| b.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(anyhow!("No response content from anthropic"));
        }
        Ok(text)
    }
}

#[async_trait]
impl Brain for AnthropicBrain {
    fn id(&self) -> BrainId {
        BrainId::CloudB
    }

    async fn is_available(&self) -> bool {
        !self.config.api_key.trim().is_empty()
    }

    async fn plan(&self, text: &str) -> Plan {
        match self.send(PLANNER_SYSTEM_PROMPT, &[], text).await {
            Ok(content) => {
                debug!("anthropic planner output: {}", content);
                normalize_plan(&content)
            }
            Err(e) => {
                warn!("cloud-b planning failed: {}", e);
                transport_failure("cloud-b", &e)
            }
        }
    }

    async fn chat(&self, history: &[ChatTurn], text: &str) -> Result<String> {
        self.send(CHAT_SYSTEM_PROMPT, history, text).await
    }
}
