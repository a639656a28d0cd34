use super::parse::{normalize_plan, transport_failure};
use super::prompt::{CHAT_SYSTEM_PROMPT, PLANNER_SYSTEM_PROMPT};
use super::Brain;
use crate::types::{BrainId, ChatTurn, Plan};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub probe_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.1".to_string(),
            probe_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Local inference through an Ollama server (`local` slot).
pub struct OllamaBrain {
    http: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaBrain {
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn send(
        &self,
        system: &str,
        history: &[ChatTurn],
        user: &str,
        format: Option<&str>,
    ) -> Result<String> {
        let mut messages = vec![ChatMessage {
            role: "system",
            content: system,
        }];
        messages.extend(history.iter().map(|t| ChatMessage {
            role: t.role.as_str(),
            content: t.content.as_str(),
        }));
        messages.push(ChatMessage {
            role: "user",
            content: user,
        });

        let request = ChatRequest {
            model: &self.config.model,
            messages,
            stream: false,
            format,
        };

        let resp = self
            .http
            .post(self.endpoint("/api/chat"))
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(anyhow!("ollama returned HTTP {}", resp.status()));
        }

        let body: ChatResponse = resp.json().await?;
        Ok(body.message.content)
    }
}

#[async_trait]
impl Brain for OllamaBrain {
    fn id(&self) -> BrainId {
        BrainId::Local
    }

    async fn is_available(&self) -> bool {
        match self
            .http
            .get(self.endpoint("/api/tags"))
            .timeout(self.config.probe_timeout)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("ollama probe failed: {}", e);
                false
            }
        }
    }

    async fn plan(&self, text: &str) -> Plan {
        match self
            .send(PLANNER_SYSTEM_PROMPT, &[], text, Some("json"))
            .await
        {
            Ok(content) => {
                debug!("ollama planner output: {}", content);
                normalize_plan(&content)
            }
            Err(e) => {
                warn!("local planning failed: {}", e);
                transport_failure("local", &e)
            }
        }
    }

    async fn chat(&self, history: &[ChatTurn], text: &str) -> Result<String> {
        self.send(CHAT_SYSTEM_PROMPT, history, text, None).await
    }
}
