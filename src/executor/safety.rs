use crate::types::Step;
use anyhow::{anyhow, Result};
use regex::Regex;

pub const BLOCKED_MESSAGE: &str = "blocked by safety setting";

#[derive(Debug, Clone)]
pub struct SafetyPolicy {
    pub require_confirmation: bool,
    /// Name patterns, matched against whole `_`/`-` separated segments of the
    /// tool name: "shutdown" catches `force_shutdown`, "delete_file" catches
    /// `delete_file_now`.
    pub destructive_tools: Vec<String>,
    /// Whole words or phrases looked for in step descriptions.
    pub destructive_words: Vec<String>,
    /// Tools whose descriptions carry user text (queries, message bodies,
    /// note contents). They are judged by name only.
    pub payload_tools: Vec<String>,
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self {
            require_confirmation: true,
            destructive_tools: default_destructive_tools(),
            destructive_words: default_destructive_words(),
            payload_tools: default_payload_tools(),
        }
    }
}

pub fn default_destructive_tools() -> Vec<String> {
    ["delete", "remove", "shutdown", "reboot"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn default_destructive_words() -> Vec<String> {
    ["delete", "shutdown", "shut down", "reboot"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn default_payload_tools() -> Vec<String> {
    [
        "open_url",
        "google_search",
        "youtube_search",
        "send_whatsapp_message",
        "gmail_send",
        "take_note",
        "remember_fact",
        "set_reminder",
        "fetch_webpage",
        "read_screen",
        "media_control",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl SafetyPolicy {
    pub fn permissive() -> Self {
        Self {
            require_confirmation: false,
            ..Self::default()
        }
    }
}

fn segments(name: &str) -> Vec<String> {
    name.to_lowercase()
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn words_regex(words: &[String]) -> Option<Regex> {
    let alternatives: Vec<String> = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(|w| {
            w.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect();
    if alternatives.is_empty() {
        return None;
    }
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|"))).ok()
}

pub struct SafetyGate {
    policy: SafetyPolicy,
    tool_patterns: Vec<Vec<String>>,
    words: Option<Regex>,
}

impl SafetyGate {
    pub fn new(policy: SafetyPolicy) -> Self {
        let tool_patterns = policy
            .destructive_tools
            .iter()
            .map(|t| segments(t))
            .filter(|s| !s.is_empty())
            .collect();
        let words = words_regex(&policy.destructive_words);
        Self {
            policy,
            tool_patterns,
            words,
        }
    }

    pub fn policy(&self) -> &SafetyPolicy {
        &self.policy
    }

    fn destructive_name(&self, tool: &str) -> bool {
        let name = segments(tool);
        self.tool_patterns.iter().any(|pattern| {
            name.windows(pattern.len())
                .any(|window| window == pattern.as_slice())
        })
    }

    fn carries_payload(&self, tool: &str) -> bool {
        self.policy
            .payload_tools
            .iter()
            .any(|t| t.eq_ignore_ascii_case(tool))
    }

    pub fn is_destructive(&self, step: &Step) -> bool {
        if self.destructive_name(&step.tool) {
            return true;
        }
        if self.carries_payload(&step.tool) {
            return false;
        }
        self.words
            .as_ref()
            .map(|re| re.is_match(&step.description))
            .unwrap_or(false)
    }

    /// Rejects destructive steps while confirmation is required. Args are
    /// never consulted, so the verdict depends only on tool and description.
    pub fn check(&self, step: &Step) -> Result<()> {
        if self.policy.require_confirmation && self.is_destructive(step) {
            return Err(anyhow!(
                "'{}' was {} (confirmation required for destructive actions)",
                step.tool,
                BLOCKED_MESSAGE
            ));
        }
        Ok(())
    }
}
