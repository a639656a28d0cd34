use crate::brain::{AnthropicConfig, LlmConfig, OllamaConfig};
use crate::executor::{
    default_destructive_tools, default_destructive_words, default_payload_tools, SafetyPolicy,
};
use crate::tools::SystemToolConfig;
use crate::types::BrainId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub bind_addr: String,
    pub bind_port: u16,

    pub data_dir: PathBuf,

    pub default_brain: BrainId,

    pub brains: BrainSettings,

    pub policy: PolicySettings,

    pub memory: MemorySettings,

    pub tools: ToolSettings,

    pub status_interval_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainSettings {
    pub local: LocalBrainSettings,
    pub cloud_a: CloudASettings,
    pub cloud_b: CloudBSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalBrainSettings {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    pub probe_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudASettings {
    pub enabled: bool,
    pub api_base: Option<String>,
    pub api_key_env: String,
    pub model: String,
    pub max_tokens: u16,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudBSettings {
    pub enabled: bool,
    pub api_base: String,
    pub api_key_env: String,
    pub model: String,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    pub require_confirmation: bool,
    pub destructive_tools: Vec<String>,
    pub destructive_words: Vec<String>,
    pub payload_tools: Vec<String>,
    pub pool_size: usize,
    pub exclusive_tools: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySettings {
    pub context_results: usize,
    pub max_turns: usize,
    pub max_tasks: usize,
    pub persistent: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub command_timeout_secs: u64,
    pub fetch_max_chars: usize,
    pub git_repo: Option<PathBuf>,
    pub launch_browser: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            bind_port: 8765,
            data_dir: PathBuf::from("./deskmind-data"),
            default_brain: BrainId::Auto,
            brains: BrainSettings::default(),
            policy: PolicySettings::default(),
            memory: MemorySettings::default(),
            tools: ToolSettings::default(),
            status_interval_secs: 300,
        }
    }
}

impl Default for LocalBrainSettings {
    fn default() -> Self {
        let defaults = OllamaConfig::default();
        Self {
            enabled: true,
            base_url: defaults.base_url,
            model: defaults.model,
            probe_timeout_secs: defaults.probe_timeout.as_secs(),
            request_timeout_secs: defaults.request_timeout.as_secs(),
        }
    }
}

impl Default for CloudASettings {
    fn default() -> Self {
        let defaults = LlmConfig::default();
        Self {
            enabled: true,
            api_base: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: defaults.model,
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
        }
    }
}

impl Default for CloudBSettings {
    fn default() -> Self {
        let defaults = AnthropicConfig::default();
        Self {
            enabled: true,
            api_base: defaults.api_base,
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            model: defaults.model,
            max_tokens: defaults.max_tokens,
            request_timeout_secs: defaults.request_timeout.as_secs(),
        }
    }
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            require_confirmation: true,
            destructive_tools: default_destructive_tools(),
            destructive_words: default_destructive_words(),
            payload_tools: default_payload_tools(),
            pool_size: crate::executor::DEFAULT_POOL_SIZE,
            exclusive_tools: SystemToolConfig::default().exclusive_tools,
        }
    }
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            context_results: crate::pipeline::DEFAULT_CONTEXT_RESULTS,
            max_turns: crate::memory::DEFAULT_MAX_ENTRIES,
            max_tasks: crate::history::DEFAULT_MAX_HISTORY,
            persistent: true,
        }
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        let defaults = SystemToolConfig::default();
        Self {
            command_timeout_secs: defaults.command_timeout.as_secs(),
            fetch_max_chars: defaults.fetch_max_chars,
            git_repo: None,
            launch_browser: true,
        }
    }
}

impl LocalBrainSettings {
    pub fn to_ollama_config(&self) -> OllamaConfig {
        OllamaConfig {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            probe_timeout: Duration::from_secs(self.probe_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

impl CloudASettings {
    pub fn to_llm_config(&self) -> LlmConfig {
        let api_key = std::env::var(&self.api_key_env).unwrap_or_default();
        LlmConfig {
            api_key,
            api_base: self.api_base.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

impl CloudBSettings {
    pub fn to_anthropic_config(&self) -> AnthropicConfig {
        let api_key = std::env::var(&self.api_key_env).unwrap_or_default();
        AnthropicConfig {
            api_key,
            api_base: self.api_base.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

impl PolicySettings {
    pub fn to_safety_policy(&self) -> SafetyPolicy {
        SafetyPolicy {
            require_confirmation: self.require_confirmation,
            destructive_tools: self.destructive_tools.clone(),
            destructive_words: self.destructive_words.clone(),
            payload_tools: self.payload_tools.clone(),
        }
    }
}

impl AgentConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Defaults when the file does not exist yet.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.bind_port)
    }

    pub fn to_tool_config(&self) -> SystemToolConfig {
        SystemToolConfig {
            data_dir: self.data_dir.clone(),
            exclusive_tools: self.policy.exclusive_tools.clone(),
            command_timeout: Duration::from_secs(self.tools.command_timeout_secs),
            fetch_max_chars: self.tools.fetch_max_chars,
            git_repo: self.tools.git_repo.clone(),
            launch_browser: self.tools.launch_browser,
        }
    }
}
