use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

pub type TaskId = u64;
pub type StepArgs = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BrainId {
    Local,
    CloudA,
    CloudB,
    Auto,
}

impl BrainId {
    pub const CONCRETE: [BrainId; 3] = [BrainId::Local, BrainId::CloudA, BrainId::CloudB];

    pub fn as_str(&self) -> &'static str {
        match self {
            BrainId::Local => "local",
            BrainId::CloudA => "cloud-a",
            BrainId::CloudB => "cloud-b",
            BrainId::Auto => "auto",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "local" | "ollama" => Some(BrainId::Local),
            "cloud-a" | "cloud_a" | "gemini" | "google" => Some(BrainId::CloudA),
            "cloud-b" | "cloud_b" | "claude" | "anthropic" => Some(BrainId::CloudB),
            "auto" => Some(BrainId::Auto),
            _ => None,
        }
    }

    pub fn is_concrete(&self) -> bool {
        !matches!(self, BrainId::Auto)
    }
}

impl fmt::Display for BrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub tool: String,
    #[serde(default)]
    pub args: StepArgs,
    #[serde(default)]
    pub description: String,
}

impl Step {
    pub fn new(tool: impl Into<String>, args: Value, description: impl Into<String>) -> Self {
        let args = match args {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            tool: tool.into(),
            args,
            description: description.into(),
        }
    }

    pub fn arg_str(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub intent: String,
    pub complexity: f32,
    pub steps: Vec<Step>,
    pub response: String,
}

impl Plan {
    pub fn new(
        intent: impl Into<String>,
        complexity: f32,
        steps: Vec<Step>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            intent: intent.into(),
            complexity: complexity.clamp(0.0, 1.0),
            steps,
            response: response.into(),
        }
    }

    /// A plan with no tool work; the pipeline hands these to the chatbot.
    pub fn conversational(intent: impl Into<String>, response: impl Into<String>) -> Self {
        Self::new(intent, 0.0, Vec::new(), response)
    }

    pub fn degraded(response: impl Into<String>) -> Self {
        Self::new("error", 0.0, Vec::new(), response)
    }

    pub fn is_conversational(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Typed result envelope returned by every tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl ToolOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// `message` resolves to the outcome message unless a tool stored its own field of that name.
    pub fn field(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(value) => Some(value.as_str()),
            None if key == "message" => Some(self.message.as_str()),
            None => None,
        }
    }
}

impl fmt::Display for ToolOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let icon = if self.success { "✓" } else { "✗" };
        write!(f, "{} {}", icon, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub tool: String,
    pub args: StepArgs,
    pub description: String,
    pub result: String,
    pub success: bool,
    #[serde(default)]
    pub skipped: bool,
    #[serde(skip)]
    pub raw_result: Option<ToolOutcome>,
}

impl ActionRecord {
    pub fn executed(step: &Step, args: StepArgs, outcome: ToolOutcome) -> Self {
        Self {
            tool: step.tool.clone(),
            args,
            description: step.description.clone(),
            result: outcome.to_string(),
            success: outcome.success,
            skipped: false,
            raw_result: Some(outcome),
        }
    }

    pub fn not_run(step: &Step, message: impl Into<String>) -> Self {
        Self {
            tool: step.tool.clone(),
            args: step.args.clone(),
            description: step.description.clone(),
            result: message.into(),
            success: false,
            skipped: true,
            raw_result: None,
        }
    }

    pub fn stripped(&self) -> Self {
        Self {
            raw_result: None,
            ..self.clone()
        }
    }

    pub fn message(&self) -> &str {
        match &self.raw_result {
            Some(outcome) => outcome.message.as_str(),
            None => self.result.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub reply: String,
    pub brain: String,
    pub actions: Vec<ActionRecord>,
    pub duration_ms: u64,
    pub task_id: Option<TaskId>,
    pub success: bool,
}

impl AgentResponse {
    pub fn system(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            brain: "system".to_string(),
            actions: Vec::new(),
            duration_ms: 0,
            task_id: None,
            success: true,
        }
    }
}

pub fn all_succeeded(actions: &[ActionRecord]) -> bool {
    actions.iter().all(|a| a.success)
}
