use crate::types::{Plan, Step, StepArgs};
use serde::Deserialize;
use serde_json::Value;

pub const PARSE_FAILURE_RESPONSE: &str =
    "I understood your request but had trouble parsing it. Please try rephrasing.";
const DEFAULT_RESPONSE: &str = "Done!";

#[derive(Debug, Deserialize)]
struct RawPlan {
    intent: Option<String>,
    complexity: Option<f64>,
    steps: Option<Vec<RawStep>>,
    response: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawStep {
    tool: Option<String>,
    args: Option<Value>,
    description: Option<String>,
}

impl From<RawStep> for Step {
    fn from(raw: RawStep) -> Self {
        let args = match raw.args {
            Some(Value::Object(map)) => map,
            _ => StepArgs::new(),
        };
        Step {
            tool: raw.tool.unwrap_or_default().trim().to_string(),
            args,
            description: raw.description.unwrap_or_default(),
        }
    }
}

impl From<RawPlan> for Plan {
    fn from(raw: RawPlan) -> Self {
        let response = raw
            .response
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RESPONSE.to_string());
        Plan::new(
            raw.intent.unwrap_or_else(|| "unknown".to_string()),
            raw.complexity.unwrap_or(0.5) as f32,
            raw.steps
                .unwrap_or_default()
                .into_iter()
                .map(Step::from)
                .collect(),
            response,
        )
    }
}

fn strict(content: &str) -> Option<Plan> {
    serde_json::from_str::<RawPlan>(content.trim())
        .ok()
        .map(Plan::from)
}

fn extracted(content: &str) -> Option<Plan> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }
    strict(&content[start..=end])
}

/// Normalizes raw model output into a Plan: strict JSON, then the outermost
/// brace-delimited substring, then an apology plan with no steps.
pub fn normalize_plan(content: &str) -> Plan {
    strict(content)
        .or_else(|| extracted(content))
        .unwrap_or_else(|| Plan::new("unknown", 0.5, Vec::new(), PARSE_FAILURE_RESPONSE))
}

pub fn transport_failure(brain: &str, err: &anyhow::Error) -> Plan {
    Plan::degraded(format!("{} brain error: {}", brain, err))
}
