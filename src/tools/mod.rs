mod process;
mod system;

pub use process::{output_with_timeout, spawn_detached};
pub use system::{page_text, Reminder, SystemToolConfig, SystemToolRunner, MAX_PAGE_BYTES};

use crate::types::{StepArgs, ToolOutcome};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("{tool}: missing argument '{arg}'")]
    MissingArgument { tool: String, arg: String },

    #[error("{tool}: invalid argument '{arg}': {reason}")]
    InvalidArgument {
        tool: String,
        arg: String,
        reason: String,
    },

    #[error("{0} is not supported on this platform")]
    Unsupported(String),

    #[error("{tool} failed: {reason}")]
    Failed { tool: String, reason: String },

    #[error("{program} timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ToolResult = std::result::Result<ToolOutcome, ToolError>;

/// Synchronous tool registry. Calls may block; the executor runs them on its
/// worker pool.
pub trait ToolRunner: Send + Sync {
    fn has_tool(&self, name: &str) -> bool;

    fn execute(&self, name: &str, args: &StepArgs) -> ToolOutcome;

    /// True when some registered tool drives a single shared OS session and
    /// calls must therefore be serialized process-wide.
    fn has_exclusive_tools(&self) -> bool {
        false
    }

    fn tool_names(&self) -> Vec<String>;
}

pub fn required_str<'a>(tool: &str, args: &'a StepArgs, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolError::MissingArgument {
            tool: tool.to_string(),
            arg: key.to_string(),
        })
}

pub fn optional_str<'a>(args: &'a StepArgs, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub fn optional_u64(args: &StepArgs, key: &str) -> Option<u64> {
    match args.get(key)? {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
