use crate::types::{StepArgs, ToolOutcome};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use tracing::warn;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*(last\.[^{}\s]*|last_url|last_result)\s*\}\}").unwrap()
});
static FIELD_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").unwrap());

fn lookup<'a>(token: &str, previous: &'a ToolOutcome) -> Option<&'a str> {
    match token {
        "last_url" => previous.field("url"),
        "last_result" => Some(previous.message.as_str()),
        _ => {
            let key = token.strip_prefix("last.")?;
            if !FIELD_KEY.is_match(key) {
                warn!("placeholder key '{}' is not a valid field name", key);
                return None;
            }
            previous.field(key)
        }
    }
}

pub fn has_placeholders(args: &StepArgs) -> bool {
    args.values().any(value_has_placeholder)
}

fn value_has_placeholder(value: &Value) -> bool {
    match value {
        Value::String(s) => PLACEHOLDER.is_match(s),
        Value::Array(items) => items.iter().any(value_has_placeholder),
        Value::Object(map) => map.values().any(value_has_placeholder),
        _ => false,
    }
}

pub fn interpolate_str(text: &str, previous: &ToolOutcome) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &Captures| {
            let token = &caps[1];
            match lookup(token, previous) {
                Some(value) => value.to_string(),
                None => {
                    warn!("placeholder '{}' left unresolved", &caps[0]);
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

fn interpolate_value(value: &Value, previous: &ToolOutcome) -> Value {
    match value {
        Value::String(s) => Value::String(interpolate_str(s, previous)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|v| interpolate_value(v, previous))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), interpolate_value(v, previous)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Substitutes `{{last.<field>}}`, `{{last_url}}` and `{{last_result}}` in
/// every string argument with values from the previous step's outcome.
pub fn interpolate_args(args: &StepArgs, previous: &ToolOutcome) -> StepArgs {
    args.iter()
        .map(|(k, v)| (k.clone(), interpolate_value(v, previous)))
        .collect()
}
