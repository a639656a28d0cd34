use super::{capture, single_step, Matcher, Utterance};
use crate::types::{Plan, Step};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

static CLOSE_APP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:please\s+)?(?:close|quit|exit|kill)\s+(?:the\s+|my\s+)?([\w.+-]+(?:\s+[\w.+-]+)?)$").unwrap()
});
static OPEN_APP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:please\s+)?(?:open|launch|start|run)\s+(?:the\s+|my\s+)?([\w.+-]+(?:\s+[\w.+-]+)?)$").unwrap()
});
static APP_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+(?:app|application|program)$").unwrap());

const NOT_APPS: &[&str] = &["a", "an", "it", "this", "that", "everything", "all"];

fn app_name(re: &Regex, u: &Utterance) -> Option<String> {
    let raw = capture(re, &u.original, 1)?;
    let name = APP_SUFFIX.replace(&raw, "").trim().to_string();
    let first = name.split_whitespace().next()?.to_lowercase();
    if NOT_APPS.contains(&first.as_str()) {
        return None;
    }
    Some(name)
}

pub struct CloseAppMatcher;

impl Matcher for CloseAppMatcher {
    fn name(&self) -> &'static str {
        "close_app"
    }

    fn try_match(&self, u: &Utterance) -> Option<Plan> {
        let app = app_name(&CLOSE_APP, u)?;
        Some(single_step(
            format!("Close {}", app),
            0.1,
            Step::new(
                "close_application",
                json!({ "app_name": app }),
                format!("Close {}", app),
            ),
            format!("Closing {}...", app),
        ))
    }
}

pub struct OpenAppMatcher;

impl Matcher for OpenAppMatcher {
    fn name(&self) -> &'static str {
        "open_app"
    }

    fn try_match(&self, u: &Utterance) -> Option<Plan> {
        let app = app_name(&OPEN_APP, u)?;
        Some(single_step(
            format!("Open {}", app),
            0.1,
            Step::new(
                "open_application",
                json!({ "app_name": app }),
                format!("Launch {}", app),
            ),
            format!("Opening {}...", app),
        ))
    }
}
