mod apps;
mod messaging;
mod system;
mod web;

pub use apps::{CloseAppMatcher, OpenAppMatcher};
pub use messaging::{EmailMatcher, SearchAndSendMatcher, WhatsAppMatcher};
pub use system::{GitMatcher, MediaMatcher, NotesMatcher, PowerMatcher, ReminderMatcher, VisionMatcher};
pub use web::{GoogleSearchMatcher, WebpageMatcher, YoutubeSearchMatcher};

use crate::types::{Plan, Step};
use regex::Regex;
use tracing::debug;

/// One command as seen by the matchers: the trimmed original text plus a
/// lower-cased copy for keyword tests. Payloads are re-read from `original`.
#[derive(Debug, Clone)]
pub struct Utterance {
    pub original: String,
    pub lower: String,
}

impl Utterance {
    pub fn new(text: &str) -> Self {
        let original = text
            .trim()
            .trim_end_matches(&['.', '!', '?'][..])
            .trim()
            .to_string();
        let lower = original.to_lowercase();
        Self { original, lower }
    }

    pub fn has(&self, word: &str) -> bool {
        self.lower.contains(word)
    }

    pub fn has_any(&self, words: &[&str]) -> bool {
        words.iter().any(|w| self.lower.contains(w))
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.lower.split_whitespace()
    }
}

pub trait Matcher: Send + Sync {
    fn name(&self) -> &'static str;

    fn try_match(&self, utterance: &Utterance) -> Option<Plan>;
}

pub struct Interceptor {
    matchers: Vec<Box<dyn Matcher>>,
}

impl Interceptor {
    /// The full cascade in priority order.
    pub fn new() -> Self {
        Self {
            matchers: vec![
                Box::new(SearchAndSendMatcher),
                Box::new(WhatsAppMatcher),
                Box::new(EmailMatcher),
                Box::new(PowerMatcher),
                Box::new(ReminderMatcher),
                Box::new(VisionMatcher),
                Box::new(MediaMatcher),
                Box::new(GitMatcher),
                Box::new(NotesMatcher),
                Box::new(WebpageMatcher),
                Box::new(GoogleSearchMatcher),
                Box::new(YoutubeSearchMatcher),
                Box::new(CloseAppMatcher),
                Box::new(OpenAppMatcher),
            ],
        }
    }

    pub fn empty() -> Self {
        Self {
            matchers: Vec::new(),
        }
    }

    pub fn with_matcher(mut self, matcher: Box<dyn Matcher>) -> Self {
        self.matchers.push(matcher);
        self
    }

    pub fn matchers(&self) -> &[Box<dyn Matcher>] {
        &self.matchers
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.matchers.iter().map(|m| m.name()).collect()
    }

    pub fn intercept(&self, text: &str) -> Option<Plan> {
        self.intercept_named(text).map(|(_, plan)| plan)
    }

    /// First matcher to produce a plan with at least one step wins.
    pub fn intercept_named(&self, text: &str) -> Option<(&'static str, Plan)> {
        let utterance = Utterance::new(text);
        if utterance.lower.is_empty() {
            return None;
        }

        for matcher in &self.matchers {
            if let Some(plan) = matcher.try_match(&utterance) {
                if plan.steps.is_empty() {
                    debug!("matcher {} produced an empty plan, skipping", matcher.name());
                    continue;
                }
                return Some((matcher.name(), plan));
            }
        }
        None
    }
}

impl Default for Interceptor {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn single_step(
    intent: impl Into<String>,
    complexity: f32,
    step: Step,
    response: impl Into<String>,
) -> Plan {
    Plan::new(intent, complexity, vec![step], response)
}

pub(crate) fn capture(re: &Regex, text: &str, group: usize) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(group))
        .map(|m| clean_payload(m.as_str()))
        .filter(|s| !s.is_empty())
}

/// Trims whitespace and wrapping quotes from an extracted payload.
pub(crate) fn clean_payload(text: &str) -> String {
    text.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}
