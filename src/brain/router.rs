use crate::types::BrainId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const COMPLEX_KEYWORDS: &[&str] = &[
    "prepare",
    "organize",
    "optimize",
    "set up",
    "setup",
    "environment",
    "workflow",
    "configure",
    "analyze",
    "and then",
    "after that",
    "also",
    "multiple",
    "all of",
    "every",
    "create a script",
    "write code",
    "generate",
    "explain",
    "summarize",
    "compare",
    "research",
];

const VISUAL_KEYWORDS: &[&str] = &[
    "screen",
    "screenshot",
    "image",
    "see",
    "look at",
    "what is on",
    "read this",
    "analyze this",
    "what do you see",
    "capture",
];

const SHORT_UTTERANCE_WORDS: usize = 8;
const LONG_UTTERANCE_WORDS: usize = 15;

static VISUAL_RE: Lazy<Regex> = Lazy::new(|| keyword_regex(VISUAL_KEYWORDS));
static COMPLEX_RE: Lazy<Regex> = Lazy::new(|| keyword_regex(COMPLEX_KEYWORDS));

static SIMPLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^open \w+$",
        r"^close \w+$",
        r"^search .+$",
        r"^type .+$",
        r"^what (is|are) (my )?(cpu|ram|memory|battery|disk)",
        r"^(how much|show) (ram|memory|cpu|disk|battery)",
        r"^show (running )?processes$",
        r"^(what time|what date)",
        r"^(open|go to) .+ (and|then) (search|go to|open|type)",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^@(local|ollama|gemini|google|cloud-a|claude|anthropic|cloud-b)\b\s*")
        .expect("valid prefix regex")
});

fn keyword_regex(words: &[&str]) -> Regex {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{})\b", alternation)).expect("valid keyword regex")
}

/// Per-request reachability of each concrete brain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub local: bool,
    pub cloud_a: bool,
    pub cloud_b: bool,
}

impl Availability {
    pub fn all() -> Self {
        Self {
            local: true,
            cloud_a: true,
            cloud_b: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_available(&self, brain: BrainId) -> bool {
        match brain {
            BrainId::Local => self.local,
            BrainId::CloudA => self.cloud_a,
            BrainId::CloudB => self.cloud_b,
            BrainId::Auto => self.any(),
        }
    }

    pub fn any(&self) -> bool {
        self.local || self.cloud_a || self.cloud_b
    }

    pub fn first_available(&self, order: &[BrainId]) -> Option<BrainId> {
        order.iter().copied().find(|b| self.is_available(*b))
    }

    pub fn set(&mut self, brain: BrainId, up: bool) {
        match brain {
            BrainId::Local => self.local = up,
            BrainId::CloudA => self.cloud_a = up,
            BrainId::CloudB => self.cloud_b = up,
            BrainId::Auto => {}
        }
    }
}

fn cloud_or_local(availability: &Availability) -> BrainId {
    availability
        .first_available(&[BrainId::CloudA, BrainId::CloudB])
        .unwrap_or(BrainId::Local)
}

fn vision_or_local(availability: &Availability) -> BrainId {
    if availability.cloud_a {
        BrainId::CloudA
    } else {
        BrainId::Local
    }
}

/// Picks the brain for one utterance. Pure: no probing, no state.
pub fn route(text: &str, forced: Option<BrainId>, availability: &Availability) -> BrainId {
    if let Some(brain) = forced.filter(BrainId::is_concrete) {
        return brain;
    }

    if !availability.local {
        return cloud_or_local(availability);
    }

    let text = text.trim().to_lowercase();

    if VISUAL_RE.is_match(&text) {
        return vision_or_local(availability);
    }

    if SIMPLE_PATTERNS.iter().any(|p| p.is_match(&text)) {
        return BrainId::Local;
    }

    if COMPLEX_RE.is_match(&text) {
        return cloud_or_local(availability);
    }

    let words = text.split_whitespace().count();
    if words <= SHORT_UTTERANCE_WORDS {
        BrainId::Local
    } else if words >= LONG_UTTERANCE_WORDS {
        cloud_or_local(availability)
    } else {
        BrainId::Local
    }
}

/// Splits an `@brain` prefix off the input. Returns the input untouched when none is present.
pub fn parse_brain_prefix(input: &str) -> (Option<BrainId>, String) {
    let trimmed = input.trim_start();
    match PREFIX_RE.captures(trimmed) {
        Some(caps) => {
            let brain = caps.get(1).and_then(|m| BrainId::parse(m.as_str()));
            let rest = &trimmed[caps.get(0).map(|m| m.end()).unwrap_or(0)..];
            (brain, rest.trim().to_string())
        }
        None => (None, input.to_string()),
    }
}
