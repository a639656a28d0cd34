use super::{capture, single_step, Matcher, Utterance};
use crate::types::{Plan, Step};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(https?://[^\s]+|www\.[^\s]+|[a-z0-9-]+(?:\.[a-z0-9-]+)*\.(?:com|org|net|io|dev|ai|co|in|edu|gov|app)(?:/[^\s]*)?)").unwrap()
});
static FETCH_VERB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:please\s+)?(?:read|summari[sz]e|fetch|get|scrape|what does)\b").unwrap()
});
static OPEN_VERB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:please\s+)?(?:open|go\s+to|visit|browse\s+to|navigate\s+to)\b").unwrap());

static GOOGLE_QUERY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:google\s+search(?:\s+for)?|search(?:\s+for)?|google(?:\s+for)?|look\s+up)\s+(.+?)(?:\s+(?:on|in|using|with)\s+google)?$").unwrap()
});
static YOUTUBE_QUERY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:youtube\s+search(?:\s+for)?|search(?:\s+for)?|play|watch|youtube(?:\s+for)?|find)\s+(.+?)(?:\s+(?:on|in|from)\s+youtube)?$").unwrap()
});

pub(crate) fn normalize_url(raw: &str) -> String {
    let url = raw.trim_end_matches(&[',', ';', ')', '"', '\''][..]);
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

pub struct WebpageMatcher;

impl Matcher for WebpageMatcher {
    fn name(&self) -> &'static str {
        "webpage"
    }

    fn try_match(&self, u: &Utterance) -> Option<Plan> {
        let raw = URL.find(&u.original)?.as_str();
        let url = normalize_url(raw);

        if FETCH_VERB.is_match(&u.lower) {
            return Some(single_step(
                format!("Read webpage {}", url),
                0.4,
                Step::new(
                    "fetch_webpage",
                    json!({ "url": url }),
                    format!("Fetch and read {}", url),
                ),
                format!("Reading {}...", url),
            ));
        }

        if OPEN_VERB.is_match(&u.lower) {
            return Some(single_step(
                format!("Open {}", url),
                0.1,
                Step::new("open_url", json!({ "url": url }), format!("Open {}", url)),
                format!("Opening {}...", url),
            ));
        }

        None
    }
}

pub struct GoogleSearchMatcher;

impl Matcher for GoogleSearchMatcher {
    fn name(&self) -> &'static str {
        "google_search"
    }

    fn try_match(&self, u: &Utterance) -> Option<Plan> {
        if !u.has("google") || u.has("youtube") {
            return None;
        }
        let query = capture(&GOOGLE_QUERY, &u.original, 1)?;
        if query.eq_ignore_ascii_case("google") {
            return None;
        }

        Some(single_step(
            format!("Search Google for: {}", query),
            0.2,
            Step::new(
                "google_search",
                json!({ "query": query }),
                format!("Search Google for '{}'", query),
            ),
            format!("Searching Google for '{}'...", query),
        ))
    }
}

pub struct YoutubeSearchMatcher;

impl Matcher for YoutubeSearchMatcher {
    fn name(&self) -> &'static str {
        "youtube_search"
    }

    fn try_match(&self, u: &Utterance) -> Option<Plan> {
        if !u.has("youtube") {
            return None;
        }
        let query = capture(&YOUTUBE_QUERY, &u.original, 1)?;
        if query.eq_ignore_ascii_case("youtube") {
            return None;
        }

        Some(single_step(
            format!("Search YouTube for: {}", query),
            0.2,
            Step::new(
                "youtube_search",
                json!({ "query": query }),
                format!("Search YouTube for '{}'", query),
            ),
            format!("Searching YouTube for '{}'...", query),
        ))
    }
}
