use super::{capture, clean_payload, single_step, Matcher, Utterance};
use crate::types::{Plan, Step};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

static SEARCH_AND_SEND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:please\s+)?(?:search|find|look\s+up)\s+(?:for\s+)?(.+?)\s+and\s+(?:then\s+)?send\s+(?:it\s+|that\s+|this\s+|the\s+(?:link|video|url)\s+)?to\s+(\w+)",
    )
    .unwrap()
});
static PLATFORM_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+(?:on|in|from)\s+(?:youtube|google)$").unwrap());
static MEDIA_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+(?:videos?|songs?|clips?)$").unwrap());

static WA_SEND_MESSAGE_TO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)send\s+(\w[\w\s]{0,50}?)\s+message\s+to\s+(\w+)").unwrap());
static WA_SEND_VIA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)send\s+(\w+)\s+to\s+(\w+)\s+(?:on|via|in|through)\s+whatsapp").unwrap()
});
static WA_SEARCH_CONTACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:search|find)\s+(\w+)").unwrap());
static WA_TO_CONTACT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bto\s+(\w+)").unwrap());
static WA_IN_CONTACTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)\s+in\s+(?:my\s+)?contact").unwrap());
static WA_QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"['"]([^'"]+)['"]"#).unwrap());
static WA_VERB_MESSAGE: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["type", "say", "write"]
        .iter()
        .map(|kw| {
            Regex::new(&format!(
                r#"(?i)\b{}\s+['"]?(\w[\w\s]{{0,50}}?)['"]?\s*(?:\b(?:message|to|in)\b|$)"#,
                kw
            ))
            .unwrap()
        })
        .collect()
});

static EMAIL_TO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bto\s+([\w._%+\-]+@[\w.\-]+\.\w+)").unwrap());
static EMAIL_SUBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bsubject\s+['"]?(.+?)['"]?\s*(?:\bbody\b|\bsaying\b|\bmessage\b|$)"#).unwrap()
});
static EMAIL_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\b(?:body|saying|message)\s+['"]?(.+?)['"]?$"#).unwrap());

const CONTACT_STOPWORDS: &[&str] = &[
    "whatsapp", "web", "chrome", "browser", "my", "in", "the", "a", "and", "or", "to", "go",
    "open", "send", "type", "message", "contact", "search", "find", "him", "her", "them", "it",
    "please", "now", "then", "after", "new", "start", "chat", "write", "say", "with", "via", "on",
];
const SHORT_MESSAGES: &[&str] = &["hi", "hello", "hey", "ok", "yes", "no"];

fn is_stopword(word: &str) -> bool {
    CONTACT_STOPWORDS.contains(&word.to_lowercase().as_str())
}

/// "search X and send it to Y": a search whose URL is forwarded over WhatsApp.
pub struct SearchAndSendMatcher;

impl SearchAndSendMatcher {
    fn clean_query(raw: &str) -> String {
        let query = PLATFORM_SUFFIX.replace(raw.trim(), "");
        let query = MEDIA_SUFFIX.replace(query.trim(), "");
        clean_payload(&query)
    }
}

impl Matcher for SearchAndSendMatcher {
    fn name(&self) -> &'static str {
        "search_and_send"
    }

    fn try_match(&self, u: &Utterance) -> Option<Plan> {
        let caps = SEARCH_AND_SEND.captures(&u.original)?;
        let query = Self::clean_query(caps.get(1)?.as_str());
        let contact = caps.get(2)?.as_str().to_lowercase();
        if query.is_empty() || is_stopword(&contact) {
            return None;
        }

        let (tool, site) = if u.has("google") {
            ("google_search", "Google")
        } else {
            ("youtube_search", "YouTube")
        };

        Some(Plan::new(
            format!("Search {} for '{}' and send the link to {}", site, query, contact),
            0.6,
            vec![
                Step::new(
                    tool,
                    json!({ "query": query }),
                    format!("Search {} for '{}'", site, query),
                ),
                Step::new(
                    "send_whatsapp_message",
                    json!({ "contact": contact, "message": "{{last.url}}" }),
                    format!("Send the result link to {} on WhatsApp", contact),
                ),
            ],
            format!("Searching {} for '{}' and sending it to {}...", site, query, contact),
        ))
    }
}

pub struct WhatsAppMatcher;

impl WhatsAppMatcher {
    fn contact_and_message(u: &Utterance) -> (Option<String>, Option<String>) {
        if let Some(c) = WA_SEND_MESSAGE_TO.captures(&u.original) {
            let contact = c[2].to_lowercase();
            if !is_stopword(&contact) {
                return (Some(contact), Some(c[1].trim().to_string()));
            }
        }

        if let Some(c) = WA_SEND_VIA.captures(&u.original) {
            let contact = c[2].to_lowercase();
            let message = c[1].to_string();
            if !is_stopword(&contact) && !is_stopword(&message) {
                return (Some(contact), Some(message));
            }
        }

        let contact = WA_SEARCH_CONTACT
            .captures(&u.lower)
            .map(|c| c[1].to_string())
            .filter(|w| !is_stopword(w))
            .or_else(|| {
                WA_TO_CONTACT
                    .captures_iter(&u.lower)
                    .map(|c| c[1].to_string())
                    .find(|w| !is_stopword(w))
            })
            .or_else(|| {
                WA_IN_CONTACTS
                    .captures(&u.lower)
                    .map(|c| c[1].to_string())
                    .filter(|w| !is_stopword(w))
            });

        (contact, None)
    }

    fn fallback_message(u: &Utterance, contact: &str) -> String {
        for re in WA_VERB_MESSAGE.iter() {
            if let Some(c) = re.captures(&u.original) {
                let candidate = c[1].trim().to_string();
                let lower = candidate.to_lowercase();
                if !candidate.is_empty() && !is_stopword(&lower) && lower != contact {
                    return candidate;
                }
            }
        }

        if let Some(quoted) = WA_QUOTED.captures_iter(&u.original).last() {
            return quoted[1].to_string();
        }

        u.words()
            .find(|w| SHORT_MESSAGES.contains(w))
            .unwrap_or("hi")
            .to_string()
    }
}

impl Matcher for WhatsAppMatcher {
    fn name(&self) -> &'static str {
        "whatsapp"
    }

    fn try_match(&self, u: &Utterance) -> Option<Plan> {
        if !u.has("whatsapp") {
            return None;
        }

        let (contact, message) = Self::contact_and_message(u);
        let contact = contact?;
        let message = message.unwrap_or_else(|| Self::fallback_message(u, &contact));

        Some(single_step(
            format!("Send WhatsApp message to {}", contact),
            0.6,
            Step::new(
                "send_whatsapp_message",
                json!({ "contact": contact, "message": message }),
                format!("Open WhatsApp Web, find {}, send '{}'", contact, message),
            ),
            format!("Sending '{}' to {} on WhatsApp Web...", message, contact),
        ))
    }
}

pub struct EmailMatcher;

impl Matcher for EmailMatcher {
    fn name(&self) -> &'static str {
        "email"
    }

    fn try_match(&self, u: &Utterance) -> Option<Plan> {
        if !u.has_any(&["gmail", "email", "send mail", "mail to"]) {
            return None;
        }

        let to = capture(&EMAIL_TO, &u.original, 1)?;
        let subject =
            capture(&EMAIL_SUBJECT, &u.original, 1).unwrap_or_else(|| "No Subject".to_string());
        let body = capture(&EMAIL_BODY, &u.original, 1).unwrap_or_default();

        Some(single_step(
            format!("Send email to {}", to),
            0.5,
            Step::new(
                "gmail_send",
                json!({ "to": to, "subject": subject, "body": body }),
                format!("Send email to {}", to),
            ),
            format!("Sending email to {}...", to),
        ))
    }
}
