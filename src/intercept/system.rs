use super::{capture, single_step, Matcher, Utterance};
use crate::types::{Plan, Step};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

const MACHINE: &str = r"(?:my\s+|the\s+|this\s+)?(?:pc|computer|laptop|system|machine)";

static POWER_CANCEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:cancel|abort|stop)\s+(?:the\s+)?(?:shut\s*down|restart|reboot)\b").unwrap()
});
static POWER_LOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(?:please\s+)?lock(?:\s+{}|\s+(?:my\s+|the\s+)?screen)?$", MACHINE))
        .unwrap()
});
static POWER_SHUTDOWN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?:please\s+)?(?:shut\s*down|power\s+off|turn\s+off)(?:\s+{})?$",
        MACHINE
    ))
    .unwrap()
});
static POWER_RESTART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(?:please\s+)?(?:restart|reboot)(?:\s+{})?$", MACHINE)).unwrap()
});
static POWER_SLEEP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?:please\s+)?(?:(?:sleep|suspend|hibernate)(?:\s+{m})?|put\s+{m}\s+to\s+sleep)$",
        m = MACHINE
    ))
    .unwrap()
});

static REMIND_IN_AFTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bremind\s+me\s+(?:to\s+)?(.+?)\s+in\s+(\d+)\s*(seconds?|secs?|minutes?|mins?|hours?|hrs?)\b").unwrap()
});
static REMIND_IN_BEFORE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bremind\s+me\s+in\s+(\d+)\s*(seconds?|secs?|minutes?|mins?|hours?|hrs?)\s+(?:to\s+)?(.+)$").unwrap()
});
static REMIND_AT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bremind\s+me\s+(?:to\s+)?(.+?)\s+at\s+(\d{1,2}):(\d{2})\b").unwrap()
});
static LIST_REMINDERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:list|show|what are)\s+(?:my\s+|all\s+)?reminders$").unwrap()
});

static SCREENSHOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:please\s+)?(?:take|capture|grab)\s+(?:a\s+)?screenshot$|^screenshot$").unwrap());
static READ_SCREEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:what'?s|what\s+is)\s+on\s+(?:my\s+|the\s+)?screen\b|\b(?:read|describe|look\s+at)\s+(?:my\s+|the\s+)?screen\b").unwrap()
});

static SPOTIFY_PLAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:please\s+)?play\s+(.+?)\s+(?:on|in)\s+spotify$").unwrap());

static GIT_SIMPLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:git\s+(status|pull|push|log)|(?:show|check)\s+(?:the\s+)?git\s+(status|log)|(pull|push)\s+(?:my\s+|the\s+)?(?:changes|code|repo))$").unwrap()
});
static GIT_COMMIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:git\s+)?commit\s+(?:(?:all|my|the)\s+)?(?:changes\s+|everything\s+)?with\s+(?:the\s+)?message\s+(.+)$"#).unwrap()
});

static TAKE_NOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:please\s+)?(?:take\s+a\s+note|make\s+a\s+note|note\s+down|write\s+down|jot\s+down)\s*(?::|that)?\s*(.+)$").unwrap()
});
static REMEMBER_FACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:please\s+)?remember\s+(?:that\s+)?(.+)$").unwrap());

pub struct PowerMatcher;

impl Matcher for PowerMatcher {
    fn name(&self) -> &'static str {
        "power"
    }

    fn try_match(&self, u: &Utterance) -> Option<Plan> {
        let (action, description, response) = if POWER_CANCEL.is_match(&u.lower) {
            ("cancel", "Abort the scheduled power-off", "Cancelling the scheduled shutdown...")
        } else if POWER_LOCK.is_match(&u.lower) {
            ("lock", "Lock the computer", "Locking your computer...")
        } else if POWER_SHUTDOWN.is_match(&u.lower) {
            ("shutdown", "Shut down the computer", "Shutting down your computer...")
        } else if POWER_RESTART.is_match(&u.lower) {
            ("restart", "Reboot the computer", "Restarting your computer...")
        } else if POWER_SLEEP.is_match(&u.lower) {
            ("sleep", "Put the computer to sleep", "Putting your computer to sleep...")
        } else {
            return None;
        };

        Some(single_step(
            format!("Power action: {}", action),
            0.2,
            Step::new("power_action", json!({ "action": action }), description),
            response,
        ))
    }
}

pub(crate) fn unit_seconds(unit: &str) -> u64 {
    let unit = unit.to_lowercase();
    if unit.starts_with('h') {
        3600
    } else if unit.starts_with('m') {
        60
    } else {
        1
    }
}

pub struct ReminderMatcher;

impl ReminderMatcher {
    fn delayed(text: String, amount: &str, unit: &str) -> Option<Plan> {
        let amount: u64 = amount.parse().ok()?;
        let delay = amount.saturating_mul(unit_seconds(unit));
        Some(single_step(
            format!("Set a reminder: {}", text),
            0.2,
            Step::new(
                "set_reminder",
                json!({ "text": text, "delay_secs": delay }),
                format!("Remind in {} {}: {}", amount, unit, text),
            ),
            format!("I'll remind you to {} in {} {}.", text, amount, unit),
        ))
    }
}

impl Matcher for ReminderMatcher {
    fn name(&self) -> &'static str {
        "reminder"
    }

    fn try_match(&self, u: &Utterance) -> Option<Plan> {
        if LIST_REMINDERS.is_match(&u.lower) {
            return Some(single_step(
                "List reminders",
                0.1,
                Step::new("list_reminders", json!({}), "List pending reminders"),
                "Here are your reminders.",
            ));
        }

        if !u.has("remind me") {
            return None;
        }

        if let Some(c) = REMIND_IN_BEFORE.captures(&u.original) {
            return Self::delayed(c[3].trim().to_string(), &c[1], &c[2]);
        }

        if let Some(c) = REMIND_IN_AFTER.captures(&u.original) {
            return Self::delayed(c[1].trim().to_string(), &c[2], &c[3]);
        }

        if let Some(c) = REMIND_AT.captures(&u.original) {
            let hour: u32 = c[2].parse().ok()?;
            let minute: u32 = c[3].parse().ok()?;
            if hour > 23 || minute > 59 {
                return None;
            }
            let at = format!("{:02}:{:02}", hour, minute);
            let text = c[1].trim().to_string();
            return Some(single_step(
                format!("Set a reminder: {}", text),
                0.2,
                Step::new(
                    "set_reminder",
                    json!({ "text": text, "at": at }),
                    format!("Remind at {}: {}", at, text),
                ),
                format!("I'll remind you to {} at {}.", text, at),
            ));
        }

        None
    }
}

pub struct VisionMatcher;

impl Matcher for VisionMatcher {
    fn name(&self) -> &'static str {
        "vision"
    }

    fn try_match(&self, u: &Utterance) -> Option<Plan> {
        if SCREENSHOT.is_match(&u.lower) {
            return Some(single_step(
                "Take a screenshot",
                0.1,
                Step::new("take_screenshot", json!({}), "Capture the screen"),
                "Taking a screenshot...",
            ));
        }

        if READ_SCREEN.is_match(&u.lower) {
            return Some(single_step(
                "Describe the screen",
                0.4,
                Step::new(
                    "read_screen",
                    json!({ "question": u.original }),
                    "Capture the screen and analyze it",
                ),
                "Let me take a look at your screen...",
            ));
        }

        None
    }
}

pub struct MediaMatcher;

impl MediaMatcher {
    fn control(lower: &str) -> Option<(&'static str, &'static str)> {
        let action = match lower {
            "play" | "resume" | "play music" | "resume music" | "play the music"
            | "resume the music" => ("play", "Resuming playback"),
            "pause" | "pause music" | "pause the music" | "stop music" | "stop the music" => {
                ("pause", "Pausing playback")
            }
            "next" | "skip" | "next song" | "next track" | "skip song" | "skip track"
            | "skip this song" | "play next song" => ("next", "Skipping to the next track"),
            "previous" | "previous song" | "previous track" | "last song" | "go back a song" => {
                ("previous", "Going back to the previous track")
            }
            "volume up" | "increase volume" | "turn up the volume" | "turn volume up"
            | "louder" => ("volume_up", "Turning the volume up"),
            "volume down" | "decrease volume" | "turn down the volume" | "turn volume down"
            | "quieter" => ("volume_down", "Turning the volume down"),
            "mute" | "unmute" | "mute volume" | "toggle mute" => ("mute", "Toggling mute"),
            _ => return None,
        };
        Some(action)
    }
}

impl Matcher for MediaMatcher {
    fn name(&self) -> &'static str {
        "media"
    }

    fn try_match(&self, u: &Utterance) -> Option<Plan> {
        if let Some(query) = capture(&SPOTIFY_PLAY, &u.original, 1) {
            return Some(single_step(
                format!("Play {} on Spotify", query),
                0.3,
                Step::new(
                    "media_control",
                    json!({ "action": "spotify", "query": query }),
                    format!("Search Spotify for '{}'", query),
                ),
                format!("Playing '{}' on Spotify...", query),
            ));
        }

        let lower = u.lower.trim_start_matches("please ").trim();
        let (action, narration) = Self::control(lower)?;
        Some(single_step(
            format!("Media control: {}", action),
            0.1,
            Step::new("media_control", json!({ "action": action }), narration),
            format!("{}...", narration),
        ))
    }
}

pub struct GitMatcher;

impl Matcher for GitMatcher {
    fn name(&self) -> &'static str {
        "git"
    }

    fn try_match(&self, u: &Utterance) -> Option<Plan> {
        if let Some(message) = capture(&GIT_COMMIT, &u.original, 1) {
            return Some(single_step(
                "Commit changes",
                0.3,
                Step::new(
                    "git_action",
                    json!({ "action": "commit", "message": message }),
                    "Commit all changes",
                ),
                format!("Committing with message '{}'...", message),
            ));
        }

        let caps = GIT_SIMPLE.captures(&u.lower)?;
        let action = (1..=3)
            .filter_map(|i| caps.get(i))
            .map(|m| m.as_str().to_string())
            .next()?;

        Some(single_step(
            format!("Git {}", action),
            0.2,
            Step::new(
                "git_action",
                json!({ "action": action }),
                format!("Run git {}", action),
            ),
            format!("Running git {}...", action),
        ))
    }
}

/// Notes go to the notes file; "remember that ..." becomes a stored fact.
pub struct NotesMatcher;

impl Matcher for NotesMatcher {
    fn name(&self) -> &'static str {
        "notes"
    }

    fn try_match(&self, u: &Utterance) -> Option<Plan> {
        if let Some(text) = capture(&TAKE_NOTE, &u.original, 1) {
            return Some(single_step(
                "Take a note",
                0.1,
                Step::new("take_note", json!({ "text": text }), "Save a note"),
                format!("Noted: {}", text),
            ));
        }

        if let Some(fact) = capture(&REMEMBER_FACT, &u.original, 1) {
            return Some(single_step(
                "Remember a fact",
                0.1,
                Step::new(
                    "remember_fact",
                    json!({ "fact": fact }),
                    "Store a fact about the user",
                ),
                format!("Got it, I'll remember that {}.", fact),
            ));
        }

        None
    }
}
