use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Stressed,
    Angry,
    Curious,
    Neutral,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Stressed => "stressed",
            Mood::Angry => "angry",
            Mood::Curious => "curious",
            Mood::Neutral => "neutral",
        }
    }

    pub fn tone(&self) -> &'static str {
        match self {
            Mood::Happy => "Match their energy! Be enthusiastic, playful, and celebratory.",
            Mood::Sad => "Be extra gentle, supportive, and comforting. Show empathy.",
            Mood::Stressed => "Be calming and reassuring. Help them prioritize.",
            Mood::Angry => "Be understanding but professional. Don't escalate.",
            Mood::Curious => "Be informative and encouraging of their curiosity.",
            Mood::Neutral => "Be your friendly, professional self.",
        }
    }
}

static MOOD_PATTERNS: Lazy<Vec<(Mood, Regex)>> = Lazy::new(|| {
    vec![
        (
            Mood::Happy,
            Regex::new(r"(?i)\b(happy|great|awesome|amazing|love|wonderful|fantastic|excellent|yay|haha|lol)\b").unwrap(),
        ),
        (
            Mood::Sad,
            Regex::new(r"(?i)\b(sad|depressed|unhappy|crying|alone|lonely|miss|heartbreak|down)\b").unwrap(),
        ),
        (
            Mood::Stressed,
            Regex::new(r"(?i)\b(stressed|overwhelmed|tired|exhausted|busy|deadline|pressure|anxious|worry|panic)\b").unwrap(),
        ),
        (
            Mood::Angry,
            Regex::new(r"(?i)\b(angry|furious|mad|annoyed|frustrated|hate|ugh|damn|stupid)\b").unwrap(),
        ),
        (
            Mood::Curious,
            Regex::new(r"(?i)\b(how|why|what|explain|teach|learn|understand|curious|tell me|show me|wonder)\b").unwrap(),
        ),
    ]
});

pub fn detect_mood(text: &str) -> Mood {
    MOOD_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(mood, _)| *mood)
        .unwrap_or(Mood::Neutral)
}

pub fn time_context(hour: u32) -> &'static str {
    match hour {
        0..=5 => "It's very late. Be gentle, they might be tired.",
        6..=11 => "It's morning. Be energetic and positive.",
        12..=16 => "It's afternoon. Be productive and focused.",
        17..=20 => "It's evening. Be warm and winding down.",
        _ => "It's night. Be cozy and relaxed.",
    }
}

pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    }
}

pub fn memory_block(memories: &[String]) -> String {
    if memories.is_empty() {
        return String::new();
    }
    let lines: Vec<String> = memories.iter().map(|m| format!("- {}", m)).collect();
    format!("\nRelevant Memories:\n{}\n\n", lines.join("\n"))
}

/// Text handed to a brain: a mood/tone/time header, any relevant memories,
/// then the user's own words.
pub fn augment(text: &str, memories: &[String], hour: u32) -> String {
    let mood = detect_mood(text);
    format!(
        "[Mood: {}. Tone: {} {}]\n{}{}",
        mood.as_str(),
        mood.tone(),
        time_context(hour),
        memory_block(memories),
        text
    )
}
