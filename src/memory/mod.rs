mod preferences;

pub use preferences::{InMemoryPreferences, PreferenceStore, SledPreferences};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::RwLock;

pub const DEFAULT_MAX_ENTRIES: usize = 500;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "you", "your", "are", "was", "with", "that", "this", "what", "how",
    "can", "please", "from", "have", "has", "about", "into", "then", "them", "they", "will",
    "would", "could", "should", "just", "open", "tell",
];

#[async_trait]
pub trait Memory: Send + Sync {
    /// Up to `n` stored snippets relevant to `text`, best match first.
    async fn retrieve_relevant(&self, text: &str, n: usize) -> Result<Vec<String>>;

    async fn persist_turn(&self, input: &str, reply: &str, tags: &[String]) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub text: String,
    pub tags: Vec<String>,
    pub stored_at: DateTime<Utc>,
}

fn keywords(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .map(|w| w.to_lowercase())
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Bounded keyword-overlap memory. Oldest entries fall off first.
pub struct InMemoryMemory {
    entries: RwLock<VecDeque<MemoryEntry>>,
    max_entries: usize,
}

impl InMemoryMemory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            max_entries: max_entries.max(1),
        }
    }

    pub fn remember(&self, text: &str, tags: &[String]) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow!("memory lock poisoned"))?;
        entries.push_back(MemoryEntry {
            text: text.to_string(),
            tags: tags.to_vec(),
            stored_at: Utc::now(),
        });
        while entries.len() > self.max_entries {
            entries.pop_front();
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Memory for InMemoryMemory {
    async fn retrieve_relevant(&self, text: &str, n: usize) -> Result<Vec<String>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let query = keywords(text);
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow!("memory lock poisoned"))?;

        // Newest first so equal scores favour recent turns.
        let mut scored: Vec<(usize, usize, &MemoryEntry)> = entries
            .iter()
            .rev()
            .enumerate()
            .filter_map(|(age, entry)| {
                let mut words = keywords(&entry.text);
                words.extend(entry.tags.iter().map(|t| t.to_lowercase()));
                let score = query.intersection(&words).count();
                (score > 0).then_some((score, age, entry))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        Ok(scored
            .into_iter()
            .take(n)
            .map(|(_, _, e)| e.text.clone())
            .collect())
    }

    async fn persist_turn(&self, input: &str, reply: &str, tags: &[String]) -> Result<()> {
        self.remember(&format!("User: {} | Assistant: {}", input, reply), tags)
    }
}
