use crate::types::*;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

pub const DEFAULT_MAX_HISTORY: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub input: String,
    pub brain: Option<String>,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub plan: Vec<Step>,
    pub reply: Option<String>,
    #[serde(default)]
    pub actions: Vec<ActionRecord>,
    pub success: Option<bool>,
    pub duration_ms: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    fn new(id: TaskId, input: &str) -> Self {
        Self {
            id,
            input: input.to_string(),
            brain: None,
            intent: None,
            plan: Vec::new(),
            reply: None,
            actions: Vec::new(),
            success: None,
            duration_ms: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    fn apply(&mut self, update: TaskUpdate) {
        self.brain = Some(update.brain);
        if update.intent.is_some() {
            self.intent = update.intent;
            self.plan = update.plan;
        }
        self.reply = Some(update.reply);
        self.actions = update.actions.iter().map(ActionRecord::stripped).collect();
        self.success = Some(update.success);
        self.duration_ms = Some(update.duration_ms);
        self.completed_at = Some(Utc::now());
    }

    pub fn status_icon(&self) -> &'static str {
        match self.success {
            Some(true) => "✓",
            Some(false) => "✗",
            None => "?",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub brain: String,
    /// `None` leaves any stored intent and plan untouched.
    pub intent: Option<String>,
    pub plan: Vec<Step>,
    pub reply: String,
    pub actions: Vec<ActionRecord>,
    pub success: bool,
    pub duration_ms: u64,
}

impl TaskUpdate {
    pub fn with_plan(mut self, plan: &Plan) -> Self {
        self.intent = Some(plan.intent.clone());
        self.plan = plan.steps.clone();
        self
    }
}

impl From<&AgentResponse> for TaskUpdate {
    fn from(resp: &AgentResponse) -> Self {
        Self {
            brain: resp.brain.clone(),
            intent: None,
            plan: Vec::new(),
            reply: resp.reply.clone(),
            actions: resp.actions.clone(),
            success: resp.success,
            duration_ms: resp.duration_ms,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub succeeded: usize,
    pub success_rate: f64,
    pub by_brain: BTreeMap<String, usize>,
}

impl TaskStats {
    pub fn from_records<'a>(records: impl Iterator<Item = &'a TaskRecord>) -> Self {
        let mut stats = TaskStats::default();
        for record in records {
            stats.total += 1;
            if let Some(success) = record.success {
                stats.completed += 1;
                if success {
                    stats.succeeded += 1;
                }
            }
            if let Some(ref brain) = record.brain {
                *stats.by_brain.entry(brain.clone()).or_insert(0) += 1;
            }
        }
        if stats.completed > 0 {
            stats.success_rate = stats.succeeded as f64 / stats.completed as f64 * 100.0;
        }
        stats
    }
}

/// Command history: one record per non-slash command, created when the
/// command arrives and completed when it finishes.
pub trait TaskStore: Send + Sync {
    fn create(&self, input: &str) -> Result<TaskId>;
    fn update(&self, id: TaskId, update: TaskUpdate) -> Result<()>;
    fn get(&self, id: TaskId) -> Result<Option<TaskRecord>>;
    /// Newest first.
    fn recent(&self, limit: usize) -> Result<Vec<TaskRecord>>;
    fn stats(&self) -> Result<TaskStats>;
}

pub struct InMemoryTaskStore {
    records: RwLock<VecDeque<TaskRecord>>,
    next_id: AtomicU64,
    max_history: usize,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_HISTORY)
    }

    pub fn with_capacity(max_history: usize) -> Self {
        Self {
            records: RwLock::new(VecDeque::new()),
            next_id: AtomicU64::new(1),
            max_history: max_history.max(1),
        }
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore for InMemoryTaskStore {
    fn create(&self, input: &str) -> Result<TaskId> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut records = self
            .records
            .write()
            .map_err(|_| anyhow!("task history lock poisoned"))?;
        records.push_back(TaskRecord::new(id, input));
        while records.len() > self.max_history {
            records.pop_front();
        }
        Ok(id)
    }

    fn update(&self, id: TaskId, update: TaskUpdate) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| anyhow!("task history lock poisoned"))?;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| anyhow!("Task {} not found", id))?;
        record.apply(update);
        Ok(())
    }

    fn get(&self, id: TaskId) -> Result<Option<TaskRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("task history lock poisoned"))?;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<TaskRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("task history lock poisoned"))?;
        Ok(records.iter().rev().take(limit).cloned().collect())
    }

    fn stats(&self) -> Result<TaskStats> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("task history lock poisoned"))?;
        Ok(TaskStats::from_records(records.iter()))
    }
}

/// Persistent history in a sled tree keyed by big-endian task id, so
/// iteration order is creation order.
pub struct SledTaskStore {
    db: sled::Db,
    tasks: sled::Tree,
    max_history: usize,
}

impl SledTaskStore {
    pub fn open<P: AsRef<Path>>(path: P, max_history: usize) -> Result<Self> {
        let db = sled::open(path)?;
        Self::from_db(db, max_history)
    }

    pub fn from_db(db: sled::Db, max_history: usize) -> Result<Self> {
        let tasks = db.open_tree("tasks")?;
        Ok(Self {
            db,
            tasks,
            max_history: max_history.max(1),
        })
    }

    fn key(id: TaskId) -> [u8; 8] {
        id.to_be_bytes()
    }

    fn decode(value: &[u8]) -> Result<TaskRecord> {
        Ok(serde_json::from_slice(value)?)
    }

    fn put(&self, record: &TaskRecord) -> Result<()> {
        let data = serde_json::to_vec(record)?;
        self.tasks.insert(Self::key(record.id), data)?;
        Ok(())
    }

    fn prune(&self) -> Result<()> {
        while self.tasks.len() > self.max_history {
            match self.tasks.pop_min()? {
                Some(_) => continue,
                None => break,
            }
        }
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        self.tasks.flush()?;
        Ok(())
    }
}

impl TaskStore for SledTaskStore {
    fn create(&self, input: &str) -> Result<TaskId> {
        // sled ids start at 0; keep 0 free so ids match the in-memory store.
        let id = self.db.generate_id()? + 1;
        self.put(&TaskRecord::new(id, input))?;
        self.prune()?;
        Ok(id)
    }

    fn update(&self, id: TaskId, update: TaskUpdate) -> Result<()> {
        let mut record = self
            .get(id)?
            .ok_or_else(|| anyhow!("Task {} not found", id))?;
        record.apply(update);
        self.put(&record)
    }

    fn get(&self, id: TaskId) -> Result<Option<TaskRecord>> {
        match self.tasks.get(Self::key(id))? {
            Some(value) => Ok(Some(Self::decode(&value)?)),
            None => Ok(None),
        }
    }

    fn recent(&self, limit: usize) -> Result<Vec<TaskRecord>> {
        let mut out = Vec::new();
        for item in self.tasks.iter().rev().take(limit) {
            let (_, value) = item?;
            out.push(Self::decode(&value)?);
        }
        Ok(out)
    }

    fn stats(&self) -> Result<TaskStats> {
        let mut records = Vec::new();
        for item in self.tasks.iter() {
            let (_, value) = item?;
            records.push(Self::decode(&value)?);
        }
        Ok(TaskStats::from_records(records.iter()))
    }
}
