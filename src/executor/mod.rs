mod interpolate;
mod pool;
mod safety;

pub use interpolate::{has_placeholders, interpolate_args, interpolate_str};
pub use pool::{WorkerPool, DEFAULT_POOL_SIZE};
pub use safety::{
    default_destructive_tools, default_destructive_words, default_payload_tools, SafetyGate,
    SafetyPolicy, BLOCKED_MESSAGE,
};

use crate::tools::ToolRunner;
use crate::types::*;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Hooks around each step of a run. Returning false from either hook stops
/// the run; steps already recorded are kept.
#[async_trait]
pub trait StepObserver: Send + Sync {
    async fn before_step(&self, _index: usize, _total: usize, _step: &Step) -> bool {
        true
    }

    async fn after_step(&self, _index: usize, _total: usize, _record: &ActionRecord) -> bool {
        true
    }
}

struct Unobserved;

impl StepObserver for Unobserved {}

pub struct StepExecutor {
    tools: Arc<dyn ToolRunner>,
    gate: SafetyGate,
    pool: WorkerPool,
}

impl StepExecutor {
    pub fn new(tools: Arc<dyn ToolRunner>, policy: SafetyPolicy) -> Self {
        let pool = WorkerPool::for_tools(tools.has_exclusive_tools(), DEFAULT_POOL_SIZE);
        Self::with_pool(tools, policy, pool)
    }

    pub fn with_pool(tools: Arc<dyn ToolRunner>, policy: SafetyPolicy, pool: WorkerPool) -> Self {
        Self {
            tools,
            gate: SafetyGate::new(policy),
            pool,
        }
    }

    pub fn tools(&self) -> &Arc<dyn ToolRunner> {
        &self.tools
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn gate(&self) -> &SafetyGate {
        &self.gate
    }

    /// Runs one step: safety gate, tool lookup, interpolation from the
    /// previous record, then the blocking call on the worker pool.
    pub async fn run_step(&self, step: &Step, previous: Option<&ActionRecord>) -> ActionRecord {
        if let Err(e) = self.gate.check(step) {
            warn!("{}", e);
            return ActionRecord::not_run(step, BLOCKED_MESSAGE);
        }

        if step.tool.is_empty() || !self.tools.has_tool(&step.tool) {
            warn!("skipping unknown tool '{}'", step.tool);
            return ActionRecord::not_run(step, format!("Unknown tool: {}", step.tool));
        }

        let args = match previous.and_then(|p| p.raw_result.as_ref()) {
            Some(outcome) => interpolate_args(&step.args, outcome),
            None => {
                if has_placeholders(&step.args) {
                    warn!(
                        "step '{}' references a previous result that is not available",
                        step.tool
                    );
                }
                step.args.clone()
            }
        };

        let tools = self.tools.clone();
        let tool = step.tool.clone();
        let call_args = args.clone();
        let outcome = match self
            .pool
            .run(move || tools.execute(&tool, &call_args))
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => ToolOutcome::failed(e.to_string()),
        };

        debug!("{} -> {}", step.tool, outcome);
        ActionRecord::executed(step, args, outcome)
    }

    /// Runs every step in order. Failures are recorded and narrated into
    /// `reply`; they never stop the remaining steps.
    pub async fn run(&self, steps: &[Step], reply: &mut String) -> Vec<ActionRecord> {
        self.run_observed(steps, reply, &Unobserved).await
    }

    /// Like `run`, but the observer sees each step (1-based index) and may
    /// stop the run early.
    pub async fn run_observed(
        &self,
        steps: &[Step],
        reply: &mut String,
        observer: &dyn StepObserver,
    ) -> Vec<ActionRecord> {
        let total = steps.len();
        let mut records: Vec<ActionRecord> = Vec::with_capacity(total);
        for (i, step) in steps.iter().enumerate() {
            if !observer.before_step(i + 1, total, step).await {
                info!("run stopped before step {}/{}", i + 1, total);
                break;
            }

            info!("step {}/{}: {} ({})", i + 1, total, step.tool, step.description);
            let record = self.run_step(step, records.last()).await;
            narrate(reply, &record);

            let carry_on = observer.after_step(i + 1, total, &record).await;
            records.push(record);
            if !carry_on {
                if i + 1 < total {
                    info!("run stopped, skipping remaining {} steps", total - i - 1);
                }
                break;
            }
        }
        records
    }
}

/// Puts an explanation for a failed step in front of the running reply.
pub fn narrate(reply: &mut String, record: &ActionRecord) {
    if record.success {
        return;
    }
    let prefix = if record.skipped && record.result == BLOCKED_MESSAGE {
        format!(
            "I didn't run '{}' because it was {}. ",
            record.tool, BLOCKED_MESSAGE
        )
    } else {
        format!("I encountered an issue: {}. ", record.message())
    };
    reply.insert_str(0, &prefix);
}
