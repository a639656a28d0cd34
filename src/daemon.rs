use crate::brain::{
    AnthropicBrain, BrainChatbot, BrainGateway, OllamaBrain, OpenAiBrain,
};
use crate::config::AgentConfig;
use crate::executor::{StepExecutor, WorkerPool};
use crate::history::{InMemoryTaskStore, SledTaskStore, TaskStore};
use crate::host::HostSnapshot;
use crate::memory::{InMemoryMemory, InMemoryPreferences, PreferenceStore, SledPreferences};
use crate::notify::{Notification, Notifier};
use crate::pipeline::SessionPipeline;
use crate::slash::DEFAULT_BRAIN_KEY;
use crate::tools::{SystemToolRunner, ToolRunner};
use crate::types::BrainId;
use anyhow::Result;
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

const REMINDER_TICK: Duration = Duration::from_secs(5);

pub struct DeskDaemon {
    pipeline: Arc<SessionPipeline>,
    tools: Arc<SystemToolRunner>,
    notifier: Notifier,
    config: AgentConfig,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl DeskDaemon {
    pub fn new(config: AgentConfig) -> Result<Self> {
        info!("Initializing DeskDaemon data_dir={:?}", config.data_dir);
        std::fs::create_dir_all(&config.data_dir)?;

        let gateway = Arc::new(build_gateway(&config)?);
        info!("Registered brains: {:?}", gateway.registered());

        let tools = Arc::new(SystemToolRunner::new(config.to_tool_config()));
        let pool = WorkerPool::for_tools(tools.has_exclusive_tools(), config.policy.pool_size);
        info!("Tool worker pool size {}", pool.size());
        let executor =
            StepExecutor::with_pool(tools.clone(), config.policy.to_safety_policy(), pool);

        let (tasks, preferences): (Arc<dyn TaskStore>, Arc<dyn PreferenceStore>) =
            if config.memory.persistent {
                let db = sled::open(config.data_dir.join("store"))?;
                (
                    Arc::new(SledTaskStore::from_db(db.clone(), config.memory.max_tasks)?),
                    Arc::new(SledPreferences::from_db(&db)?),
                )
            } else {
                (
                    Arc::new(InMemoryTaskStore::with_capacity(config.memory.max_tasks)),
                    Arc::new(InMemoryPreferences::new()),
                )
            };

        let default_brain = match preferences.get(DEFAULT_BRAIN_KEY) {
            Ok(Some(stored)) => BrainId::parse(&stored).unwrap_or(config.default_brain),
            Ok(None) => config.default_brain,
            Err(e) => {
                warn!("Failed to read stored default brain: {}", e);
                config.default_brain
            }
        };
        info!("Default brain: {}", default_brain);

        let memory = Arc::new(InMemoryMemory::with_capacity(config.memory.max_turns));
        let chatbot = Arc::new(BrainChatbot::new(gateway.clone()));

        let pipeline = SessionPipeline::new(gateway, executor, memory, tasks)
            .with_preferences(preferences)
            .with_chatbot(chatbot)
            .with_default_brain(default_brain)
            .with_context_results(config.memory.context_results);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            pipeline: Arc::new(pipeline),
            tools,
            notifier: Notifier::new(),
            config,
            shutdown_tx,
            shutdown_rx,
        })
    }

    pub async fn run(&self) -> Result<()> {
        info!("Starting DeskDaemon...");

        let reminder_handle = self.spawn_reminder_loop();
        let status_handle = self.spawn_status_loop();

        info!("DeskDaemon running on {}", self.config.listen_addr());

        tokio::select! {
            _ = reminder_handle => {
                error!("Reminder loop exited unexpectedly");
            }
            _ = status_handle => {
                error!("Status loop exited unexpectedly");
            }
            _ = self.wait_for_shutdown() => {
                info!("Shutdown signal received");
            }
        }

        Ok(())
    }

    fn spawn_reminder_loop(&self) -> tokio::task::JoinHandle<()> {
        let tools = self.tools.clone();
        let notifier = self.notifier.clone();
        let mut shutdown_rx = self.shutdown_rx.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(REMINDER_TICK);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        deliver_due_reminders(&tools, Local::now(), &notifier);
                    }
                    _ = shutdown_rx.changed() => {
                        break;
                    }
                }
            }
        })
    }

    fn spawn_status_loop(&self) -> tokio::task::JoinHandle<()> {
        let pipeline = self.pipeline.clone();
        let interval = self.config.status_interval_secs.max(1);
        let mut shutdown_rx = self.shutdown_rx.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(interval));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let availability = pipeline.gateway().availability().await;
                        let host = HostSnapshot::collect();
                        debug!(
                            "Brains local={} cloud-a={} cloud-b={}; {}",
                            availability.local,
                            availability.cloud_a,
                            availability.cloud_b,
                            host.summary()
                        );
                        if !availability.any() {
                            warn!("No brain is reachable, commands will fall back to interception only");
                        }
                        match pipeline.tasks().stats() {
                            Ok(stats) => debug!(
                                "Tasks total={} completed={} success_rate={:.0}%",
                                stats.total, stats.completed, stats.success_rate
                            ),
                            Err(e) => warn!("Failed to read task stats: {}", e),
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        break;
                    }
                }
            }
        })
    }

    async fn wait_for_shutdown(&self) {
        let mut rx = self.shutdown_rx.clone();
        while !*rx.borrow() {
            let _ = rx.changed().await;
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn pipeline(&self) -> &Arc<SessionPipeline> {
        &self.pipeline
    }

    pub fn tools(&self) -> &Arc<SystemToolRunner> {
        &self.tools
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Takes the reminders due at `now` and publishes each to the notifier.
/// Returns how many came due.
pub fn deliver_due_reminders(
    tools: &SystemToolRunner,
    now: DateTime<Local>,
    notifier: &Notifier,
) -> usize {
    let due = tools.take_due_reminders(now);
    let count = due.len();
    for reminder in due {
        info!("⏰ Reminder #{}: {}", reminder.id, reminder.text);
        if notifier.publish(Notification::from(reminder)) == 0 {
            warn!("No client is listening for events, reminder only logged");
        }
    }
    count
}

fn build_gateway(config: &AgentConfig) -> Result<BrainGateway> {
    let mut gateway = BrainGateway::new();
    let brains = &config.brains;

    if brains.local.enabled {
        gateway.register(Arc::new(OllamaBrain::new(brains.local.to_ollama_config())?));
    }

    if brains.cloud_a.enabled {
        let llm_config = brains.cloud_a.to_llm_config();
        if llm_config.api_key.is_empty() {
            warn!(
                "cloud-a enabled but {} is not set, brain will report unavailable",
                brains.cloud_a.api_key_env
            );
        }
        gateway.register(Arc::new(OpenAiBrain::new(llm_config)?));
    }

    if brains.cloud_b.enabled {
        let anthropic_config = brains.cloud_b.to_anthropic_config();
        if anthropic_config.api_key.is_empty() {
            warn!(
                "cloud-b enabled but {} is not set, brain will report unavailable",
                brains.cloud_b.api_key_env
            );
        }
        gateway.register(Arc::new(AnthropicBrain::new(anthropic_config)?));
    }

    Ok(gateway)
}
