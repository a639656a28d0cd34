mod events;

pub use events::{EventSink, FrameDecoder, StreamEvent};

use crate::brain::{parse_brain_prefix, route, BrainGateway, Chatbot, HISTORY_WINDOW};
use crate::context::augment;
use crate::executor::{StepExecutor, StepObserver};
use crate::history::{TaskStore, TaskUpdate};
use crate::intercept::Interceptor;
use crate::memory::{InMemoryPreferences, Memory, PreferenceStore};
use crate::slash::{is_slash_command, needs_availability, SlashCommandHandler};
use crate::types::*;
use async_trait::async_trait;
use chrono::{Local, Timelike};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};

pub const DEFAULT_CONTEXT_RESULTS: usize = 3;
const STREAM_BUFFER: usize = 32;

/// What a command has done so far, kept outside the command future so a
/// fault can still be reported and recorded.
#[derive(Default)]
struct Progress {
    task_id: Option<TaskId>,
    brain: Option<String>,
    plan: Option<Plan>,
    actions: Vec<ActionRecord>,
}

fn lock_progress(progress: &Mutex<Progress>) -> std::sync::MutexGuard<'_, Progress> {
    progress.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected internal fault".to_string()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

/// Streams step progress and keeps the fault record current. Stops the run
/// once the consumer has gone away.
struct StreamObserver<'a> {
    sink: &'a EventSink,
    progress: &'a Mutex<Progress>,
}

#[async_trait]
impl StepObserver for StreamObserver<'_> {
    async fn before_step(&self, index: usize, total: usize, step: &Step) -> bool {
        let connected = self
            .sink
            .emit(StreamEvent::ActionStart {
                step: index,
                total,
                tool: step.tool.clone(),
                description: step.description.clone(),
                args: step.args.clone(),
            })
            .await;
        if !connected {
            info!("stream consumer went away before step {}", index);
        }
        connected
    }

    async fn after_step(&self, index: usize, total: usize, record: &ActionRecord) -> bool {
        lock_progress(self.progress).actions.push(record.clone());
        let connected = self
            .sink
            .emit(StreamEvent::Action {
                step: index,
                total,
                tool: record.tool.clone(),
                args: record.args.clone(),
                result: record.result.clone(),
                success: record.success,
            })
            .await;
        if !connected {
            info!("stream consumer went away after step {}", index);
        }
        connected
    }
}

/// Turns one user command into a reply: slash dispatch, routing,
/// interception or planning, sequential execution, then persistence.
pub struct SessionPipeline {
    gateway: Arc<BrainGateway>,
    interceptor: Interceptor,
    executor: StepExecutor,
    memory: Arc<dyn Memory>,
    tasks: Arc<dyn TaskStore>,
    preferences: Arc<dyn PreferenceStore>,
    chatbot: Option<Arc<dyn Chatbot>>,
    default_brain: RwLock<BrainId>,
    context_results: usize,
}

impl SessionPipeline {
    pub fn new(
        gateway: Arc<BrainGateway>,
        executor: StepExecutor,
        memory: Arc<dyn Memory>,
        tasks: Arc<dyn TaskStore>,
    ) -> Self {
        Self {
            gateway,
            interceptor: Interceptor::new(),
            executor,
            memory,
            tasks,
            preferences: Arc::new(InMemoryPreferences::new()),
            chatbot: None,
            default_brain: RwLock::new(BrainId::Auto),
            context_results: DEFAULT_CONTEXT_RESULTS,
        }
    }

    pub fn with_chatbot(mut self, chatbot: Arc<dyn Chatbot>) -> Self {
        self.chatbot = Some(chatbot);
        self
    }

    pub fn with_preferences(mut self, preferences: Arc<dyn PreferenceStore>) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_default_brain(self, brain: BrainId) -> Self {
        self.set_default_brain(brain);
        self
    }

    pub fn with_interceptor(mut self, interceptor: Interceptor) -> Self {
        self.interceptor = interceptor;
        self
    }

    pub fn with_context_results(mut self, n: usize) -> Self {
        self.context_results = n;
        self
    }

    pub fn gateway(&self) -> &Arc<BrainGateway> {
        &self.gateway
    }

    pub fn executor(&self) -> &StepExecutor {
        &self.executor
    }

    pub fn tasks(&self) -> &Arc<dyn TaskStore> {
        &self.tasks
    }

    pub fn preferences(&self) -> &Arc<dyn PreferenceStore> {
        &self.preferences
    }

    pub fn default_brain(&self) -> BrainId {
        match self.default_brain.read() {
            Ok(b) => *b,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn set_default_brain(&self, brain: BrainId) {
        match self.default_brain.write() {
            Ok(mut b) => *b = brain,
            Err(poisoned) => *poisoned.into_inner() = brain,
        }
    }

    /// Batch form: runs the command to completion and returns the final response.
    pub async fn process(&self, input: &str, history: &[ChatTurn]) -> AgentResponse {
        self.run_guarded(input, history, &EventSink::discard()).await
    }

    /// Streaming form: progress events in execution order, always ending in
    /// a `complete`. Dropping the stream stops any steps not yet started.
    pub fn stream(
        self: Arc<Self>,
        input: impl Into<String>,
        history: Vec<ChatTurn>,
    ) -> ReceiverStream<StreamEvent> {
        let input = input.into();
        let (sink, rx) = EventSink::channel(STREAM_BUFFER);
        tokio::spawn(async move {
            self.run_guarded(&input, &history, &sink).await;
        });
        ReceiverStream::new(rx)
    }

    pub async fn run_guarded(
        &self,
        input: &str,
        history: &[ChatTurn],
        sink: &EventSink,
    ) -> AgentResponse {
        let started = Instant::now();
        let progress = Mutex::new(Progress::default());

        let outcome = AssertUnwindSafe(self.execute(input, history, sink, &progress, started))
            .catch_unwind()
            .await;

        match outcome {
            Ok(resp) => {
                sink.emit(StreamEvent::complete(&resp, None)).await;
                resp
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("pipeline fault while handling '{}': {}", input, message);

                let (resp, plan) = {
                    let progress = lock_progress(&progress);
                    let resp = AgentResponse {
                        reply: format!("I ran into an error processing your request: {}", message),
                        brain: progress.brain.clone().unwrap_or_else(|| "system".to_string()),
                        actions: progress.actions.iter().map(ActionRecord::stripped).collect(),
                        duration_ms: elapsed_ms(started),
                        task_id: progress.task_id,
                        success: false,
                    };
                    (resp, progress.plan.clone())
                };

                if let Some(id) = resp.task_id {
                    let mut update = TaskUpdate::from(&resp);
                    if let Some(plan) = &plan {
                        update = update.with_plan(plan);
                    }
                    if let Err(e) = self.tasks.update(id, update) {
                        warn!("failed to record faulted task {}: {}", id, e);
                    }
                }

                sink.emit(StreamEvent::Error {
                    message: message.clone(),
                })
                .await;
                sink.emit(StreamEvent::complete(&resp, Some(message))).await;
                resp
            }
        }
    }

    async fn execute(
        &self,
        input: &str,
        history: &[ChatTurn],
        sink: &EventSink,
        progress: &Mutex<Progress>,
        started: Instant,
    ) -> AgentResponse {
        if is_slash_command(input) {
            let mut handler = SlashCommandHandler::new(
                self.tasks.as_ref(),
                self.preferences.as_ref(),
                &self.default_brain,
            )
            .with_tools(self.executor.tools().as_ref());
            if needs_availability(input) {
                handler = handler.with_availability(self.gateway.availability().await);
            }
            return handler.handle(input);
        }

        let (prefixed, text) = parse_brain_prefix(input);

        let task_id = match self.tasks.create(&text) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("failed to create task record: {}", e);
                None
            }
        };
        lock_progress(progress).task_id = task_id;

        let availability = self.gateway.availability().await;
        let default_brain = self.default_brain();
        let forced = prefixed.or(Some(default_brain).filter(BrainId::is_concrete));
        let routed = route(&text, forced, &availability);
        info!(
            "routed to {} (forced: {:?}, local: {}, cloud-a: {}, cloud-b: {})",
            routed, forced, availability.local, availability.cloud_a, availability.cloud_b
        );

        let mut brain_label = routed.as_str().to_string();
        lock_progress(progress).brain = Some(brain_label.clone());

        sink.emit(StreamEvent::Thinking {
            brain: brain_label.clone(),
            message: format!("Thinking with {} brain...", routed.as_str().to_uppercase()),
        })
        .await;

        let plan = match self.interceptor.intercept_named(&text) {
            Some((matcher, plan)) => {
                info!("intercepted by {} ({} steps)", matcher, plan.steps.len());
                plan
            }
            None => {
                let memories = match self.memory.retrieve_relevant(&text, self.context_results).await {
                    Ok(m) => m,
                    Err(e) => {
                        warn!("memory retrieval failed: {}", e);
                        Vec::new()
                    }
                };
                let prompt = augment(&text, &memories, Local::now().hour());
                let (used, plan) = self.gateway.plan(routed, &prompt).await;
                brain_label = used.as_str().to_string();
                lock_progress(progress).brain = Some(brain_label.clone());
                plan
            }
        };
        debug!(
            "plan intent={} complexity={:.2} steps={}",
            plan.intent,
            plan.complexity,
            plan.steps.len()
        );
        lock_progress(progress).plan = Some(plan.clone());

        let mut reply = plan.response.clone();
        let mut actions: Vec<ActionRecord> = Vec::new();

        if plan.is_conversational() {
            if let Some(chatbot) = &self.chatbot {
                sink.emit(StreamEvent::Thinking {
                    brain: brain_label.clone(),
                    message: "Crafting a thoughtful response...".to_string(),
                })
                .await;
                let window = &history[history.len().saturating_sub(HISTORY_WINDOW)..];
                match chatbot.chat(&text, window).await {
                    Ok(answer) => {
                        reply = answer.reply;
                        brain_label = answer.brain;
                        lock_progress(progress).brain = Some(brain_label.clone());
                    }
                    Err(e) => warn!("chatbot failed, keeping plan response: {}", e),
                }
            }
        } else {
            let observer = StreamObserver { sink, progress };
            actions = self
                .executor
                .run_observed(&plan.steps, &mut reply, &observer)
                .await;
        }

        let resp = AgentResponse {
            reply,
            brain: brain_label,
            success: all_succeeded(&actions),
            actions: actions.iter().map(ActionRecord::stripped).collect(),
            duration_ms: elapsed_ms(started),
            task_id,
        };

        if let Some(id) = task_id {
            if let Err(e) = self.tasks.update(id, TaskUpdate::from(&resp).with_plan(&plan)) {
                warn!("failed to update task {}: {}", id, e);
            }
        }

        let tags = vec![resp.brain.clone(), plan.intent.clone()];
        if let Err(e) = self.memory.persist_turn(&text, &resp.reply, &tags).await {
            warn!("failed to persist turn: {}", e);
        }

        info!(
            "task {:?} finished in {}ms via {} (success: {})",
            task_id, resp.duration_ms, resp.brain, resp.success
        );
        resp
    }
}
