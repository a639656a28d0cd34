#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use deskmind::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct FakeBrain {
    id: BrainId,
    available: AtomicBool,
    plan: Plan,
    chat_reply: Option<String>,
    pub plan_calls: AtomicUsize,
    pub availability_calls: AtomicUsize,
    pub last_prompt: Mutex<Option<String>>,
}

impl FakeBrain {
    pub fn new(id: BrainId, available: bool, plan: Plan) -> Self {
        Self {
            id,
            available: AtomicBool::new(available),
            plan,
            chat_reply: None,
            plan_calls: AtomicUsize::new(0),
            availability_calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn with_chat(mut self, reply: &str) -> Self {
        self.chat_reply = Some(reply.to_string());
        self
    }

    pub fn set_available(&self, up: bool) {
        self.available.store(up, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.plan_calls.load(Ordering::SeqCst)
    }

    pub fn availability_checks(&self) -> usize {
        self.availability_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Brain for FakeBrain {
    fn id(&self) -> BrainId {
        self.id
    }

    async fn is_available(&self) -> bool {
        self.availability_calls.fetch_add(1, Ordering::SeqCst);
        self.available.load(Ordering::SeqCst)
    }

    async fn plan(&self, text: &str) -> Plan {
        self.plan_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(text.to_string());
        self.plan.clone()
    }

    async fn chat(&self, _history: &[ChatTurn], _text: &str) -> Result<String> {
        self.chat_reply
            .clone()
            .ok_or_else(|| anyhow!("no chat configured"))
    }
}

/// Records every call. `youtube_search`/`google_search` return a `url`
/// field, `fail_tool` fails, `panic_tool` panics, `slow_tool` sleeps.
#[derive(Default)]
pub struct FakeTools {
    pub calls: Mutex<Vec<(String, StepArgs)>>,
    pub exclusive: bool,
}

impl FakeTools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclusive() -> Self {
        Self {
            exclusive: true,
            ..Self::default()
        }
    }

    pub fn called(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn args_of(&self, tool: &str) -> Option<StepArgs> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| name == tool)
            .map(|(_, args)| args.clone())
    }
}

const FAKE_TOOLS: &[&str] = &[
    "youtube_search",
    "google_search",
    "send_whatsapp_message",
    "open_application",
    "close_application",
    "delete_file",
    "power_action",
    "git_action",
    "fail_tool",
    "panic_tool",
    "slow_tool",
    "echo",
    "list_reminders",
];

impl ToolRunner for FakeTools {
    fn has_tool(&self, name: &str) -> bool {
        FAKE_TOOLS.contains(&name)
    }

    fn execute(&self, name: &str, args: &StepArgs) -> ToolOutcome {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), args.clone()));

        let query = args.get("query").and_then(|v| v.as_str()).unwrap_or("");
        match name {
            "youtube_search" => ToolOutcome::ok(format!("Searched YouTube for '{}'", query))
                .with_field(
                    "url",
                    format!(
                        "https://www.youtube.com/results?search_query={}",
                        query.replace(' ', "+")
                    ),
                ),
            "google_search" => ToolOutcome::ok(format!("Searched Google for '{}'", query))
                .with_field(
                    "url",
                    format!("https://www.google.com/search?q={}", query.replace(' ', "+")),
                ),
            "fail_tool" => ToolOutcome::failed("the tool broke"),
            "panic_tool" => panic!("tool exploded"),
            "slow_tool" => {
                std::thread::sleep(Duration::from_millis(100));
                ToolOutcome::ok("slow done")
            }
            "list_reminders" => ToolOutcome::ok("No pending reminders."),
            other => ToolOutcome::ok(format!("{} done", other)),
        }
    }

    fn has_exclusive_tools(&self) -> bool {
        self.exclusive
    }

    fn tool_names(&self) -> Vec<String> {
        FAKE_TOOLS.iter().map(|s| s.to_string()).collect()
    }
}

pub struct FakeChatbot {
    reply: Option<String>,
    pub calls: AtomicUsize,
}

impl FakeChatbot {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Chatbot for FakeChatbot {
    async fn chat(&self, _text: &str, _history: &[ChatTurn]) -> Result<ChatReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Some(reply) => Ok(ChatReply {
                reply: reply.clone(),
                brain: "chatbot".to_string(),
            }),
            None => Err(anyhow!("chatbot offline")),
        }
    }
}

pub struct FailingMemory;

#[async_trait]
impl Memory for FailingMemory {
    async fn retrieve_relevant(&self, _text: &str, _n: usize) -> Result<Vec<String>> {
        Err(anyhow!("memory offline"))
    }

    async fn persist_turn(&self, _input: &str, _reply: &str, _tags: &[String]) -> Result<()> {
        Err(anyhow!("memory offline"))
    }
}

pub fn step(tool: &str, args: serde_json::Value, description: &str) -> Step {
    Step::new(tool, args, description)
}

pub fn executor(tools: Arc<FakeTools>, policy: SafetyPolicy) -> StepExecutor {
    StepExecutor::new(tools, policy)
}

pub fn gateway_with(brains: Vec<Arc<FakeBrain>>) -> Arc<BrainGateway> {
    let mut gateway = BrainGateway::new();
    for brain in brains {
        gateway.register(brain);
    }
    Arc::new(gateway)
}

pub fn pipeline_with(
    brains: Vec<Arc<FakeBrain>>,
    tools: Arc<FakeTools>,
) -> (SessionPipeline, Arc<InMemoryTaskStore>, Arc<InMemoryMemory>) {
    let tasks = Arc::new(InMemoryTaskStore::new());
    let memory = Arc::new(InMemoryMemory::new());
    let pipeline = SessionPipeline::new(
        gateway_with(brains),
        StepExecutor::new(tools, SafetyPolicy::default()),
        memory.clone(),
        tasks.clone(),
    );
    (pipeline, tasks, memory)
}
