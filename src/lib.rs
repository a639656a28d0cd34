pub mod api;
pub mod brain;
pub mod config;
pub mod context;
pub mod daemon;
pub mod executor;
pub mod history;
pub mod host;
pub mod intercept;
pub mod memory;
pub mod notify;
pub mod pipeline;
pub mod slash;
pub mod tools;
pub mod types;

pub use api::{create_router, AppState};
pub use brain::{
    parse_brain_prefix, route, Availability, Brain, BrainChatbot, BrainGateway, ChatReply,
    Chatbot,
};
pub use config::AgentConfig;
pub use daemon::DeskDaemon;
pub use executor::{SafetyPolicy, StepExecutor, WorkerPool};
pub use history::{InMemoryTaskStore, SledTaskStore, TaskRecord, TaskStats, TaskStore, TaskUpdate};
pub use intercept::{Interceptor, Matcher};
pub use memory::{InMemoryMemory, InMemoryPreferences, Memory, PreferenceStore, SledPreferences};
pub use notify::{Notification, Notifier};
pub use pipeline::{EventSink, FrameDecoder, SessionPipeline, StreamEvent};
pub use slash::SlashCommandHandler;
pub use tools::{SystemToolConfig, SystemToolRunner, ToolError, ToolRunner};
pub use types::*;
