use crate::brain::Availability;
use crate::context::greeting;
use crate::history::TaskStore;
use crate::host::HostSnapshot;
use crate::memory::PreferenceStore;
use crate::tools::ToolRunner;
use crate::types::{AgentResponse, BrainId, StepArgs};
use chrono::{Local, Timelike};
use std::sync::RwLock;
use tracing::{info, warn};

pub const CLEAR_CHAT_SENTINEL: &str = "__CLEAR_CHAT__";
pub const DEFAULT_BRAIN_KEY: &str = "default_brain";

const HELP_TEXT: &str = "**Deskmind Slash Commands:**
• `/help` - Show this help
• `/status` - System status and brain availability
• `/memory` - Show the last 10 tasks
• `/brain local` - Use the local brain (Ollama, offline)
• `/brain cloud-a` - Use the first cloud brain (aliases: gemini, google)
• `/brain cloud-b` - Use the second cloud brain (aliases: claude, anthropic)
• `/brain auto` - Pick a brain per command
• `/briefing` - Get your daily briefing
• `/clear` - Clear chat history
• `/preferences` - Show stored preferences";

pub fn is_slash_command(text: &str) -> bool {
    text.trim_start().starts_with('/')
}

/// Only `/status` reports brain availability; other commands skip the network check.
pub fn needs_availability(text: &str) -> bool {
    text.split_whitespace()
        .next()
        .map(|cmd| cmd.eq_ignore_ascii_case("/status"))
        .unwrap_or(false)
}

fn status_dot(up: bool) -> &'static str {
    if up {
        "🟢 Online"
    } else {
        "🔴 Offline"
    }
}

/// Operator meta-commands. Runs synchronously against the stores it is
/// given; brain availability is probed by the caller beforehand.
pub struct SlashCommandHandler<'a> {
    tasks: &'a dyn TaskStore,
    preferences: &'a dyn PreferenceStore,
    default_brain: &'a RwLock<BrainId>,
    availability: Availability,
    tools: Option<&'a dyn ToolRunner>,
}

impl<'a> SlashCommandHandler<'a> {
    pub fn new(
        tasks: &'a dyn TaskStore,
        preferences: &'a dyn PreferenceStore,
        default_brain: &'a RwLock<BrainId>,
    ) -> Self {
        Self {
            tasks,
            preferences,
            default_brain,
            availability: Availability::none(),
            tools: None,
        }
    }

    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    pub fn with_tools(mut self, tools: &'a dyn ToolRunner) -> Self {
        self.tools = Some(tools);
        self
    }

    fn current_brain(&self) -> BrainId {
        match self.default_brain.read() {
            Ok(b) => *b,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn handle(&self, input: &str) -> AgentResponse {
        let input = input.trim();
        let mut parts = input.split_whitespace();
        let command = parts.next().unwrap_or("").to_lowercase();
        let args: Vec<&str> = parts.collect();

        let reply = match command.as_str() {
            "/help" => HELP_TEXT.to_string(),
            "/status" => self.status(),
            "/memory" => self.memory(),
            "/brain" => self.brain(args.first().copied()),
            "/clear" => CLEAR_CHAT_SENTINEL.to_string(),
            "/preferences" => self.preferences(),
            "/briefing" => self.briefing(),
            _ => format!(
                "Unknown command: {}\nType `/help` for available commands.",
                input
            ),
        };

        AgentResponse::system(reply)
    }

    fn status(&self) -> String {
        let host = HostSnapshot::collect();
        format!(
            "**System Status:**
• Host: {} ({})
• CPU: {} cores, load {:.2}
• RAM: {:.1}GB / {:.1}GB ({:.0}%)
• Disk: {:.0}% used

**AI Brains:**
• Local: {}
• Cloud A: {}
• Cloud B: {}
• Active Brain: {}",
            host.hostname,
            host.os,
            host.cores,
            host.load_one,
            host.memory_used_gb,
            host.memory_total_gb,
            host.memory_percent,
            host.disk_used_percent,
            status_dot(self.availability.local),
            status_dot(self.availability.cloud_a),
            status_dot(self.availability.cloud_b),
            self.current_brain().as_str().to_uppercase()
        )
    }

    fn memory(&self) -> String {
        let tasks = match self.tasks.recent(10) {
            Ok(t) => t,
            Err(e) => {
                warn!("failed to read task history: {}", e);
                return format!("Could not read task history: {}", e);
            }
        };
        if tasks.is_empty() {
            return "No tasks in memory yet.".to_string();
        }

        let mut lines = vec!["**Recent Tasks:**".to_string()];
        for task in &tasks {
            let input: String = task.input.chars().take(60).collect();
            lines.push(format!(
                "• [{}] {} ({})",
                task.status_icon(),
                input,
                task.brain.as_deref().unwrap_or("pending")
            ));
        }
        lines.join("\n")
    }

    fn brain(&self, arg: Option<&str>) -> String {
        let Some(name) = arg else {
            return format!(
                "Current brain: **{}**\nUsage: /brain [local|cloud-a|cloud-b|auto]",
                self.current_brain().as_str().to_uppercase()
            );
        };

        let Some(brain) = BrainId::parse(name) else {
            return format!(
                "Unknown brain: {}. Use: local, cloud-a, cloud-b, auto",
                name
            );
        };

        match self.default_brain.write() {
            Ok(mut b) => *b = brain,
            Err(poisoned) => *poisoned.into_inner() = brain,
        }
        if let Err(e) = self.preferences.set(DEFAULT_BRAIN_KEY, brain.as_str()) {
            warn!("failed to persist default brain: {}", e);
        }
        info!("default brain switched to {}", brain);

        if brain == BrainId::Auto {
            "🧠 Switched to **AUTO** brain routing".to_string()
        } else {
            format!(
                "🧠 Switched to **{}** brain",
                brain.as_str().to_uppercase()
            )
        }
    }

    fn preferences(&self) -> String {
        match self.preferences.all() {
            Ok(prefs) if prefs.is_empty() => "No preferences stored yet.".to_string(),
            Ok(prefs) => {
                let mut lines = vec!["**Stored Preferences:**".to_string()];
                lines.extend(prefs.iter().map(|(k, v)| format!("• {}: {}", k, v)));
                lines.join("\n")
            }
            Err(e) => format!("Could not read preferences: {}", e),
        }
    }

    fn briefing(&self) -> String {
        let now = Local::now();
        let mut lines = vec![
            format!("**{}!**", greeting(now.hour())),
            format!("It's {}.", now.format("%A, %d %B %Y, %I:%M %p")),
        ];

        match self.tasks.stats() {
            Ok(stats) if stats.total > 0 => lines.push(format!(
                "• Tasks so far: {} ({:.0}% successful)",
                stats.total, stats.success_rate
            )),
            Ok(_) => lines.push("• No tasks yet today.".to_string()),
            Err(e) => warn!("failed to read task stats: {}", e),
        }

        if let Some(tools) = self.tools {
            if tools.has_tool("list_reminders") {
                let outcome = tools.execute("list_reminders", &StepArgs::new());
                lines.push(format!("• {}", outcome.message));
            }
        }

        lines.push(format!("• System: {}", HostSnapshot::collect().summary()));
        lines.join("\n")
    }
}
