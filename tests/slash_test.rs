mod common;

use common::FakeTools;
use deskmind::slash::*;
use deskmind::*;
use std::sync::RwLock;

struct Fixture {
    tasks: InMemoryTaskStore,
    prefs: InMemoryPreferences,
    brain: RwLock<BrainId>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            tasks: InMemoryTaskStore::new(),
            prefs: InMemoryPreferences::new(),
            brain: RwLock::new(BrainId::Auto),
        }
    }

    fn handler(&self) -> SlashCommandHandler<'_> {
        SlashCommandHandler::new(&self.tasks, &self.prefs, &self.brain)
    }

    fn current(&self) -> BrainId {
        *self.brain.read().unwrap()
    }
}

#[test]
fn test_is_slash_command() {
    assert!(is_slash_command("/help"));
    assert!(is_slash_command("  /status"));
    assert!(!is_slash_command("open /tmp"));
}

#[test]
fn test_only_status_needs_availability() {
    assert!(needs_availability("/status"));
    assert!(needs_availability("  /STATUS now"));
    assert!(!needs_availability("/help"));
    assert!(!needs_availability("/clear"));
    assert!(!needs_availability("/statusbar"));
}

#[test]
fn test_help_lists_commands() {
    let f = Fixture::new();
    let resp = f.handler().handle("/help");
    assert_eq!(resp.brain, "system");
    assert!(resp.success);
    for cmd in ["/status", "/memory", "/brain", "/briefing", "/clear", "/preferences"] {
        assert!(resp.reply.contains(cmd), "help is missing {}", cmd);
    }
}

#[test]
fn test_brain_switch_and_aliases() {
    let f = Fixture::new();

    let resp = f.handler().handle("/brain claude");
    assert!(resp.reply.contains("CLOUD-B"));
    assert_eq!(f.current(), BrainId::CloudB);
    assert_eq!(
        f.prefs.get(DEFAULT_BRAIN_KEY).unwrap().as_deref(),
        Some("cloud-b")
    );

    let resp = f.handler().handle("/BRAIN auto");
    assert!(resp.reply.contains("AUTO"));
    assert_eq!(f.current(), BrainId::Auto);
}

#[test]
fn test_brain_without_argument_shows_current() {
    let f = Fixture::new();
    *f.brain.write().unwrap() = BrainId::Local;
    let resp = f.handler().handle("/brain");
    assert!(resp.reply.contains("Current brain: **LOCAL**"));
    assert!(resp.reply.contains("Usage"));
}

#[test]
fn test_unknown_brain_leaves_state_alone() {
    let f = Fixture::new();
    let resp = f.handler().handle("/brain gpt5");
    assert_eq!(
        resp.reply,
        "Unknown brain: gpt5. Use: local, cloud-a, cloud-b, auto"
    );
    assert_eq!(f.current(), BrainId::Auto);
    assert!(f.prefs.get(DEFAULT_BRAIN_KEY).unwrap().is_none());
}

#[test]
fn test_memory_lists_recent_tasks() {
    let f = Fixture::new();
    assert_eq!(f.handler().handle("/memory").reply, "No tasks in memory yet.");

    let id = f.tasks.create("open chrome").unwrap();
    f.tasks
        .update(
            id,
            TaskUpdate {
                brain: "local".to_string(),
                reply: "ok".to_string(),
                actions: Vec::new(),
                success: true,
                duration_ms: 3,
                ..Default::default()
            },
        )
        .unwrap();
    f.tasks.create("still running").unwrap();

    let reply = f.handler().handle("/memory").reply;
    assert!(reply.contains("• [✓] open chrome (local)"));
    assert!(reply.contains("• [?] still running (pending)"));
}

#[test]
fn test_clear_returns_sentinel() {
    let f = Fixture::new();
    assert_eq!(f.handler().handle("/clear").reply, CLEAR_CHAT_SENTINEL);
}

#[test]
fn test_preferences() {
    let f = Fixture::new();
    assert_eq!(
        f.handler().handle("/preferences").reply,
        "No preferences stored yet."
    );
    f.prefs.set("name", "Sam").unwrap();
    assert!(f.handler().handle("/preferences").reply.contains("• name: Sam"));
}

#[test]
fn test_status_reports_brains() {
    let f = Fixture::new();
    let avail = Availability {
        local: true,
        cloud_a: false,
        cloud_b: true,
    };
    let reply = f.handler().with_availability(avail).handle("/status").reply;
    assert!(reply.contains("• Local: 🟢 Online"));
    assert!(reply.contains("• Cloud A: 🔴 Offline"));
    assert!(reply.contains("• Cloud B: 🟢 Online"));
    assert!(reply.contains("Active Brain: AUTO"));
}

#[test]
fn test_briefing_uses_reminder_tool() {
    let f = Fixture::new();
    let tools = FakeTools::new();
    let reply = f.handler().with_tools(&tools).handle("/briefing").reply;
    assert!(reply.starts_with("**Good "));
    assert!(reply.contains("No pending reminders."));
    assert!(reply.contains("• System: "));
    assert_eq!(tools.called(), vec!["list_reminders"]);
}

#[test]
fn test_unknown_command() {
    let f = Fixture::new();
    let resp = f.handler().handle("/dance now");
    assert_eq!(
        resp.reply,
        "Unknown command: /dance now\nType `/help` for available commands."
    );
    assert!(resp.success);
    assert_eq!(resp.brain, "system");
}
