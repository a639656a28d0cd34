use chrono::{Duration as ChronoDuration, Local};
use deskmind::daemon::deliver_due_reminders;
use deskmind::tools::{output_with_timeout, page_text, MAX_PAGE_BYTES};
use deskmind::*;
use serde_json::json;
use std::process::Command;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn runner(dir: &TempDir) -> SystemToolRunner {
    SystemToolRunner::new(SystemToolConfig {
        data_dir: dir.path().to_path_buf(),
        launch_browser: false,
        ..SystemToolConfig::default()
    })
}

fn args(value: serde_json::Value) -> StepArgs {
    value.as_object().cloned().unwrap()
}

#[test]
fn test_page_text_decodes_entities() {
    let html = b"<html><head><title>Menu</title><style>p { color: red; }</style></head>\
        <body><p>Fish &amp; chips &#8212; it&#8217;s &lt;fresh&gt;</p>\
        <script>var x = 1;</script></body></html>";

    let text = page_text(html, 4000).unwrap();
    assert!(text.contains("Fish & chips"));
    assert!(text.contains('\u{2014}'));
    assert!(text.contains("it\u{2019}s"));
    assert!(text.contains("<fresh>"));
    assert!(!text.contains("&amp;"));
    assert!(!text.contains("var x"));
}

#[test]
fn test_page_text_is_cut_to_max_chars() {
    let html = format!("<p>{}</p>", "word ".repeat(500));
    let text = page_text(html.as_bytes(), 40).unwrap();
    assert_eq!(text.chars().count(), 40);
    assert!(!text.contains("  "));
}

#[test]
fn test_fetch_cap_is_five_megabytes() {
    assert_eq!(MAX_PAGE_BYTES, 5 * 1024 * 1024);
}

#[cfg(unix)]
#[test]
fn test_hung_command_is_killed() {
    let start = Instant::now();
    let err = output_with_timeout(
        Command::new("sleep").arg("5"),
        Duration::from_millis(200),
    )
    .unwrap_err();

    assert!(matches!(err, ToolError::TimedOut { ref program, .. } if program == "sleep"));
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[cfg(unix)]
#[test]
fn test_command_output_is_collected() {
    let output = output_with_timeout(
        Command::new("sh").args(["-c", "echo out; echo err 1>&2"]),
        Duration::from_secs(5),
    )
    .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "out");
    assert_eq!(String::from_utf8_lossy(&output.stderr).trim(), "err");
}

#[test]
fn test_url_tools_skip_browser_when_disabled() {
    let dir = TempDir::new().unwrap();
    let tools = runner(&dir);

    let outcome = tools.execute("google_search", &args(json!({ "query": "rust book" })));
    assert!(outcome.success);
    assert_eq!(
        outcome.field("url"),
        Some("https://www.google.com/search?q=rust+book")
    );
}

#[test]
fn test_due_reminders_are_taken_once() {
    let dir = TempDir::new().unwrap();
    let tools = runner(&dir);

    let soon = tools.execute("set_reminder", &args(json!({ "text": "tea", "delay_secs": 60 })));
    let later = tools.execute("set_reminder", &args(json!({ "text": "call mum", "delay_secs": 7200 })));
    assert!(soon.success && later.success);
    assert_eq!(tools.pending_reminders().len(), 2);

    let due = tools.take_due_reminders(Local::now() + ChronoDuration::minutes(5));
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].text, "tea");
    assert_eq!(tools.pending_reminders().len(), 1);

    assert!(tools
        .take_due_reminders(Local::now() + ChronoDuration::minutes(5))
        .is_empty());
}

#[tokio::test]
async fn test_due_reminders_reach_subscribers() {
    let dir = TempDir::new().unwrap();
    let tools = runner(&dir);
    let notifier = Notifier::new();
    let mut rx = notifier.subscribe();

    tools.execute("set_reminder", &args(json!({ "text": "stretch", "delay_secs": 1 })));
    assert_eq!(deliver_due_reminders(&tools, Local::now(), &notifier), 0);

    let delivered =
        deliver_due_reminders(&tools, Local::now() + ChronoDuration::seconds(5), &notifier);
    assert_eq!(delivered, 1);

    match rx.recv().await.unwrap() {
        Notification::Reminder { text, .. } => assert_eq!(text, "stretch"),
    }
    assert!(tools.pending_reminders().is_empty());
}

#[test]
fn test_reminder_without_listener_is_still_taken() {
    let dir = TempDir::new().unwrap();
    let tools = runner(&dir);
    let notifier = Notifier::new();

    tools.execute("set_reminder", &args(json!({ "text": "water plants", "delay_secs": 0 })));
    assert_eq!(deliver_due_reminders(&tools, Local::now(), &notifier), 1);
    assert!(tools.pending_reminders().is_empty());
}
