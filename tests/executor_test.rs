mod common;

use common::*;
use deskmind::executor::*;
use deskmind::*;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_interpolates_previous_url() {
    let tools = Arc::new(FakeTools::new());
    let exec = executor(tools.clone(), SafetyPolicy::default());
    let steps = vec![
        step("youtube_search", json!({ "query": "lofi music" }), "Search"),
        step(
            "send_whatsapp_message",
            json!({ "contact": "muruga", "message": "{{last.url}}" }),
            "Send link",
        ),
    ];

    let mut reply = "Working on it".to_string();
    let records = exec.run(&steps, &mut reply).await;

    assert_eq!(records.len(), 2);
    assert!(all_succeeded(&records));
    let sent = records[1].args["message"].as_str().unwrap();
    assert_eq!(sent, "https://www.youtube.com/results?search_query=lofi+music");
    assert!(!sent.contains("{{"));

    let called = tools.args_of("send_whatsapp_message").unwrap();
    assert_eq!(called["message"], json!(sent));
    assert_eq!(reply, "Working on it");
}

#[tokio::test]
async fn test_unresolved_placeholder_is_left_verbatim() {
    let tools = Arc::new(FakeTools::new());
    let exec = executor(tools, SafetyPolicy::default());
    let steps = vec![
        step("echo", json!({}), "Echo"),
        step("echo", json!({ "text": "{{last.url}} and {{last_result}}" }), "Echo again"),
    ];

    let records = exec.run(&steps, &mut String::new()).await;
    assert_eq!(
        records[1].args["text"],
        json!("{{last.url}} and echo done")
    );
}

#[tokio::test]
async fn test_first_step_placeholders_untouched() {
    let exec = executor(Arc::new(FakeTools::new()), SafetyPolicy::default());
    let record = exec
        .run_step(&step("echo", json!({ "text": "{{last_url}}" }), "Echo"), None)
        .await;
    assert!(record.success);
    assert_eq!(record.args["text"], json!("{{last_url}}"));
}

#[tokio::test]
async fn test_failure_is_not_fatal() {
    let tools = Arc::new(FakeTools::new());
    let exec = executor(tools.clone(), SafetyPolicy::default());
    let steps = vec![
        step("fail_tool", json!({}), "Break"),
        step("echo", json!({}), "Echo"),
    ];

    let mut reply = "All done.".to_string();
    let records = exec.run(&steps, &mut reply).await;

    assert_eq!(records.len(), 2);
    assert!(!records[0].success);
    assert!(records[1].success);
    assert!(!all_succeeded(&records));
    assert_eq!(tools.called(), vec!["fail_tool", "echo"]);
    assert_eq!(reply, "I encountered an issue: the tool broke. All done.");
}

#[tokio::test]
async fn test_destructive_step_is_blocked() {
    let tools = Arc::new(FakeTools::new());
    let exec = executor(tools.clone(), SafetyPolicy::default());

    for args in [json!({}), json!({ "path": "/tmp/x" }), json!({ "force": true })] {
        let record = exec
            .run_step(&step("delete_file", args, "Tidy up"), None)
            .await;
        assert!(!record.success);
        assert!(record.skipped);
        assert_eq!(record.result, BLOCKED_MESSAGE);
    }
    assert!(tools.called().is_empty());
}

#[tokio::test]
async fn test_destructive_description_is_blocked() {
    let tools = Arc::new(FakeTools::new());
    let exec = executor(tools.clone(), SafetyPolicy::default());

    let mut reply = "Okay.".to_string();
    let records = exec
        .run(&[step("echo", json!({}), "Delete old logs")], &mut reply)
        .await;
    assert_eq!(records[0].result, BLOCKED_MESSAGE);
    assert_eq!(
        reply,
        "I didn't run 'echo' because it was blocked by safety setting. Okay."
    );
    assert!(tools.called().is_empty());
}

#[tokio::test]
async fn test_permissive_policy_runs_destructive_steps() {
    let tools = Arc::new(FakeTools::new());
    let exec = executor(tools.clone(), SafetyPolicy::permissive());
    let record = exec
        .run_step(&step("delete_file", json!({ "path": "/tmp/x" }), "Delete"), None)
        .await;
    assert!(record.success);
    assert_eq!(tools.called(), vec!["delete_file"]);
}

#[tokio::test]
async fn test_unknown_tool_is_skipped() {
    let tools = Arc::new(FakeTools::new());
    let exec = executor(tools.clone(), SafetyPolicy::default());
    let record = exec
        .run_step(&step("teleport", json!({}), "Beam me up"), None)
        .await;
    assert!(!record.success);
    assert!(record.skipped);
    assert_eq!(record.result, "Unknown tool: teleport");
    assert!(tools.called().is_empty());
}

#[tokio::test]
async fn test_panicking_tool_becomes_failed_record() {
    let exec = executor(Arc::new(FakeTools::new()), SafetyPolicy::default());
    let steps = vec![
        step("panic_tool", json!({}), "Explode"),
        step("echo", json!({}), "Echo"),
    ];
    let records = exec.run(&steps, &mut String::new()).await;
    assert!(!records[0].success);
    assert!(records[0].result.contains("tool worker failed"));
    assert!(records[1].success);
}

#[test]
fn test_tool_names_match_by_segment() {
    let gate = SafetyGate::new(SafetyPolicy::default());
    for tool in ["force_shutdown", "delete_folder", "remove_dir", "Reboot-Now", "delete_file"] {
        assert!(
            gate.is_destructive(&step(tool, json!({}), "Tidy up")),
            "{} should be destructive",
            tool
        );
    }
    for tool in ["shutdowns", "undeleted_items", "echo", "google_search"] {
        assert!(
            !gate.is_destructive(&step(tool, json!({}), "Tidy up")),
            "{} should be allowed",
            tool
        );
    }
}

#[tokio::test]
async fn test_pattern_named_tool_is_blocked_before_lookup() {
    let exec = executor(Arc::new(FakeTools::new()), SafetyPolicy::default());
    let record = exec
        .run_step(&step("force_shutdown", json!({}), "Turn the machine off"), None)
        .await;
    assert!(!record.success);
    assert_eq!(record.result, BLOCKED_MESSAGE);
}

#[test]
fn test_descriptions_match_whole_words_only() {
    let gate = SafetyGate::new(SafetyPolicy::default());
    assert!(!gate.is_destructive(&step("echo", json!({}), "Get system information")));
    assert!(!gate.is_destructive(&step("echo", json!({}), "Show undeleted drafts")));
    assert!(!gate.is_destructive(&step("echo", json!({}), "Remove the banner")));
    assert!(gate.is_destructive(&step("echo", json!({}), "Delete the cache")));
    assert!(gate.is_destructive(&step("echo", json!({}), "Please SHUT  DOWN now")));
}

#[tokio::test]
async fn test_user_text_in_payload_tools_is_not_blocked() {
    let tools = Arc::new(FakeTools::new());
    let exec = executor(tools.clone(), SafetyPolicy::default());
    let steps = vec![
        step(
            "google_search",
            json!({ "query": "how to delete a partition" }),
            "Search Google for 'how to delete a partition'",
        ),
        step(
            "send_whatsapp_message",
            json!({ "contact": "sam", "message": "shutdown the server tonight" }),
            "Open WhatsApp Web, find sam, send 'shutdown the server tonight'",
        ),
    ];

    let records = exec.run(&steps, &mut String::new()).await;
    assert!(all_succeeded(&records));
    assert_eq!(tools.called(), vec!["google_search", "send_whatsapp_message"]);
}

#[tokio::test]
async fn test_intercepted_plans_pass_the_default_gate() {
    let tools = Arc::new(FakeTools::new());
    let exec = executor(tools.clone(), SafetyPolicy::default());
    let interceptor = Interceptor::new();

    for text in [
        "google how to format a usb drive",
        "cancel shutdown",
        "commit with message delete the old parser",
    ] {
        let plan = interceptor.intercept(text).unwrap();
        let records = exec.run(&plan.steps, &mut String::new()).await;
        assert!(all_succeeded(&records), "{} was blocked: {:?}", text, records);
    }
    assert_eq!(tools.called(), vec!["google_search", "power_action", "git_action"]);

    let plan = interceptor.intercept("shutdown my computer").unwrap();
    let records = exec.run(&plan.steps, &mut String::new()).await;
    assert_eq!(records[0].result, BLOCKED_MESSAGE);
}

#[test]
fn test_safety_gate_verdicts() {
    let gate = SafetyGate::new(SafetyPolicy::default());
    assert!(gate.is_destructive(&step("delete_file", json!({}), "x")));
    assert!(gate.is_destructive(&step("power_action", json!({}), "Shut down the computer")));
    assert!(gate.is_destructive(&step("power_action", json!({}), "Reboot the computer")));
    assert!(!gate.is_destructive(&step("power_action", json!({}), "Lock the computer")));
    assert!(gate.check(&step("open_application", json!({}), "Launch Firefox")).is_ok());
    assert!(gate.check(&step("delete_file", json!({}), "x")).is_err());
}

#[test]
fn test_pool_sizing() {
    assert_eq!(WorkerPool::for_tools(true, 8).size(), 1);
    assert_eq!(WorkerPool::for_tools(false, 8).size(), 8);
    assert_eq!(WorkerPool::new(0).size(), 1);

    let exec = executor(Arc::new(FakeTools::exclusive()), SafetyPolicy::default());
    assert_eq!(exec.pool().size(), 1);
    let exec = executor(Arc::new(FakeTools::new()), SafetyPolicy::default());
    assert_eq!(exec.pool().size(), DEFAULT_POOL_SIZE);
}

#[tokio::test]
async fn test_single_worker_pool_serializes_calls() {
    let exec = Arc::new(executor(
        Arc::new(FakeTools::exclusive()),
        SafetyPolicy::default(),
    ));
    let started = Instant::now();

    let a = {
        let exec = exec.clone();
        tokio::spawn(async move {
            exec.run_step(&step("slow_tool", json!({}), "slow"), None)
                .await
        })
    };
    let b = {
        let exec = exec.clone();
        tokio::spawn(async move {
            exec.run_step(&step("slow_tool", json!({}), "slow"), None)
                .await
        })
    };

    assert!(a.await.unwrap().success);
    assert!(b.await.unwrap().success);
    assert!(started.elapsed() >= Duration::from_millis(200));
    assert_eq!(exec.pool().available(), 1);
}

#[test]
fn test_interpolate_str_aliases() {
    let outcome = ToolOutcome::ok("opened it").with_field("url", "https://a.example");
    assert_eq!(interpolate_str("{{last_url}}", &outcome), "https://a.example");
    assert_eq!(interpolate_str("{{ last.message }}", &outcome), "opened it");
    assert_eq!(interpolate_str("see {{last_result}}", &outcome), "see opened it");
    assert_eq!(interpolate_str("{{last.Bad-Key}}", &outcome), "{{last.Bad-Key}}");
}

#[test]
fn test_interpolate_nested_args() {
    let outcome = ToolOutcome::ok("m").with_field("url", "u");
    let args = Step::new(
        "x",
        json!({ "list": ["{{last.url}}", 3], "nested": { "k": "{{last.url}}" } }),
        "",
    )
    .args;
    assert!(has_placeholders(&args));
    let out = interpolate_args(&args, &outcome);
    assert_eq!(out["list"], json!(["u", 3]));
    assert_eq!(out["nested"]["k"], json!("u"));
    assert!(!has_placeholders(&out));
}
