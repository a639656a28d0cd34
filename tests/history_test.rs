use deskmind::*;
use serde_json::json;

fn finished(brain: &str, success: bool) -> TaskUpdate {
    let step = Step::new("echo", json!({ "text": "hi" }), "Echo");
    let outcome = if success {
        ToolOutcome::ok("echoed")
    } else {
        ToolOutcome::failed("nope")
    };
    TaskUpdate {
        brain: brain.to_string(),
        reply: "done".to_string(),
        actions: vec![ActionRecord::executed(&step, step.args.clone(), outcome)],
        success,
        duration_ms: 12,
        ..Default::default()
    }
    .with_plan(&Plan::new("Echo greeting", 0.1, vec![step], "done"))
}

fn exercise_store(store: &dyn TaskStore) {
    let first = store.create("open chrome").unwrap();
    let second = store.create("search lofi").unwrap();
    assert!(second > first);

    let pending = store.get(first).unwrap().unwrap();
    assert_eq!(pending.input, "open chrome");
    assert_eq!(pending.success, None);
    assert_eq!(pending.status_icon(), "?");

    store.update(first, finished("local", true)).unwrap();
    store.update(second, finished("cloud-a", false)).unwrap();

    let done = store.get(first).unwrap().unwrap();
    assert_eq!(done.brain.as_deref(), Some("local"));
    assert_eq!(done.success, Some(true));
    assert_eq!(done.duration_ms, Some(12));
    assert_eq!(done.intent.as_deref(), Some("Echo greeting"));
    assert_eq!(done.plan.len(), 1);
    assert_eq!(done.plan[0].tool, "echo");
    assert_eq!(done.plan[0].args["text"], json!("hi"));
    assert!(done.completed_at.is_some());
    assert!(done.actions[0].raw_result.is_none());
    assert_eq!(done.status_icon(), "✓");

    let recent = store.recent(10).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id, second);
    assert_eq!(recent[1].id, first);
    assert_eq!(store.recent(1).unwrap().len(), 1);

    let stats = store.stats().unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.succeeded, 1);
    assert!((stats.success_rate - 50.0).abs() < 1e-9);
    assert_eq!(stats.by_brain.get("local"), Some(&1));
    assert_eq!(stats.by_brain.get("cloud-a"), Some(&1));

    assert!(store.update(9_999_999, finished("local", true)).is_err());
    assert!(store.get(9_999_999).unwrap().is_none());
}

#[test]
fn test_in_memory_task_store() {
    exercise_store(&InMemoryTaskStore::new());
}

#[test]
fn test_sled_task_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = SledTaskStore::open(dir.path().join("tasks"), 100).unwrap();
    exercise_store(&store);
}

#[test]
fn test_in_memory_history_is_bounded() {
    let store = InMemoryTaskStore::with_capacity(3);
    let ids: Vec<_> = (0..5)
        .map(|i| store.create(&format!("task {}", i)).unwrap())
        .collect();

    let recent = store.recent(10).unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].id, ids[4]);
    assert!(store.get(ids[0]).unwrap().is_none());
}

#[test]
fn test_sled_history_is_bounded() {
    let dir = tempfile::tempdir().unwrap();
    let store = SledTaskStore::open(dir.path().join("tasks"), 2).unwrap();
    for i in 0..4 {
        store.create(&format!("task {}", i)).unwrap();
    }
    let recent = store.recent(10).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].input, "task 3");
    assert_eq!(recent[1].input, "task 2");
}

#[test]
fn test_sled_history_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks");

    let first = {
        let store = SledTaskStore::open(&path, 100).unwrap();
        let id = store.create("remember me").unwrap();
        store.update(id, finished("local", true)).unwrap();
        store.flush().unwrap();
        id
    };

    let store = SledTaskStore::open(&path, 100).unwrap();
    let record = store.get(first).unwrap().unwrap();
    assert_eq!(record.input, "remember me");
    assert_eq!(record.success, Some(true));

    let next = store.create("after reopen").unwrap();
    assert!(next > first);
}

#[test]
fn test_task_update_from_response() {
    let resp = AgentResponse {
        reply: "ok".to_string(),
        brain: "cloud-b".to_string(),
        actions: Vec::new(),
        duration_ms: 5,
        task_id: Some(1),
        success: true,
    };
    let update = TaskUpdate::from(&resp);
    assert_eq!(update.brain, "cloud-b");
    assert_eq!(update.reply, "ok");
    assert!(update.success);
    assert!(update.intent.is_none());
    assert!(update.plan.is_empty());

    let update = update.with_plan(&Plan::conversational("Small talk", "ok"));
    assert_eq!(update.intent.as_deref(), Some("Small talk"));
    assert!(update.plan.is_empty());
}

fn exercise_preferences(prefs: &dyn PreferenceStore) {
    assert!(prefs.get("default_brain").unwrap().is_none());
    assert!(prefs.all().unwrap().is_empty());

    prefs.set("default_brain", "local").unwrap();
    prefs.set("name", "Sam").unwrap();
    prefs.set("default_brain", "cloud-b").unwrap();

    assert_eq!(prefs.get("default_brain").unwrap().as_deref(), Some("cloud-b"));
    let all = prefs.all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all.get("name").map(String::as_str), Some("Sam"));
}

#[test]
fn test_in_memory_preferences() {
    exercise_preferences(&InMemoryPreferences::new());
}

#[test]
fn test_sled_preferences() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = SledPreferences::open(dir.path().join("prefs")).unwrap();
    exercise_preferences(&prefs);
}

#[test]
fn test_sled_stores_share_one_db() {
    let dir = tempfile::tempdir().unwrap();
    let db = sled::open(dir.path().join("store")).unwrap();
    let tasks = SledTaskStore::from_db(db.clone(), 10).unwrap();
    let prefs = SledPreferences::from_db(&db).unwrap();

    tasks.create("hello").unwrap();
    prefs.set("k", "v").unwrap();
    assert_eq!(tasks.recent(5).unwrap().len(), 1);
    assert_eq!(prefs.all().unwrap().len(), 1);
}
