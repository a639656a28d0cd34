use deskmind::*;

#[test]
fn test_default_config() {
    let config = AgentConfig::default();
    assert_eq!(config.listen_addr(), "127.0.0.1:8765");
    assert_eq!(config.default_brain, BrainId::Auto);
    assert!(config.policy.require_confirmation);
    assert_eq!(config.brains.cloud_a.api_key_env, "OPENAI_API_KEY");
    assert_eq!(config.brains.cloud_b.api_key_env, "ANTHROPIC_API_KEY");
    assert!(config.memory.persistent);
}

#[test]
fn test_config_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deskmind.toml");

    let mut config = AgentConfig::default();
    config.bind_port = 9999;
    config.default_brain = BrainId::CloudB;
    config.policy.pool_size = 2;
    config.save(&path).unwrap();

    let loaded = AgentConfig::load(&path).unwrap();
    assert_eq!(loaded.bind_port, 9999);
    assert_eq!(loaded.default_brain, BrainId::CloudB);
    assert_eq!(loaded.policy.pool_size, 2);
}

#[test]
fn test_partial_config_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deskmind.toml");
    std::fs::write(
        &path,
        r#"
default_brain = "local"

[brains.local]
model = "qwen2.5"

[policy]
require_confirmation = false
"#,
    )
    .unwrap();

    let config = AgentConfig::load(&path).unwrap();
    assert_eq!(config.default_brain, BrainId::Local);
    assert_eq!(config.brains.local.model, "qwen2.5");
    assert_eq!(config.brains.local.base_url, "http://localhost:11434");
    assert!(!config.policy.require_confirmation);
    assert!(!config.policy.destructive_tools.is_empty());
    assert_eq!(config.bind_port, 8765);
}

#[test]
fn test_missing_config_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = AgentConfig::load_or_default(&dir.path().join("nope.toml")).unwrap();
    assert_eq!(config.bind_port, 8765);
}

#[test]
fn test_conversions() {
    let config = AgentConfig::default();

    let policy = config.policy.to_safety_policy();
    assert!(policy.require_confirmation);
    assert_eq!(policy.destructive_tools, config.policy.destructive_tools);
    assert_eq!(policy.payload_tools, config.policy.payload_tools);
    assert!(policy.payload_tools.iter().any(|t| t == "google_search"));

    let ollama = config.brains.local.to_ollama_config();
    assert_eq!(ollama.model, config.brains.local.model);
    assert_eq!(ollama.request_timeout.as_secs(), config.brains.local.request_timeout_secs);

    let tools = config.to_tool_config();
    assert_eq!(tools.data_dir, config.data_dir);
    assert_eq!(tools.exclusive_tools, config.policy.exclusive_tools);
}

#[test]
fn test_api_keys_come_from_env() {
    let mut config = AgentConfig::default();
    config.brains.cloud_b.api_key_env = "DESKMIND_TEST_CLOUD_B_KEY".to_string();
    std::env::set_var("DESKMIND_TEST_CLOUD_B_KEY", "sk-test");
    assert_eq!(config.brains.cloud_b.to_anthropic_config().api_key, "sk-test");

    config.brains.cloud_a.api_key_env = "DESKMIND_TEST_UNSET_KEY".to_string();
    std::env::remove_var("DESKMIND_TEST_UNSET_KEY");
    assert!(config.brains.cloud_a.to_llm_config().api_key.is_empty());

    let saved = toml::to_string(&config).unwrap();
    assert!(!saved.contains("sk-test"));
}
