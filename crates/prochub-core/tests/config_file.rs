//! Integration tests for the on-disk configuration format.
//!
//! The sample below mirrors what a user edits by hand, so these tests pin the
//! field names and defaults the config file relies on.

use std::time::Duration;

use prochub_core::{AppConfig, ConfigStore, RestartPolicy, validate_config};

const SAMPLE: &str = r#"{
  "logDir": "logs",
  "maxLogLines": 500,
  "maxLogFiles": 3,
  "processes": [
    {
      "id": "api",
      "name": "API server",
      "command": "node",
      "args": ["server.js", "--port", "3000"],
      "workingDir": "/srv/api",
      "env": { "NODE_ENV": "production" },
      "autoStart": true,
      "restartPolicy": "always",
      "maxRestarts": 10,
      "restartDelayMs": 2000
    },
    {
      "id": "worker",
      "command": "python3",
      "args": ["worker.py"]
    }
  ]
}"#;

#[test]
fn test_sample_config_parses_and_validates() {
    let config: AppConfig = serde_json::from_str(SAMPLE).unwrap();
    validate_config(&config).unwrap();

    assert_eq!(config.max_log_lines, 500);
    assert_eq!(config.max_log_files, 3);
    assert_eq!(config.processes.len(), 2);

    let api = config.find_process("api").unwrap();
    assert_eq!(api.args, vec!["server.js", "--port", "3000"]);
    assert_eq!(api.env.get("NODE_ENV").map(String::as_str), Some("production"));
    assert!(api.auto_start);
    assert_eq!(api.restart_policy, RestartPolicy::Always);
    assert_eq!(api.max_restarts, 10);
    assert_eq!(api.restart_delay, Duration::from_secs(2));

    let worker = config.find_process("worker").unwrap();
    assert_eq!(worker.display_name(), "worker");
    assert_eq!(worker.restart_policy, RestartPolicy::OnFailure);
    assert!(worker.working_dir.is_none());
    assert!(!worker.auto_start);
}

#[test]
fn test_store_preserves_process_order() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("config.json");
    std::fs::write(&path, SAMPLE).unwrap();

    let store = ConfigStore::new(&path);
    let mut config = store.load().unwrap();
    let new_def = config.new_definition("cron", "/usr/bin/env");
    let id = config.add_process(new_def).unwrap();
    assert_eq!(id, "proc-3");
    store.save(&config).unwrap();

    let reloaded = store.load().unwrap();
    let ids: Vec<&str> = reloaded.processes.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["api", "worker", "proc-3"]);
    assert_eq!(
        reloaded.find_process("proc-3").unwrap().restart_policy,
        RestartPolicy::OnFailure
    );
}
