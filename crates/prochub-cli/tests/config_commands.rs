//! Config-editing commands against a temporary data directory.

use std::path::Path;

use prochub_cli::handlers::{add, logs, remove, update};
use prochub_cli::{AddArgs, CliConfig, CliContext, UpdateArgs, bootstrap};
use prochub_core::{LogSinkPort, LogStream, RestartPolicy};
use tempfile::TempDir;

fn context(root: &Path) -> CliContext {
    bootstrap(CliConfig {
        data_root: root.to_path_buf(),
        config_path: root.join("config.json"),
    })
    .unwrap()
}

fn add_args(name: &str, command: &str) -> AddArgs {
    AddArgs {
        name: name.to_string(),
        command: command.to_string(),
        args: Vec::new(),
        id: None,
        restart_policy: None,
        max_restarts: None,
        restart_delay_ms: 0,
        cwd: None,
        env: Vec::new(),
        auto_start: false,
    }
}

#[test]
fn add_then_remove_round_trips_through_the_file() {
    let tmp = TempDir::new().unwrap();

    let mut web = add_args("Web", "node");
    web.args = vec!["server.js".into()];
    web.restart_policy = Some(RestartPolicy::Always);
    web.env = vec![("PORT".into(), "8080".into())];
    web.auto_start = true;
    add::execute(&context(tmp.path()), web).unwrap();
    add::execute(&context(tmp.path()), add_args("Worker", "python3")).unwrap();

    let ctx = context(tmp.path());
    let ids: Vec<&str> = ctx.config.processes.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["proc-1", "proc-2"]);

    let web = ctx.config.find_process("proc-1").unwrap();
    assert_eq!(web.name, "Web");
    assert_eq!(web.args, ["server.js"]);
    assert_eq!(web.restart_policy, RestartPolicy::Always);
    assert_eq!(web.env.get("PORT").map(String::as_str), Some("8080"));
    assert!(web.auto_start);

    // Defaults from the config apply when no flag is given
    let worker = ctx.config.find_process("proc-2").unwrap();
    assert_eq!(worker.restart_policy, RestartPolicy::OnFailure);
    assert_eq!(worker.max_restarts, ctx.config.max_restart);

    remove::execute(&ctx, "proc-1").unwrap();
    let ctx = context(tmp.path());
    assert!(ctx.config.find_process("proc-1").is_none());
    assert_eq!(ctx.config.processes.len(), 1);
}

#[test]
fn update_rewrites_definition_and_keeps_position() {
    let tmp = TempDir::new().unwrap();
    let mut api = add_args("Api", "node");
    api.args = vec!["api.js".into()];
    add::execute(&context(tmp.path()), api).unwrap();
    add::execute(&context(tmp.path()), add_args("Worker", "python3")).unwrap();

    let change = UpdateArgs {
        id: "proc-1".into(),
        name: None,
        command: Some("bun".into()),
        args: Vec::new(),
        clear_args: false,
        restart_policy: Some(RestartPolicy::Never),
        max_restarts: None,
        restart_delay_ms: Some(1500),
        cwd: None,
        clear_cwd: false,
        env: vec![("MODE".into(), "prod".into())],
        unset_env: Vec::new(),
        auto_start: Some(true),
    };
    update::execute(&context(tmp.path()), change).unwrap();

    let ctx = context(tmp.path());
    let ids: Vec<&str> = ctx.config.processes.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["proc-1", "proc-2"]);

    let api = ctx.config.find_process("proc-1").unwrap();
    assert_eq!(api.name, "Api");
    assert_eq!(api.command, "bun");
    assert_eq!(api.args, ["api.js"]);
    assert_eq!(api.restart_policy, RestartPolicy::Never);
    assert_eq!(api.restart_delay.as_millis(), 1500);
    assert_eq!(api.env.get("MODE").map(String::as_str), Some("prod"));
    assert!(api.auto_start);
}

#[test]
fn update_unknown_id_fails_without_writing() {
    let tmp = TempDir::new().unwrap();
    let change = UpdateArgs {
        id: "ghost".into(),
        name: Some("Ghost".into()),
        command: None,
        args: Vec::new(),
        clear_args: false,
        restart_policy: None,
        max_restarts: None,
        restart_delay_ms: None,
        cwd: None,
        clear_cwd: false,
        env: Vec::new(),
        unset_env: Vec::new(),
        auto_start: None,
    };
    assert!(update::execute(&context(tmp.path()), change).is_err());
    assert!(!tmp.path().join("config.json").exists());
}

#[test]
fn duplicate_id_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let mut first = add_args("A", "true");
    first.id = Some("svc".into());
    add::execute(&context(tmp.path()), first).unwrap();

    let mut second = add_args("B", "true");
    second.id = Some("svc".into());
    assert!(add::execute(&context(tmp.path()), second).is_err());
    assert_eq!(context(tmp.path()).config.processes.len(), 1);
}

#[test]
fn logs_export_reads_router_history() {
    let tmp = TempDir::new().unwrap();
    let ctx = context(tmp.path());

    let router = ctx.log_router();
    router.append("svc", LogStream::Stdout, "first".into());
    router.append("svc", LogStream::Stderr, "second".into());

    let dest = tmp.path().join("svc.log");
    logs::execute(&ctx, "svc", None, Some(&dest)).unwrap();

    let exported = std::fs::read_to_string(&dest).unwrap();
    let lines: Vec<&str> = exported.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("[stdout] first"));
    assert!(lines[1].ends_with("[stderr] second"));
    assert!(tmp.path().join("logs").join("svc").join("output-000001.log").exists());
}

#[test]
fn logs_rejects_ids_that_escape_the_log_root() {
    let tmp = TempDir::new().unwrap();
    let ctx = context(tmp.path());
    std::fs::create_dir_all(tmp.path().join("secret")).unwrap();
    std::fs::write(tmp.path().join("secret").join("output-000001.log"), "hidden\n").unwrap();

    let dest = tmp.path().join("out.log");
    for id in ["../secret", "..", "a/b"] {
        assert!(logs::execute(&ctx, id, None, Some(&dest)).is_err(), "{id}");
    }
    assert!(!dest.exists());
}
