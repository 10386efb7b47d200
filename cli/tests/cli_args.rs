//! Binary-level tests: argument errors and task validation fail before any backend call.

use std::path::PathBuf;
use std::process::Command;

fn run_canopy(args: &[&str]) -> std::process::Output {
    let empty = tempfile::tempdir().unwrap();
    Command::new(env!("CARGO_BIN_EXE_canopy"))
        .args(args)
        .current_dir(empty.path())
        .env("XDG_CONFIG_HOME", empty.path())
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run canopy binary")
}

fn sample_task() -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../canopy/tasks/sample.yaml")
        .display()
        .to_string()
}

#[test]
fn cli_help_succeeds() {
    let out = run_canopy(&["--help"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Canopy"));
    assert!(stdout.contains("--method-select"));
    assert!(stdout.contains("--naive-run"));
}

#[test]
fn cli_unknown_select_method_fails() {
    let task = sample_task();
    let out = run_canopy(&["--task", &task, "--method-select", "beam"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("beam"));
}

#[test]
fn cli_missing_task_file_fails() {
    let out = run_canopy(&["--task", "no-such-task.yaml"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("no-such-task.yaml"));
}

#[test]
fn cli_index_range_outside_task_fails() {
    let task = sample_task();
    let out = run_canopy(&["--task", &task, "--task-end-index", "99"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("0..99"));
}

#[test]
fn cli_zero_select_count_fails() {
    let task = sample_task();
    let out = run_canopy(&["--task", &task, "--n-select-sample", "0"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("n_select_sample"));
}

#[test]
fn cli_missing_template_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("task.yaml");
    std::fs::write(
        &path,
        "name: t\nsteps: 1\ninputs:\n  - input: x\nprompts:\n  standard: \"{input}\"\n",
    )
    .unwrap();
    let path = path.display().to_string();

    let out = run_canopy(&["--task", &path, "--method-evaluate", "vote"]);

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("vote"));
}

#[test]
fn cli_section_from_config_file_is_validated() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("config.toml");
    std::fs::write(&cfg, "[search]\nmethod_select = \"beam\"\n").unwrap();
    let cfg = cfg.display().to_string();
    let task = sample_task();

    let out = run_canopy(&["--task", &task, "--config", &cfg]);

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("beam"));
}

fn run_with_search_section(section: &str) -> std::process::Output {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("config.toml");
    std::fs::write(&cfg, format!("[search]\n{}", section)).unwrap();
    let cfg = cfg.display().to_string();
    let task = sample_task();
    // fails on the index range, after logging is set up and before any backend call
    run_canopy(&["--task", &task, "--config", &cfg, "--task-end-index", "99"])
}

#[test]
fn cli_verbose_from_config_file_enables_info_logs() {
    let out = run_with_search_section("verbose = true\n");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("search config loaded"));
}

#[test]
fn cli_quiet_config_keeps_info_logs_off() {
    let out = run_with_search_section("verbose = false\n");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(!stderr.contains("search config loaded"));
}

#[test]
fn cli_missing_config_file_fails() {
    let task = sample_task();
    let out = run_canopy(&["--task", &task, "--config", "/no/such/dir/config.toml"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("/no/such/dir/config.toml"));
}
