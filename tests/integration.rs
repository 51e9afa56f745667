//! End-to-end runs of the `order-agent` binary against scripted stand-ins
//! for the model and the ranker.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn agent_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_order-agent"))
}

const FAKE_MODEL: &str = r#"#!/bin/sh
printf '%s\n' "$@" > model_args.txt
printf '%s\n' "${MODEL_OUTPUT-pork, spicy}"
exit ${MODEL_EXIT:-0}
"#;

const FAKE_RANKER: &str = r#"touch ranker_ran
echo "RANKED: $1"
exit ${RANKER_EXIT:-0}
"#;

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let model = root.join("fake-model.sh");
    fs::write(&model, FAKE_MODEL).unwrap();
    fs::set_permissions(&model, fs::Permissions::from_mode(0o755)).unwrap();

    fs::write(root.join("ranker.sh"), FAKE_RANKER).unwrap();
    fs::write(root.join("prompt.txt"), "Answer with keywords only. ").unwrap();
    fs::write(
        root.join("catalog.json"),
        r#"[
  {"name": "Pork Dumpling House", "description": "handmade pork dumplings"},
  {"name": "Szechuan Kitchen", "description": "spicy pork dishes"},
  {"name": "Green Leaf", "description": "vegetarian bowls"}
]"#,
    )
    .unwrap();

    let config = format!(
        r#"[translator]
executable_path = '{root}/fake-model.sh'
model_path = '{root}/model.gguf'
prompt_file_path = '{root}/prompt.txt'

[preferences]
file_path = '{root}/preferences.txt'

[ranker]
interpreter_path = '/bin/sh'
script_path = '{root}/ranker.sh'

[catalog]
path = '{root}/catalog.json'
"#,
        root = root.display()
    );
    let config_path = root.join("order-agent.toml");
    fs::write(&config_path, config).unwrap();

    (tmp, config_path)
}

struct RunResult {
    stdout: String,
    stderr: String,
    code: Option<i32>,
}

fn run_agent(dir: &Path, config_path: &Path, env: &[(&str, &str)], args: &[&str]) -> RunResult {
    let binary = agent_binary();
    let output = Command::new(&binary)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .envs(env.iter().copied())
        .arg("--config")
        .arg(config_path)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run order-agent binary at {:?}: {}", binary, e));

    RunResult {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        code: output.status.code(),
    }
}

#[test]
fn test_successful_run() {
    let (tmp, config) = setup_test_env();
    let r = run_agent(tmp.path(), &config, &[], &["something porky"]);

    assert_eq!(r.code, Some(0), "stderr: {}", r.stderr);
    assert!(r.stdout.contains("Received command: something porky"));
    assert!(r.stdout.contains("Query: pork, spicy"));
    assert!(r.stdout.contains("Matched 2 of 3 catalog entries."));
    assert!(r
        .stdout
        .contains("RANKED: Pork Dumpling House,Szechuan Kitchen"));
    assert!(r.stdout.contains("Goodbye!"));
}

#[test]
fn test_prompt_reaches_model_as_one_argument() {
    let (tmp, config) = setup_test_env();
    fs::write(tmp.path().join("preferences.txt"), "no seafood").unwrap();
    let r = run_agent(tmp.path(), &config, &[], &["dinner for two"]);
    assert_eq!(r.code, Some(0), "stderr: {}", r.stderr);

    let args = fs::read_to_string(tmp.path().join("model_args.txt")).unwrap();
    let lines: Vec<&str> = args.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("model.gguf"));
    assert_eq!(
        lines[1],
        "Answer with keywords only. User command: dinner for two User preferences: no seafood"
    );
}

#[test]
fn test_command_text_is_not_shell_interpreted() {
    let (tmp, config) = setup_test_env();
    let r = run_agent(tmp.path(), &config, &[], &["$(touch injected) \"quoted\""]);
    assert_eq!(r.code, Some(0), "stderr: {}", r.stderr);
    assert!(!tmp.path().join("injected").exists());

    let args = fs::read_to_string(tmp.path().join("model_args.txt")).unwrap();
    assert!(args.contains("User command: $(touch injected) \"quoted\""));
}

#[test]
fn test_model_nonzero_exit_with_text_still_succeeds() {
    let (tmp, config) = setup_test_env();
    let r = run_agent(
        tmp.path(),
        &config,
        &[("MODEL_EXIT", "3"), ("MODEL_OUTPUT", "vegetarian")],
        &["veggie"],
    );
    assert_eq!(r.code, Some(0), "stderr: {}", r.stderr);
    assert!(r.stdout.contains("RANKED: Green Leaf"));
}

#[test]
fn test_empty_model_output_fails() {
    let (tmp, config) = setup_test_env();
    let r = run_agent(tmp.path(), &config, &[("MODEL_OUTPUT", "")], &["anything"]);
    assert_eq!(r.code, Some(1));
    assert!(r.stderr.contains("error [translate]"), "stderr: {}", r.stderr);
    assert!(r.stderr.contains("did not return a usable query"));
    assert!(!tmp.path().join("ranker_ran").exists());
}

#[test]
fn test_ranker_failure_is_reported() {
    let (tmp, config) = setup_test_env();
    let r = run_agent(tmp.path(), &config, &[("RANKER_EXIT", "2")], &["pork"]);
    assert_eq!(r.code, Some(1));
    assert!(r.stderr.contains("error [ranker]"), "stderr: {}", r.stderr);
    assert!(r.stderr.contains("exit status 2"));
    assert!(!r.stdout.contains("Goodbye!"));
}

#[test]
fn test_missing_preferences_only_warns() {
    let (tmp, config) = setup_test_env();
    let r = run_agent(tmp.path(), &config, &[], &["pork"]);
    assert_eq!(r.code, Some(0));
    assert!(r.stderr.contains("could not read preference file"));
}

#[test]
fn test_missing_prompt_file_fails() {
    let (tmp, config) = setup_test_env();
    fs::remove_file(tmp.path().join("prompt.txt")).unwrap();
    let r = run_agent(tmp.path(), &config, &[], &["pork"]);
    assert_eq!(r.code, Some(1));
    assert!(r.stderr.contains("error [translate]"));
    assert!(r.stderr.contains("prompt.txt"));
}

#[test]
fn test_missing_model_executable_fails() {
    let (tmp, config) = setup_test_env();
    fs::remove_file(tmp.path().join("fake-model.sh")).unwrap();
    let r = run_agent(tmp.path(), &config, &[], &["pork"]);
    assert_eq!(r.code, Some(1));
    assert!(r.stderr.contains("error [translate]"));
}

#[test]
fn test_dry_run_prints_payload_without_ranker() {
    let (tmp, config) = setup_test_env();
    let r = run_agent(tmp.path(), &config, &[], &["--dry-run", "pork"]);
    assert_eq!(r.code, Some(0), "stderr: {}", r.stderr);
    assert!(r.stdout.contains("Pork Dumpling House,Szechuan Kitchen"));
    assert!(!r.stdout.contains("RANKED"));
    assert!(!tmp.path().join("ranker_ran").exists());
}

#[test]
fn test_missing_command_argument_is_usage_error() {
    let (tmp, config) = setup_test_env();
    let r = run_agent(tmp.path(), &config, &[], &[]);
    assert_eq!(r.code, Some(1));
    assert!(r.stderr.contains("Usage"));
    assert!(!tmp.path().join("model_args.txt").exists());
}

#[test]
fn test_missing_explicit_config_fails() {
    let (tmp, _config) = setup_test_env();
    let missing = tmp.path().join("nope.toml");
    let r = run_agent(tmp.path(), &missing, &[], &["pork"]);
    assert_eq!(r.code, Some(1));
    assert!(r.stderr.contains("Failed to read config file"));
}
