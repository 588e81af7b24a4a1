//! Tests that execute real processes: the staged init binary and the CLI.
//!
//! All serial: executing a freshly written script while another test thread
//! forks can fail with ETXTBSY.

mod helpers;

use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::process::{Command, Output};

use serial_test::serial;

use crossprepare::{CrossPrepareTask, ErrorKind, ProcessRunner, StaticProbe, TaskArguments};
use helpers::{assert_dir_empty, CountingHelp, TestEnv, X86_64_EMULATORS};

fn crossprepare_command(env: &TestEnv, args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_crossprepare"));
    cmd.args(args)
        .current_dir(&env.tmp)
        .env("CROSSPREPARE_HOST_BIN_DIR", &env.host_bin)
        .env("CROSSPREPARE_PRIVILEGED_MARKER", &env.marker)
        .env("CROSSPREPARE_TMPDIR", &env.tmp)
        .env_remove("RUST_LOG");
    cmd
}

fn crossprepare(env: &TestEnv, args: &[&str]) -> Output {
    crossprepare_command(env, args)
        .output()
        .expect("Failed to run crossprepare")
}

fn task_args(env: &TestEnv) -> Vec<String> {
    vec![
        "system".into(),
        "crossprepare".into(),
        "--init".into(),
        env.init.display().to_string(),
        "--target-arch".into(),
        "x86_64".into(),
        "--target-dir".into(),
        env.target_dir.display().to_string(),
    ]
}

// =============================================================================
// ProcessRunner
// =============================================================================

#[test]
#[serial]
fn test_init_runs_once_from_workspace_without_args() {
    let env = TestEnv::new();
    env.write_init_script(0);
    env.install_host_emulators(&X86_64_EMULATORS);
    let config = env.config();
    let help = CountingHelp::default();
    let probe = StaticProbe::default();
    let task = CrossPrepareTask::new(&config, &probe, &ProcessRunner, &help);

    task.execute(&env.args()).unwrap();

    let runs = env.init_runs();
    assert_eq!(runs.len(), 1, "{:?}", runs);
    let (program, argc) = runs[0].rsplit_once(' ').unwrap();
    assert_eq!(argc, "0");
    assert!(program.starts_with(&env.tmp.join("initvm_").display().to_string()));
    assert!(program.ends_with("/init"));

    assert_dir_empty(&env.image_root().join("image"));
    assert!(env.leftover_workspaces().is_empty());
}

#[test]
#[serial]
fn test_init_nonzero_exit_is_fatal() {
    let env = TestEnv::new();
    env.write_init_script(3);
    env.install_host_emulators(&X86_64_EMULATORS);
    let config = env.config();
    let help = CountingHelp::default();
    let probe = StaticProbe::default();
    let task = CrossPrepareTask::new(&config, &probe, &ProcessRunner, &help);

    let err = task
        .execute(&TaskArguments {
            allow_existing_root: true,
            ..env.args()
        })
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CommandFailed);
    assert!(err.to_string().starts_with("Init binary"), "{}", err);
    assert!(err.to_string().contains("exit code 3"));
    // no retry
    assert_eq!(env.init_runs().len(), 1);
    assert!(env.leftover_workspaces().is_empty());
}

// =============================================================================
// CLI
// =============================================================================

#[test]
#[serial]
fn test_cli_help_exits_zero_without_changes() {
    let env = TestEnv::new();
    let output = crossprepare(&env, &["system", "crossprepare", "--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--target-arch"), "{}", stdout);
    assert!(stdout.contains("--allow-existing-root"), "{}", stdout);
    assert!(!env.target_dir.exists());
}

#[test]
#[serial]
fn test_cli_requires_arguments() {
    let env = TestEnv::new();
    let output = crossprepare(&env, &["system", "crossprepare", "--target-arch", "x86_64"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--init"));
}

#[test]
#[serial]
fn test_cli_exit_codes() {
    let env = TestEnv::new();
    let args = task_args(&env);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    // init binary missing
    let output = crossprepare(&env, &args);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Init binary not found"));

    // privileged container
    std::fs::write(&env.marker, "").unwrap();
    let output = crossprepare(&env, &args);
    assert_eq!(output.status.code(), Some(5));
    std::fs::remove_file(&env.marker).unwrap();

    // existing root
    env.write_init_script(0);
    env.install_host_emulators(&X86_64_EMULATORS);
    std::fs::create_dir_all(env.image_root()).unwrap();
    let output = crossprepare(&env, &args);
    assert_eq!(output.status.code(), Some(4));
    assert!(env.init_runs().is_empty());
}

#[test]
#[serial]
fn test_cli_end_to_end() {
    let env = TestEnv::new();
    env.write_init_script(0);
    env.install_host_emulators(&X86_64_EMULATORS);
    let mut args = task_args(&env);
    args.push("--allow-existing-root".into());
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    for _ in 0..2 {
        let output = crossprepare(&env, &args);
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let bin_dir = env.image_root().join("usr/bin");
    for name in X86_64_EMULATORS {
        assert!(bin_dir.join(name).is_file(), "{} not installed", name);
    }
    assert_dir_empty(&env.image_root().join("image"));
    assert_eq!(env.init_runs().len(), 2);
    assert!(env.leftover_workspaces().is_empty());
}

#[test]
#[serial]
fn test_cli_preflight_strict() {
    let env = TestEnv::new();
    let output = crossprepare(&env, &["preflight", "--target-arch", "x86_64", "--strict"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("FAIL"));

    let output = crossprepare(&env, &["preflight", "--target-arch", "x86_64"]);
    assert!(output.status.success());
}

#[test]
#[serial]
fn test_cli_tolerates_non_utf8_environment() {
    let env = TestEnv::new();
    let args = task_args(&env);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let output = crossprepare_command(&env, &args)
        .env("SOME_UNRELATED_VAR", OsStr::from_bytes(b"\xff\xfe"))
        .output()
        .expect("Failed to run crossprepare");

    // typed MissingFile for the absent init binary, not a panic
    assert_eq!(
        output.status.code(),
        Some(3),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}
