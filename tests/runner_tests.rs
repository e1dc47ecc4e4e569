//! Tests for the process runner
#![cfg(unix)]

mod common;

use common::{TestApp, shell_tools};
use kodegen_bundler_electron::bundler::{
    Bundler, CommandStep, Error, FailurePolicy, LogOutput, PlatformSelection, ProcessRunner,
    StepKind, StepOutput, StepRunner, TargetState, resolve_targets,
};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

fn step(dir: &Path, executable: &str, arguments: &[&str]) -> CommandStep {
    CommandStep {
        description: format!("Running {}", executable),
        kind: StepKind::Package,
        executable: executable.to_string(),
        arguments: arguments.iter().map(|a| a.to_string()).collect(),
        working_directory: dir.to_path_buf(),
    }
}

fn runner(cancel: &CancellationToken) -> ProcessRunner {
    ProcessRunner::new(Arc::new(LogOutput), cancel.clone())
}

#[derive(Default)]
struct CapturedOutput {
    stdout: Mutex<Vec<String>>,
    stderr: Mutex<Vec<String>>,
}

impl StepOutput for CapturedOutput {
    fn stdout_line(&self, line: &str) {
        self.stdout.lock().unwrap().push(line.to_string());
    }

    fn stderr_line(&self, line: &str) {
        self.stderr.lock().unwrap().push(line.to_string());
    }
}

#[tokio::test]
async fn test_successful_step() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = runner(&CancellationToken::new())
        .run(&step(dir.path(), "true", &[]))
        .await
        .unwrap();

    assert_eq!(outcome.code, 0);
}

#[tokio::test]
async fn test_output_is_forwarded_line_by_line() {
    let dir = tempfile::tempdir().unwrap();
    let output = Arc::new(CapturedOutput::default());
    let runner = ProcessRunner::new(output.clone(), CancellationToken::new());

    runner
        .run(&step(
            dir.path(),
            "sh",
            &["-c", "echo one; echo two; echo three >&2"],
        ))
        .await
        .unwrap();

    assert_eq!(*output.stdout.lock().unwrap(), vec!["one", "two"]);
    assert_eq!(*output.stderr.lock().unwrap(), vec!["three"]);
}

#[tokio::test]
async fn test_step_runs_in_its_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    let before = std::env::current_dir().unwrap();

    runner(&CancellationToken::new())
        .run(&step(dir.path(), "sh", &["-c", "touch marker"]))
        .await
        .unwrap();

    assert!(dir.path().join("marker").exists());
    assert_eq!(std::env::current_dir().unwrap(), before);
}

#[tokio::test]
async fn test_nonzero_exit_is_step_failure() {
    let dir = tempfile::tempdir().unwrap();
    let err = runner(&CancellationToken::new())
        .run(&step(
            dir.path(),
            "sh",
            &["-c", "echo 'icon is broken' >&2; exit 3"],
        ))
        .await
        .unwrap_err();

    match &err {
        Error::StepFailed {
            code, stderr_tail, ..
        } => {
            assert_eq!(*code, Some(3));
            assert_eq!(stderr_tail, &vec!["icon is broken".to_string()]);
        }
        other => panic!("expected StepFailed, got {:?}", other),
    }
    let message = err.to_string();
    assert!(message.contains("exit code 3"));
    assert!(message.contains("icon is broken"));
}

#[tokio::test]
async fn test_stderr_tail_is_bounded() {
    let dir = tempfile::tempdir().unwrap();
    let err = runner(&CancellationToken::new())
        .run(&step(
            dir.path(),
            "sh",
            &["-c", "for i in $(seq 1 50); do echo line$i >&2; done; exit 1"],
        ))
        .await
        .unwrap_err();

    let Error::StepFailed { stderr_tail, .. } = err else {
        panic!("expected StepFailed");
    };
    assert_eq!(stderr_tail.len(), 20);
    assert_eq!(stderr_tail.first().unwrap(), "line31");
    assert_eq!(stderr_tail.last().unwrap(), "line50");
}

#[tokio::test]
async fn test_missing_executable() {
    let dir = tempfile::tempdir().unwrap();
    let err = runner(&CancellationToken::new())
        .run(&step(dir.path(), "definitely-not-an-installed-tool", &[]))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ToolNotFound { ref tool, .. } if tool == "definitely-not-an-installed-tool"));
}

#[tokio::test]
async fn test_step_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let started = Instant::now();
    let err = runner(&CancellationToken::new())
        .with_timeout(Some(Duration::from_millis(200)))
        .run(&step(dir.path(), "sleep", &["30"]))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::StepTimedOut { .. }), "got {:?}", err);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_cancel_terminates_running_step() {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("tool.pid");
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let written = pid_file.clone();
    tokio::spawn(async move {
        while !written.exists() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = runner(&cancel)
        .run(&step(
            dir.path(),
            "sh",
            &["-c", "echo $$ > tool.pid; sleep 30"],
        ))
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(10));

    let pid: i32 = std::fs::read_to_string(&pid_file)
        .unwrap()
        .trim()
        .parse()
        .unwrap();
    assert!(
        kill(Pid::from_raw(pid), None).is_err(),
        "process {} is still running after cancel",
        pid
    );
}

#[tokio::test]
async fn test_cancelled_runner_spawns_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = runner(&cancel)
        .run(&step(dir.path(), "sh", &["-c", "touch marker"]))
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(!dir.path().join("marker").exists());
}

#[tokio::test]
async fn test_interrupt_during_build_cancels_all_targets() {
    let app = TestApp::new();
    app.write_script("electron-packager", "sleep 30");
    let bundler = Bundler::new(app.settings_with(FailurePolicy::ContinueOnFailure, shell_tools()));
    let targets = resolve_targets("x64", &PlatformSelection::All, bundler.settings()).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let summary = bundler
        .run(&targets, &runner(&cancel), &(), &cancel)
        .await
        .unwrap();

    assert_eq!(summary.results.len(), 3);
    assert!(
        summary
            .results
            .iter()
            .all(|r| r.state == TargetState::Cancelled)
    );
    assert_eq!(
        summary.results[0].failed_step.as_ref().unwrap().kind,
        StepKind::Package
    );
}
