use async_trait::async_trait;
use edex_common::config::TerminalConfig;
use edex_terminal::engine::{CommandEngine, Outcome, BANNER};
use edex_terminal::host::StaticHostInfo;
use edex_terminal::launcher::{ExecOutcome, ProcessLauncher, SystemLauncher};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records every line it is asked to run and answers with a fixed outcome.
struct ScriptedLauncher {
    outcome: ExecOutcome,
    calls: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ProcessLauncher for ScriptedLauncher {
    async fn run(&self, command_line: &str) -> ExecOutcome {
        self.calls.lock().unwrap().push(command_line.to_string());
        self.outcome.clone()
    }
}

fn host() -> Arc<StaticHostInfo> {
    Arc::new(StaticHostInfo {
        os_name: "Android".to_string(),
        os_version: "14".to_string(),
        device: "generic".to_string(),
        arch: "aarch64".to_string(),
    })
}

fn scripted(outcome: ExecOutcome) -> (CommandEngine, Arc<Mutex<Vec<String>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let launcher = ScriptedLauncher {
        outcome,
        calls: calls.clone(),
    };
    let engine = CommandEngine::new(&TerminalConfig::default(), Box::new(launcher), host());
    (engine, calls)
}

fn engine() -> CommandEngine {
    scripted(ExecOutcome::LaunchFailed {
        reason: "unused".to_string(),
    })
    .0
}

#[tokio::test]
async fn test_fresh_session_shows_banner() {
    let engine = engine();
    assert_eq!(engine.output(), BANNER);
    assert!(engine.history().is_empty());
    assert_eq!(engine.working_directory(), "/");
}

#[tokio::test]
async fn test_blank_lines_are_noops() {
    let mut engine = engine();
    for line in ["", "   ", "\t\n"] {
        assert_eq!(engine.submit(line).await, Outcome::Ignored);
    }
    assert!(engine.history().is_empty());
    assert_eq!(engine.output(), BANNER);
}

#[tokio::test]
async fn test_each_line_is_recorded_and_echoed() {
    let mut engine = engine();
    for line in ["pwd", "  whoami  ", "echo hi", "uname"] {
        let before = engine.history().len();
        let log_before = engine.output();
        engine.submit(line).await;
        assert_eq!(engine.history().len(), before + 1);
        let suffix = &engine.output()[log_before.len()..];
        assert!(suffix.starts_with(&format!("$ {}\n", line.trim())), "suffix: {:?}", suffix);
    }
    assert_eq!(engine.history(), ["pwd", "whoami", "echo hi", "uname"]);
}

#[tokio::test]
async fn test_echo_result_and_log_layout() {
    let mut engine = engine();
    let outcome = engine.submit("echo hello world").await;
    assert_eq!(outcome, Outcome::Completed("hello world".to_string()));
    assert!(engine.output().ends_with("$ echo hello world\nhello world\n\n"));
}

#[tokio::test]
async fn test_clear_wipes_log_without_echo() {
    let mut engine = engine();
    engine.submit("echo before").await;
    let outcome = engine.submit("clear").await;
    assert_eq!(outcome, Outcome::Cleared("Terminal cleared".to_string()));
    assert_eq!(engine.output(), "");
    assert_eq!(engine.history().last().map(String::as_str), Some("clear"));
}

#[tokio::test]
async fn test_pwd_and_cd() {
    let mut engine = engine();
    assert_eq!(engine.submit("pwd").await.text(), "/");
    assert_eq!(engine.submit("cd ~").await.text(), "Changed to /");
    assert_eq!(engine.submit("pwd").await.text(), "/");

    let text = engine.submit("cd /tmp").await.text().to_string();
    assert!(text.contains("unsupported"), "got {}", text);
    assert_eq!(engine.submit("pwd").await.text(), "/");
    assert_eq!(engine.working_directory(), "/");
}

#[tokio::test]
async fn test_uname_uses_host_info() {
    let mut engine = engine();
    assert_eq!(engine.submit("uname -a").await.text(), "Android 14 generic aarch64");
}

#[tokio::test]
async fn test_builtins_do_not_reach_launcher() {
    let (mut engine, calls) = scripted(ExecOutcome::LaunchFailed {
        reason: "unused".to_string(),
    });
    for line in ["help", "date", "whoami", "pwd", "uname", "ls", "ls -la", "echo x", "cd ~"] {
        engine.submit(line).await;
    }
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_line_goes_to_launcher_trimmed() {
    let (mut engine, calls) = scripted(ExecOutcome::Completed {
        stdout: "up 3 days\n".to_string(),
        stderr: String::new(),
        exit_code: 0,
    });
    let outcome = engine.submit("  uptime  ").await;
    assert_eq!(outcome.text(), "up 3 days\n");
    assert_eq!(*calls.lock().unwrap(), vec!["uptime".to_string()]);
}

#[tokio::test]
async fn test_process_error_is_plain_output() {
    let (mut engine, _) = scripted(ExecOutcome::Completed {
        stdout: String::new(),
        stderr: "permission denied\n".to_string(),
        exit_code: 1,
    });
    let outcome = engine.submit("getprop secret").await;
    assert_eq!(outcome, Outcome::Completed("Error: permission denied\n".to_string()));
    assert!(engine.output().contains("$ getprop secret\nError: permission denied\n"));
}

#[tokio::test]
async fn test_launch_failure_never_raises() {
    let mut engine = CommandEngine::new(
        &TerminalConfig::default(),
        Box::new(SystemLauncher::new(Duration::from_secs(5))),
        host(),
    );
    let outcome = engine.submit("edex-definitely-missing-binary --version").await;
    assert!(outcome.text().contains("Command not found or not supported"));
    assert!(engine.output().contains("Use 'help' to see available commands"));
}

#[tokio::test]
async fn test_real_process_output() {
    let mut engine = CommandEngine::new(
        &TerminalConfig::default(),
        Box::new(SystemLauncher::new(Duration::from_secs(5))),
        host(),
    );
    assert_eq!(engine.submit("printf edex").await.text(), "edex");
    assert_eq!(engine.submit("true").await.text(), "Command executed (exit code: 0)");
}

#[tokio::test]
async fn test_hung_process_reports_timeout() {
    let mut engine = CommandEngine::new(
        &TerminalConfig::default(),
        Box::new(SystemLauncher::new(Duration::from_millis(300))),
        host(),
    );
    let outcome = engine.submit("sleep 10").await;
    assert!(outcome.text().contains("timed out"), "got {:?}", outcome);
    // The terminal stays usable afterwards.
    assert_eq!(engine.submit("echo still here").await.text(), "still here");
}

#[tokio::test]
async fn test_log_stays_bounded() {
    let config: TerminalConfig = toml::from_str("[log]\nmax_bytes = 600\ntrim_target = 400\n").unwrap();
    let mut engine = CommandEngine::new(
        &config,
        Box::new(SystemLauncher::new(Duration::from_secs(1))),
        host(),
    );
    for i in 0..50 {
        engine.submit(&format!("echo line {}", i)).await;
        assert!(engine.log().len() <= 600);
    }
    assert!(engine.output().ends_with("$ echo line 49\nline 49\n\n"));
    assert_eq!(engine.history().len(), 50);
}

#[tokio::test]
async fn test_clear_output_leaves_notice() {
    let mut engine = engine();
    engine.submit("echo x").await;
    engine.clear_output();
    assert_eq!(engine.output(), "Terminal cleared\n\n");
    assert_eq!(engine.history().len(), 1);
}
