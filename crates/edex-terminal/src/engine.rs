use crate::builtins::{self, Reply, Session};
use crate::host::{HostInfo, SystemHostInfo};
use crate::launcher::{ExecOutcome, ProcessLauncher, SystemLauncher};
use crate::output_log::OutputLog;
use edex_common::config::TerminalConfig;
use std::sync::Arc;

pub const BANNER: &str = "\
╔════════════════════════════════════════╗
║   EDEX-UI ANDROID TERMINAL v1.0       ║
║   Futuristic Terminal Interface        ║
╚════════════════════════════════════════╝

$ Welcome to Edex UI Terminal
$ Type 'help' for available commands

";

pub const CLEARED: &str = "Terminal cleared";

pub const NOT_FOUND: &str =
    "Error: Command not found or not supported\nUse 'help' to see available commands";

/// Result of one `submit`.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The line was blank; nothing was recorded.
    Ignored,
    /// `clear` wiped the log. The notice is not written to the log.
    Cleared(String),
    /// The line ran; this text was appended after its echo (may be empty).
    Completed(String),
}

impl Outcome {
    pub fn text(&self) -> &str {
        match self {
            Outcome::Ignored => "",
            Outcome::Cleared(text) | Outcome::Completed(text) => text.as_str(),
        }
    }
}

/// One terminal session: built-ins, external commands, and the scrollback
/// they write to.
pub struct CommandEngine {
    history: Vec<String>,
    session: Session,
    prompt: String,
    log: OutputLog,
    launcher: Box<dyn ProcessLauncher>,
}

impl CommandEngine {
    pub fn new(
        config: &TerminalConfig,
        launcher: Box<dyn ProcessLauncher>,
        host: Arc<dyn HostInfo>,
    ) -> Self {
        let mut log = OutputLog::from_config(&config.log);
        log.append(BANNER);
        Self {
            history: Vec::new(),
            session: Session {
                working_directory: config.session.root_dir.clone(),
                root_dir: config.session.root_dir.clone(),
                user: config.session.user.clone(),
                host,
            },
            prompt: config.session.prompt.clone(),
            log,
            launcher,
        }
    }

    /// Engine backed by real host processes and `uname` host info.
    pub fn with_system(config: &TerminalConfig) -> Self {
        Self::new(
            config,
            Box::new(SystemLauncher::from_config(&config.exec)),
            Arc::new(SystemHostInfo::collect()),
        )
    }

    /// Run one line of input. Never fails: errors come back as output text.
    pub async fn submit(&mut self, line: &str) -> Outcome {
        let line = line.trim();
        if line.is_empty() {
            return Outcome::Ignored;
        }
        self.history.push(line.to_string());

        let text = match builtins::lookup(line) {
            Some((builtin, arg)) => {
                tracing::debug!("built-in {} for {:?}", builtin.name, line);
                match (builtin.handler)(arg, &mut self.session) {
                    Reply::Text(text) => text,
                    Reply::ClearLog => {
                        self.log.clear();
                        return Outcome::Cleared(CLEARED.to_string());
                    }
                }
            }
            None => {
                tracing::debug!("external command {:?}", line);
                let outcome = self.launcher.run(line).await;
                render_exec_outcome(&outcome)
            }
        };

        self.log.append(&format!("{}{}\n", self.prompt, line));
        if !text.is_empty() {
            self.log.append(&text);
            self.log.append("\n");
        }
        self.log.append("\n");
        Outcome::Completed(text)
    }

    /// Submitted lines, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn working_directory(&self) -> &str {
        &self.session.working_directory
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Snapshot of the scrollback for the rendering surface.
    pub fn output(&self) -> String {
        self.log.snapshot().to_string()
    }

    pub fn log(&self) -> &OutputLog {
        &self.log
    }

    /// Clear the scrollback, leaving a "cleared" notice. History is kept.
    pub fn clear_output(&mut self) {
        self.log.reset_with_notice();
    }
}

/// Turn an external command's outcome into the text shown for it.
///
/// A clean exit with stdout shows stdout. Otherwise stderr is shown with an
/// `Error:` prefix, and with neither only the exit code is reported.
pub fn render_exec_outcome(outcome: &ExecOutcome) -> String {
    match outcome {
        ExecOutcome::Completed {
            stdout,
            stderr,
            exit_code,
        } => {
            if *exit_code == 0 && !stdout.is_empty() {
                stdout.clone()
            } else if !stderr.is_empty() {
                format!("Error: {}", stderr)
            } else {
                format!("Command executed (exit code: {})", exit_code)
            }
        }
        ExecOutcome::TimedOut { after } => {
            format!("Error: Command timed out after {}s", after.as_secs_f64())
        }
        ExecOutcome::LaunchFailed { .. } => NOT_FOUND.to_string(),
        ExecOutcome::ReadFailed { reason } => {
            format!("Error: failed reading command output: {}", reason)
        }
    }
}
