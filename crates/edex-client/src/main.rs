// crates/edex-client/src/main.rs
mod display;
mod keymap;
mod raw_mode;

use anyhow::{Context, Result};
use edex_common::config::{load_config, log_dir};
use edex_terminal::engine::CommandEngine;
use edex_terminal::input::LineBuffer;
use edex_terminal::keyboard::{KeyFeedback, KeyRouter, SpecialKey, VirtualKey};
use keymap::{ClientKey, KeyDecoder};
use raw_mode::RawModeGuard;
use std::cell::RefCell;
use std::io::Write;
use std::os::fd::AsRawFd;
use std::rc::Rc;
use tokio::io::AsyncReadExt;
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Rings the terminal bell on every key tap.
struct BellFeedback;

impl KeyFeedback for BellFeedback {
    fn key_tap(&self) {
        let mut out = std::io::stdout();
        let _ = out.write_all(b"\x07");
    }
}

/// Log to a daily file; stdout belongs to the raw-mode screen.
fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating log dir {}", dir.display()))?;
    let appender = tracing_appender::rolling::daily(&dir, "edex.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_env("EDEX_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

/// Run the engine on its own task so a slow command never blocks typing.
/// Lines queue on an unbounded channel, so submitting never waits on a
/// running command; each finished command publishes a new snapshot.
fn spawn_engine(
    mut engine: CommandEngine,
) -> (mpsc::UnboundedSender<String>, watch::Receiver<String>) {
    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
    let (snapshot_tx, snapshot_rx) = watch::channel(engine.output());
    tokio::spawn(async move {
        while let Some(line) = line_rx.recv().await {
            let outcome = engine.submit(&line).await;
            tracing::debug!("{:?} -> {:?}", line, outcome);
            if snapshot_tx.send(engine.output()).is_err() {
                break;
            }
        }
        tracing::debug!("engine task finished after {} commands", engine.history().len());
    });
    (line_tx, snapshot_rx)
}

fn get_terminal_size() -> Option<(u16, u16)> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let ret = unsafe { libc::ioctl(1, libc::TIOCGWINSZ, &mut ws) };
    if ret == 0 && ws.ws_row > 0 {
        Some((ws.ws_row, ws.ws_col))
    } else {
        None
    }
}

fn redraw(snapshot: &str, prompt: &str, line: &LineBuffer, router: &KeyRouter) -> Result<()> {
    let (rows, cols) = get_terminal_size().unwrap_or((24, 80));
    let frame = display::render_screen(snapshot, prompt, line, router, rows, cols);
    let mut out = std::io::stdout().lock();
    out.write_all(frame.as_bytes())?;
    out.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("loading terminal config")?;
    let _log_guard = init_logging()?;
    let session_id = Uuid::new_v4().to_string()[..8].to_string();
    tracing::info!("session {} starting", session_id);

    let prompt = config.session.prompt.clone();
    let (line_tx, mut snapshots) = spawn_engine(CommandEngine::with_system(&config));

    let line = Rc::new(RefCell::new(LineBuffer::new()));
    let mut router = KeyRouter::new();
    router.bind_target(&line);
    if config.keyboard.feedback {
        router.set_feedback(Box::new(BellFeedback));
    }
    router.set_visibility_listener(|| tracing::debug!("keyboard hidden"));

    let raw_guard = RawModeGuard::enter_if_tty(std::io::stdin().as_raw_fd())?;
    let mut stdin = tokio::io::stdin();
    let mut decoder = KeyDecoder::new();
    let mut buf = [0u8; 1024];
    let mut snapshot = snapshots.borrow().clone();
    redraw(&snapshot, &prompt, &line.borrow(), &router)?;

    'session: loop {
        tokio::select! {
            read = stdin.read(&mut buf) => {
                let n = read.context("reading stdin")?;
                if n == 0 {
                    break;
                }
                for key in decoder.feed(&buf[..n]) {
                    match key {
                        ClientKey::Quit => break 'session,
                        ClientKey::ToggleKeyboard => {
                            if router.is_visible() {
                                router.press_special(SpecialKey::Hide);
                            } else {
                                router.show();
                            }
                        }
                        // Ctrl+D: hide the keyboard (notifying the listener), then leave.
                        ClientKey::Virtual(VirtualKey::Special(SpecialKey::Hide)) => {
                            router.press_special(SpecialKey::Hide);
                            break 'session;
                        }
                        ClientKey::Virtual(key) => router.press(key),
                    }
                    let submission = line.borrow_mut().take_submission();
                    if let Some(command) = submission {
                        tracing::info!("submit {:?}", command);
                        line_tx.send(command).context("engine task stopped")?;
                    }
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                snapshot = snapshots.borrow_and_update().clone();
            }
        }
        redraw(&snapshot, &prompt, &line.borrow(), &router)?;
    }

    // Restore the terminal before the final newline so it lands cooked.
    drop(raw_guard);
    println!();
    tracing::info!("session {} ended", session_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use edex_common::config::TerminalConfig;
    use edex_terminal::host::StaticHostInfo;
    use edex_terminal::launcher::SystemLauncher;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn engine(timeout: Duration) -> CommandEngine {
        CommandEngine::new(
            &TerminalConfig::default(),
            Box::new(SystemLauncher::new(timeout)),
            Arc::new(StaticHostInfo {
                os_name: "Linux".to_string(),
                os_version: "6.1".to_string(),
                device: "test".to_string(),
                arch: "x86_64".to_string(),
            }),
        )
    }

    #[tokio::test]
    async fn test_submissions_queue_while_command_runs() {
        let (line_tx, mut snapshots) = spawn_engine(engine(Duration::from_millis(800)));
        line_tx.send("sleep 5".to_string()).unwrap();

        // Far more lines than any bounded queue would hold, all accepted at once.
        let started = Instant::now();
        for i in 0..64 {
            line_tx.send(format!("echo queued {}", i)).unwrap();
        }
        assert!(started.elapsed() < Duration::from_millis(200));

        let finished = tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                if snapshots.borrow_and_update().contains("$ echo queued 63\nqueued 63\n") {
                    break;
                }
                snapshots.changed().await.unwrap();
            }
        })
        .await;
        assert!(finished.is_ok(), "queued commands never ran");

        let output = snapshots.borrow().clone();
        assert!(output.contains("timed out"));
        let sleep_at = output.find("$ sleep 5").unwrap();
        let first_echo = output.find("$ echo queued 0").unwrap();
        assert!(sleep_at < first_echo, "commands must run in submission order");
    }
}
