use anyhow::{bail, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns the edex base directory: `~/.edex`, fallback `/tmp/edex`.
pub fn edex_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".edex"))
        .unwrap_or_else(|| PathBuf::from("/tmp/edex"))
}

/// Directory the client writes its rolling log files into.
pub fn log_dir() -> PathBuf {
    edex_dir().join("logs")
}

// ---------------------------------------------------------------------------
// Terminal config
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct TerminalConfig {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub exec: ExecConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub keyboard: KeyboardConfig,
}

impl TerminalConfig {
    /// Reject limits the output log or the process launcher cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.log.max_bytes == 0 {
            bail!("log.max_bytes must be greater than zero");
        }
        if self.log.trim_target > self.log.max_bytes {
            bail!(
                "log.trim_target ({}) must not exceed log.max_bytes ({})",
                self.log.trim_target,
                self.log.max_bytes
            );
        }
        if self.exec.timeout_ms == 0 {
            bail!("exec.timeout_ms must be greater than zero");
        }
        Ok(())
    }
}

/// Path of the config file: `$EDEX_CONFIG` or `~/.edex/terminal.toml`.
pub fn config_path() -> PathBuf {
    std::env::var("EDEX_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| edex_dir().join("terminal.toml"))
}

pub fn load_config() -> Result<TerminalConfig> {
    let path = config_path();
    let config = if path.exists() {
        let contents = std::fs::read_to_string(&path)?;
        let config: TerminalConfig = toml::from_str(&contents)?;
        tracing::debug!("loaded config from {}", path.display());
        config
    } else {
        TerminalConfig::default()
    };
    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
    #[serde(default = "default_trim_target")]
    pub trim_target: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            trim_target: default_trim_target(),
        }
    }
}

fn default_max_bytes() -> usize {
    50_000
}

fn default_trim_target() -> usize {
    40_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_root_dir")]
    pub root_dir: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            user: default_user(),
            prompt: default_prompt(),
        }
    }
}

fn default_root_dir() -> String {
    "/".to_string()
}

fn default_user() -> String {
    "android-user".to_string()
}

fn default_prompt() -> String {
    "$ ".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyboardConfig {
    #[serde(default = "default_feedback")]
    pub feedback: bool,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            feedback: default_feedback(),
        }
    }
}

fn default_feedback() -> bool {
    true
}
