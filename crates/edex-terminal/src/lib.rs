pub mod builtins;
pub mod engine;
pub mod host;
pub mod input;
pub mod keyboard;
pub mod launcher;
pub mod output_log;
