//! Configuration file parsing for the screen mirror engine
//!
//! Supports:
//! - `.scrmirror/config.toml` - Reconnect policy, session and engine limits

pub mod settings;
pub mod types;

pub use settings::{config_path, load_settings, parse_settings};
pub use types::*;
