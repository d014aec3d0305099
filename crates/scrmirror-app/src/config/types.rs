//! Configuration types

use serde::{Deserialize, Serialize};

/// Reconnect attempts allowed before a session is marked failed
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Maximum number of concurrent sessions
pub const DEFAULT_MAX_SESSIONS: usize = 9;

/// Entries kept in the append-only progress history
pub const DEFAULT_PROGRESS_HISTORY: usize = 64;

/// Failures kept in each session monitor
pub const DEFAULT_EXCEPTION_HISTORY: usize = 20;

/// Settings from `.scrmirror/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub reconnect: ReconnectSettings,

    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub engine: EngineSettings,
}

/// Bounded reconnection policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconnectSettings {
    /// Attempts granted per session lifetime (reset only by a cleanup)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_RECONNECT_ATTEMPTS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Capacity of each session's progress history
    #[serde(default = "default_progress_history")]
    pub progress_history: usize,

    /// Capacity of each session's recent failure list
    #[serde(default = "default_exception_history")]
    pub exception_history: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            progress_history: default_progress_history(),
            exception_history: default_exception_history(),
        }
    }
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

fn default_progress_history() -> usize {
    DEFAULT_PROGRESS_HISTORY
}

fn default_exception_history() -> usize {
    DEFAULT_EXCEPTION_HISTORY
}

/// Channel sizing and shutdown behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Bounded mailbox size of each session actor
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,

    /// Capacity of the broadcast channel for engine events
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// How long shutdown waits for each session actor to finish
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            mailbox_capacity: default_mailbox_capacity(),
            event_capacity: default_event_capacity(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
        }
    }
}

fn default_mailbox_capacity() -> usize {
    256
}

fn default_event_capacity() -> usize {
    256
}

fn default_shutdown_timeout_ms() -> u64 {
    2000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.reconnect.max_attempts, 3);
        assert_eq!(settings.session.max_sessions, 9);
        assert_eq!(settings.session.progress_history, 64);
        assert_eq!(settings.session.exception_history, 20);
        assert_eq!(settings.engine.shutdown_timeout_ms, 2000);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let settings: Settings = toml::from_str(
            r#"
[session]
max_sessions = 2
"#,
        )
        .unwrap();

        assert_eq!(settings.session.max_sessions, 2);
        assert_eq!(settings.session.progress_history, DEFAULT_PROGRESS_HISTORY);
        assert_eq!(settings.reconnect, ReconnectSettings::default());
    }
}
