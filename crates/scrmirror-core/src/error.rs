//! Application error types with rich context
//!
//! Connection failures are not errors in this sense: they are session state
//! values. This enum covers the plumbing around the sessions.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // ─────────────────────────────────────────────────────────────
    // Channel/Communication Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Channel send error: {message}")]
    ChannelSend { message: String },

    #[error("Channel closed unexpectedly")]
    ChannelClosed,

    // ─────────────────────────────────────────────────────────────
    // Session Management Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Session not found: {id}")]
    SessionNotFound { id: u64 },

    #[error("Maximum of {max} concurrent sessions reached")]
    SessionLimit { max: usize },

    #[error("A session for device {device_id} already exists")]
    DuplicateDevice { device_id: String },

    // ─────────────────────────────────────────────────────────────
    // Headless Script Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid script line {line}: {message}")]
    Script { line: usize, message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn channel_send(message: impl Into<String>) -> Self {
        Self::ChannelSend {
            message: message.into(),
        }
    }

    pub fn session_not_found(id: u64) -> Self {
        Self::SessionNotFound { id }
    }

    pub fn duplicate_device(device_id: impl Into<String>) -> Self {
        Self::DuplicateDevice {
            device_id: device_id.into(),
        }
    }

    pub fn script(line: usize, message: impl Into<String>) -> Self {
        Self::Script {
            line,
            message: message.into(),
        }
    }

    /// Check if this error should stop the headless replay
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Io(_) | Error::ChannelClosed)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Log the error with lazily built context and pass it on
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::session_not_found(7);
        assert_eq!(err.to_string(), "Session not found: 7");

        let err = Error::SessionLimit { max: 9 };
        assert!(err.to_string().contains("9 concurrent sessions"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_error_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("not = [valid").unwrap_err();
        let err: Error = toml_err.into();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_only_plumbing_errors_are_fatal() {
        assert!(Error::ChannelClosed.is_fatal());
        assert!(!Error::duplicate_device("emulator-5554").is_fatal());
        assert!(!Error::script(3, "missing device").is_fatal());
        assert!(!Error::session_not_found(2).is_fatal());
    }

    #[test]
    fn test_script_error_mentions_line() {
        let err = Error::script(12, "unknown event type");
        assert!(err.to_string().contains("line 12"));
    }

    #[test]
    fn test_context_preserves_error() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = result
            .with_context(|| "reading script".to_string())
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
