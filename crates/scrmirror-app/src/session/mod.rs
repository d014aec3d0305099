//! Per-device session state and the actor that owns it

mod actor;
mod components;
mod handle;
mod monitor;
mod progress;
mod reconnect;
#[allow(clippy::module_inception)]
mod session;


// Re-export all public types at the session:: level
pub use components::ComponentStateRegistry;
pub use handle::{SessionHandle, SessionRuntime};
pub use monitor::{ConnectionRecord, EventStatistics, ExceptionRecord, SessionMonitor};
pub use progress::ConnectionProgressTracker;
pub use reconnect::{ReconnectDecision, ReconnectPolicy, ReconnectRequest, ReconnectSink};
pub use session::{Session, SessionSnapshot};

#[cfg(test)]
pub(crate) use reconnect::MockReconnectSink;

// SessionId and next_session_id live here in mod.rs
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a session
pub type SessionId = u64;

static SESSION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a new unique session ID
pub fn next_session_id() -> SessionId {
    SESSION_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}
