//! scrmirror-app - Session orchestration for the screen mirroring client
//!
//! This crate implements the TEA (The Elm Architecture) pattern for session
//! state: typed events flow through `handler::update`, one tokio actor per
//! session serializes them, and the Engine fans observable changes out to
//! subscribers. Configuration loading lives here too.

pub mod config;
pub mod engine;
pub mod engine_event;
pub mod handler;
pub mod message;
pub mod process;
pub mod session;
pub mod session_manager;

// Re-export primary types
pub use config::Settings;
pub use engine::Engine;
pub use engine_event::EngineEvent;
pub use handler::{UpdateAction, UpdateResult};
pub use message::Message;
pub use session::{
    ReconnectPolicy, ReconnectRequest, ReconnectSink, Session, SessionHandle, SessionId,
    SessionSnapshot,
};
pub use session_manager::SessionManager;
