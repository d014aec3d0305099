//! # scrmirror-core - Core Domain Types
//!
//! Foundation crate for the screen mirroring client. Provides the session
//! domain types, the typed inbound event set, error handling and logging.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`SessionState`] - Observable session state and its transition graph
//! - [`ConnectionStep`], [`StepStatus`], [`ConnectionProgress`] - Handshake progress
//! - [`SessionComponent`], [`ComponentState`] - Independently tracked subsystems
//! - [`SocketKind`], [`DecoderKind`], [`MediaKind`] - Typed event kinds
//! - [`ExceptionKind`] - Subsystem a recorded failure came from
//!
//! ### Events (`events`)
//! - [`SessionEvent`] - Every inbound notification a session consumes
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use scrmirror_core::prelude::*;
//! ```

pub mod error;
pub mod events;
pub mod logging;
pub mod prelude;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result, ResultExt};
pub use events::SessionEvent;
pub use types::{
    ComponentState, ConnectionProgress, ConnectionStep, DecoderKind, ExceptionKind, MediaKind,
    SessionComponent, SessionState, SocketKind, StepStatus,
};
