//! Screen Mirror Library
//!
//! Headless driver for the session orchestrator: replays scripted session
//! events through the engine and reports every observable change as NDJSON.

pub mod headless;

pub use headless::runner::{replay, run_headless, ReplaySummary, ScriptLine};
pub use headless::HeadlessEvent;
