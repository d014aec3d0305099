//! Mailbox messages for a session actor

use tokio::sync::oneshot;

use scrmirror_core::SessionEvent;

use crate::session::SessionSnapshot;

/// Everything a session actor can receive, processed strictly in order
#[derive(Debug)]
pub enum Message {
    /// An inbound event from a collaborator
    Event(SessionEvent),

    /// Reply with a snapshot once every earlier message has been applied
    Flush(oneshot::Sender<SessionSnapshot>),

    /// Stop the actor after the messages already queued
    Stop,
}
