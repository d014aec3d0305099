//! Main update function - routes typed events to their handlers

use scrmirror_core::SessionEvent;

use super::{control, decoder, encoder, forward, server, socket, transport, UpdateResult};
use crate::session::Session;

/// Apply one event to a session.
///
/// Returns an optional follow-up event and/or action. Handlers never block.
pub fn update(session: &mut Session, event: SessionEvent) -> UpdateResult {
    tracing::trace!(
        "Session {} <- {}",
        session.id,
        event.event_type()
    );
    session.monitor.record_event(&event);

    match event {
        // ─────────────────────────────────────────────────────────
        // Transport
        // ─────────────────────────────────────────────────────────
        SessionEvent::TransportConnecting => transport::handle_connecting(session),
        SessionEvent::TransportVerifying => transport::handle_verifying(session),
        SessionEvent::TransportConnected => transport::handle_connected(session),
        SessionEvent::TransportDisconnected { reason } => {
            transport::handle_disconnected(session, reason)
        }

        // ─────────────────────────────────────────────────────────
        // Port Forwarding
        // ─────────────────────────────────────────────────────────
        SessionEvent::ForwardSetting => forward::handle_setting(session),
        SessionEvent::ForwardEstablished { detail } => forward::handle_established(session, detail),
        SessionEvent::ForwardRemoved { detail } => forward::handle_removed(session, detail),
        SessionEvent::ForwardFailed { reason } => forward::handle_failed(session, reason),

        // ─────────────────────────────────────────────────────────
        // Companion Server
        // ─────────────────────────────────────────────────────────
        SessionEvent::ServerPushing => server::handle_pushing(session),
        SessionEvent::ServerPushed => server::handle_pushed(session),
        SessionEvent::ServerPushFailed { reason } => server::handle_push_failed(session, reason),
        SessionEvent::ServerStarting => server::handle_starting(session),
        SessionEvent::ServerStarted => server::handle_started(session),
        SessionEvent::ServerFailed { reason } => server::handle_failed(session, reason),

        // ─────────────────────────────────────────────────────────
        // Sockets
        // ─────────────────────────────────────────────────────────
        SessionEvent::SocketConnecting { kind } => socket::handle_connecting(session, kind),
        SessionEvent::SocketConnected { kind } => socket::handle_connected(session, kind),
        SessionEvent::SocketDisconnected { kind } => socket::handle_disconnected(session, kind),
        SessionEvent::SocketError { kind, reason } => socket::handle_error(session, kind, reason),

        // ─────────────────────────────────────────────────────────
        // Decoders
        // ─────────────────────────────────────────────────────────
        SessionEvent::DecoderStarted { kind } => decoder::handle_started(session, kind),
        SessionEvent::DecoderStopped { kind } => decoder::handle_stopped(session, kind),
        SessionEvent::DecoderError { kind, reason } => decoder::handle_error(session, kind, reason),

        // ─────────────────────────────────────────────────────────
        // Encoder Detection
        // ─────────────────────────────────────────────────────────
        event @ (SessionEvent::EncoderDetecting { .. }
        | SessionEvent::EncoderDetected { .. }
        | SessionEvent::EncoderDetectFailed { .. }
        | SessionEvent::EncoderError { .. }) => encoder::handle_notification(session, &event),

        // ─────────────────────────────────────────────────────────
        // Control
        // ─────────────────────────────────────────────────────────
        SessionEvent::RequestReconnect { reason } => control::handle_request_reconnect(session, reason),
        SessionEvent::RequestCleanup => control::handle_request_cleanup(session),
        SessionEvent::SessionError { reason } => control::handle_session_error(session, reason),
    }
}
