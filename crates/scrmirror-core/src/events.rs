//! Inbound session event definitions
//!
//! Every collaborator of a session (transport layer, server launcher, socket
//! layer, decoders) reports through one of these variants. Socket and decoder
//! events carry their kind as a typed field, so routing never depends on the
//! wording of a message.

use serde::{Deserialize, Serialize};

use crate::types::{DecoderKind, ExceptionKind, MediaKind, SocketKind};

/// Fully typed session event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    // Transport
    TransportConnecting,
    TransportVerifying,
    TransportConnected,
    TransportDisconnected { reason: String },

    // Port forwarding
    ForwardSetting,
    ForwardEstablished { detail: String },
    ForwardRemoved { detail: String },
    ForwardFailed { reason: String },

    // Companion server
    ServerPushing,
    ServerPushed,
    ServerPushFailed { reason: String },
    ServerStarting,
    ServerStarted,
    ServerFailed { reason: String },

    // Sockets
    SocketConnecting { kind: SocketKind },
    SocketConnected { kind: SocketKind },
    SocketDisconnected { kind: SocketKind },
    SocketError { kind: SocketKind, reason: String },

    // Decoders
    DecoderStarted { kind: DecoderKind },
    DecoderStopped { kind: DecoderKind },
    DecoderError { kind: DecoderKind, reason: String },

    // Remote encoder detection
    EncoderDetecting { media: MediaKind },
    EncoderDetected { media: MediaKind },
    EncoderDetectFailed { media: MediaKind, reason: String },
    EncoderError { media: MediaKind, reason: String },

    // Control
    RequestReconnect { reason: String },
    RequestCleanup,
    SessionError { reason: String },
}

impl SessionEvent {
    /// Returns a short string label for this event type (for logging/debugging).
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::TransportConnecting => "transport_connecting",
            Self::TransportVerifying => "transport_verifying",
            Self::TransportConnected => "transport_connected",
            Self::TransportDisconnected { .. } => "transport_disconnected",
            Self::ForwardSetting => "forward_setting",
            Self::ForwardEstablished { .. } => "forward_established",
            Self::ForwardRemoved { .. } => "forward_removed",
            Self::ForwardFailed { .. } => "forward_failed",
            Self::ServerPushing => "server_pushing",
            Self::ServerPushed => "server_pushed",
            Self::ServerPushFailed { .. } => "server_push_failed",
            Self::ServerStarting => "server_starting",
            Self::ServerStarted => "server_started",
            Self::ServerFailed { .. } => "server_failed",
            Self::SocketConnecting { .. } => "socket_connecting",
            Self::SocketConnected { .. } => "socket_connected",
            Self::SocketDisconnected { .. } => "socket_disconnected",
            Self::SocketError { .. } => "socket_error",
            Self::DecoderStarted { .. } => "decoder_started",
            Self::DecoderStopped { .. } => "decoder_stopped",
            Self::DecoderError { .. } => "decoder_error",
            Self::EncoderDetecting { .. } => "encoder_detecting",
            Self::EncoderDetected { .. } => "encoder_detected",
            Self::EncoderDetectFailed { .. } => "encoder_detect_failed",
            Self::EncoderError { .. } => "encoder_error",
            Self::RequestReconnect { .. } => "request_reconnect",
            Self::RequestCleanup => "request_cleanup",
            Self::SessionError { .. } => "session_error",
        }
    }

    /// Check if this event reports a failure
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::TransportDisconnected { .. }
                | Self::ForwardFailed { .. }
                | Self::ServerPushFailed { .. }
                | Self::ServerFailed { .. }
                | Self::SocketError { .. }
                | Self::DecoderError { .. }
                | Self::EncoderDetectFailed { .. }
                | Self::EncoderError { .. }
                | Self::SessionError { .. }
        )
    }

    /// Subsystem to blame when this event reports a failure
    pub fn exception_kind(&self) -> Option<ExceptionKind> {
        match self {
            Self::TransportDisconnected { .. } | Self::ForwardFailed { .. } => {
                Some(ExceptionKind::Adb)
            }
            Self::ServerPushFailed { .. } | Self::ServerFailed { .. } => Some(ExceptionKind::Server),
            Self::SocketError { .. } => Some(ExceptionKind::Socket),
            Self::DecoderError { .. } => Some(ExceptionKind::Decoder),
            Self::EncoderDetectFailed { .. } | Self::EncoderError { .. } => {
                Some(ExceptionKind::Encoder)
            }
            Self::SessionError { .. } => Some(ExceptionKind::Session),
            _ => None,
        }
    }

    /// Get a human-readable summary
    pub fn summary(&self) -> String {
        match self {
            Self::TransportConnecting => "Transport connecting".to_string(),
            Self::TransportVerifying => "Transport verifying".to_string(),
            Self::TransportConnected => "Transport connected".to_string(),
            Self::TransportDisconnected { reason } => {
                format!("Transport disconnected: {}", reason)
            }
            Self::ForwardSetting => "Setting up port forward".to_string(),
            Self::ForwardEstablished { detail } => format!("Port forward established: {}", detail),
            Self::ForwardRemoved { detail } => format!("Port forward removed: {}", detail),
            Self::ForwardFailed { reason } => format!("Port forward failed: {}", reason),
            Self::ServerPushing => "Pushing server".to_string(),
            Self::ServerPushed => "Server pushed".to_string(),
            Self::ServerPushFailed { reason } => format!("Server push failed: {}", reason),
            Self::ServerStarting => "Server starting".to_string(),
            Self::ServerStarted => "Server started".to_string(),
            Self::ServerFailed { reason } => format!("Server failed: {}", reason),
            Self::SocketConnecting { kind } => format!("{} socket connecting", kind),
            Self::SocketConnected { kind } => format!("{} socket connected", kind),
            Self::SocketDisconnected { kind } => format!("{} socket disconnected", kind),
            Self::SocketError { kind, reason } => format!("{} socket error: {}", kind, reason),
            Self::DecoderStarted { kind } => format!("{} decoder started", kind),
            Self::DecoderStopped { kind } => format!("{} decoder stopped", kind),
            Self::DecoderError { kind, reason } => format!("{} decoder error: {}", kind, reason),
            Self::EncoderDetecting { media } => format!("Detecting {} encoders", media),
            Self::EncoderDetected { media } => format!("{} encoders detected", media),
            Self::EncoderDetectFailed { media, reason } => {
                format!("{} encoder detection failed: {}", media, reason)
            }
            Self::EncoderError { media, reason } => format!("{} encoder error: {}", media, reason),
            Self::RequestReconnect { reason } => format!("Reconnect requested: {}", reason),
            Self::RequestCleanup => "Cleanup requested".to_string(),
            Self::SessionError { reason } => format!("Session error: {}", reason),
        }
    }
}
