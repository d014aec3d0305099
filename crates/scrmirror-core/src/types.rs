//! Core domain types for a mirroring session

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────
// Session State
// ─────────────────────────────────────────────────────────

/// Observable state of one mirroring session.
///
/// Exactly one value is active per session. Successors are constrained by
/// [`SessionState::can_transition_to`]; the only exception is a cleanup, which
/// resets to [`SessionState::Idle`] from anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    AdbConnecting,
    AdbConnected,
    AdbDisconnected {
        reason: String,
    },
    ServerStarting,
    ServerStarted,
    ServerFailed {
        reason: String,
    },
    Connected,
    Reconnecting {
        attempt: u32,
    },
    Failed {
        reason: String,
    },
}

impl SessionState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(&self, next: &SessionState) -> bool {
        use SessionState as S;

        match (self, next) {
            (S::Idle, S::AdbConnecting | S::AdbConnected | S::AdbDisconnected { .. }) => true,

            (
                S::AdbConnecting,
                S::AdbConnected | S::AdbDisconnected { .. } | S::ServerFailed { .. },
            ) => true,

            (
                S::AdbConnected,
                S::ServerStarting
                | S::ServerStarted
                | S::ServerFailed { .. }
                | S::Connected
                | S::AdbDisconnected { .. }
                | S::Reconnecting { .. },
            ) => true,

            (
                S::ServerStarting,
                S::ServerStarted
                | S::ServerFailed { .. }
                | S::Connected
                | S::AdbDisconnected { .. }
                | S::Reconnecting { .. },
            ) => true,

            (
                S::ServerStarted,
                S::Connected
                | S::ServerFailed { .. }
                | S::AdbDisconnected { .. }
                | S::Reconnecting { .. },
            ) => true,

            (
                S::Connected,
                S::Reconnecting { .. } | S::AdbDisconnected { .. } | S::ServerFailed { .. },
            ) => true,

            (
                S::Reconnecting { .. },
                S::Reconnecting { .. }
                | S::Connected
                | S::AdbConnecting
                | S::AdbConnected
                | S::ServerStarting
                | S::ServerStarted
                | S::AdbDisconnected { .. }
                | S::ServerFailed { .. },
            ) => true,

            (
                S::AdbDisconnected { .. } | S::ServerFailed { .. },
                S::AdbConnecting | S::Reconnecting { .. },
            ) => true,

            // Failed is reachable from every state, including itself (reason update)
            (_, S::Failed { .. }) => true,

            _ => false,
        }
    }

    /// True for stage failures and exhausted retries.
    ///
    /// A terminal session stays put until a cleanup or an explicit
    /// re-initiation of the handshake.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::AdbDisconnected { .. }
                | SessionState::ServerFailed { .. }
                | SessionState::Failed { .. }
        )
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, SessionState::Connected)
    }

    /// Failure reason carried by this state, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            SessionState::AdbDisconnected { reason }
            | SessionState::ServerFailed { reason }
            | SessionState::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    /// Short snake_case label (for logs and NDJSON output)
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::AdbConnecting => "adb_connecting",
            SessionState::AdbConnected => "adb_connected",
            SessionState::AdbDisconnected { .. } => "adb_disconnected",
            SessionState::ServerStarting => "server_starting",
            SessionState::ServerStarted => "server_started",
            SessionState::ServerFailed { .. } => "server_failed",
            SessionState::Connected => "connected",
            SessionState::Reconnecting { .. } => "reconnecting",
            SessionState::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Reconnecting { attempt } => write!(f, "reconnecting ({})", attempt),
            state => match state.reason() {
                Some(reason) => write!(f, "{}: {}", state.label(), reason),
                None => write!(f, "{}", state.label()),
            },
        }
    }
}

// ─────────────────────────────────────────────────────────
// Connection Progress
// ─────────────────────────────────────────────────────────

/// Ordered stages of the connection handshake
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStep {
    AdbConnect,
    AdbForward,
    PushServer,
    StartServer,
    ConnectSocket,
    Completed,
}

impl ConnectionStep {
    /// All steps in handshake order
    pub const ALL: [ConnectionStep; 6] = [
        ConnectionStep::AdbConnect,
        ConnectionStep::AdbForward,
        ConnectionStep::PushServer,
        ConnectionStep::StartServer,
        ConnectionStep::ConnectSocket,
        ConnectionStep::Completed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStep::AdbConnect => "adb_connect",
            ConnectionStep::AdbForward => "adb_forward",
            ConnectionStep::PushServer => "push_server",
            ConnectionStep::StartServer => "start_server",
            ConnectionStep::ConnectSocket => "connect_socket",
            ConnectionStep::Completed => "completed",
        }
    }

    /// Message shown when a handler does not supply its own
    pub fn default_message(&self, status: StepStatus) -> &'static str {
        use ConnectionStep as C;
        use StepStatus as S;

        match (self, status) {
            (C::AdbConnect, S::Pending) => "Waiting to connect to ADB...",
            (C::AdbConnect, S::Running) => "Connecting to ADB...",
            (C::AdbConnect, S::Success) => "ADB connected",
            (C::AdbConnect, S::Failed) => "ADB connection failed",

            (C::AdbForward, S::Pending) => "Waiting to set up port forwarding...",
            (C::AdbForward, S::Running) => "Setting up port forwarding...",
            (C::AdbForward, S::Success) => "Port forwarding established",
            (C::AdbForward, S::Failed) => "Port forwarding failed",

            (C::PushServer, S::Pending) => "Waiting to push server...",
            (C::PushServer, S::Running) => "Pushing server...",
            (C::PushServer, S::Success) => "Server pushed",
            (C::PushServer, S::Failed) => "Failed to push server",

            (C::StartServer, S::Pending) => "Waiting to start server...",
            (C::StartServer, S::Running) => "Starting server...",
            (C::StartServer, S::Success) => "Server started",
            (C::StartServer, S::Failed) => "Failed to start server",

            (C::ConnectSocket, S::Pending) => "Waiting to connect socket...",
            (C::ConnectSocket, S::Running) => "Connecting socket...",
            (C::ConnectSocket, S::Success) => "Socket connected",
            (C::ConnectSocket, S::Failed) => "Socket connection failed",

            (C::Completed, S::Pending) => "Waiting to complete...",
            (C::Completed, S::Running) => "Completing...",
            (C::Completed, S::Success) => "Connection established",
            (C::Completed, S::Failed) => "Connection failed",
        }
    }
}

impl fmt::Display for ConnectionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Status of a single handshake step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    Running,
    Success,
    Failed,
}

impl StepStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Success => "success",
            StepStatus::Failed => "failed",
        }
    }
}

/// Latest known status of one handshake step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProgress {
    pub step: ConnectionStep,
    pub status: StepStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated_at: DateTime<Local>,
}

impl ConnectionProgress {
    pub fn new(
        step: ConnectionStep,
        status: StepStatus,
        message: Option<String>,
        error: Option<String>,
    ) -> Self {
        Self {
            step,
            status,
            message: message.unwrap_or_else(|| step.default_message(status).to_string()),
            error,
            updated_at: Local::now(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == StepStatus::Failed
    }
}

// ─────────────────────────────────────────────────────────
// Components
// ─────────────────────────────────────────────────────────

/// Subsystems whose status is tracked independently
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SessionComponent {
    TransportConnection,
    RemoteServerProcess,
    VideoSocket,
    AudioSocket,
    ControlSocket,
    VideoDecoder,
    AudioDecoder,
}

impl SessionComponent {
    pub const ALL: [SessionComponent; 7] = [
        SessionComponent::TransportConnection,
        SessionComponent::RemoteServerProcess,
        SessionComponent::VideoSocket,
        SessionComponent::AudioSocket,
        SessionComponent::ControlSocket,
        SessionComponent::VideoDecoder,
        SessionComponent::AudioDecoder,
    ];

    /// The three sockets that make up the connection barrier
    pub const SOCKETS: [SessionComponent; 3] = [
        SessionComponent::VideoSocket,
        SessionComponent::AudioSocket,
        SessionComponent::ControlSocket,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SessionComponent::TransportConnection => "transport_connection",
            SessionComponent::RemoteServerProcess => "remote_server_process",
            SessionComponent::VideoSocket => "video_socket",
            SessionComponent::AudioSocket => "audio_socket",
            SessionComponent::ControlSocket => "control_socket",
            SessionComponent::VideoDecoder => "video_decoder",
            SessionComponent::AudioDecoder => "audio_decoder",
        }
    }
}

impl fmt::Display for SessionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Status of one tracked subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComponentState {
    Connected,
    Disconnected,
    Running,
    Stopped,
    Error { message: String },
}

impl ComponentState {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ComponentState::Error { .. })
    }
}

// ─────────────────────────────────────────────────────────
// Typed Kinds
// ─────────────────────────────────────────────────────────

/// Which of the three data sockets an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocketKind {
    Video,
    Audio,
    Control,
}

impl SocketKind {
    pub fn component(&self) -> SessionComponent {
        match self {
            SocketKind::Video => SessionComponent::VideoSocket,
            SocketKind::Audio => SessionComponent::AudioSocket,
            SocketKind::Control => SessionComponent::ControlSocket,
        }
    }
}

impl fmt::Display for SocketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketKind::Video => f.write_str("video"),
            SocketKind::Audio => f.write_str("audio"),
            SocketKind::Control => f.write_str("control"),
        }
    }
}

/// Which media decoder an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecoderKind {
    Video,
    Audio,
}

impl DecoderKind {
    pub fn component(&self) -> SessionComponent {
        match self {
            DecoderKind::Video => SessionComponent::VideoDecoder,
            DecoderKind::Audio => SessionComponent::AudioDecoder,
        }
    }
}

impl fmt::Display for DecoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecoderKind::Video => f.write_str("video"),
            DecoderKind::Audio => f.write_str("audio"),
        }
    }
}

/// Media type for remote encoder detection notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Audio,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => f.write_str("video"),
            MediaKind::Audio => f.write_str("audio"),
        }
    }
}

// ─────────────────────────────────────────────────────────
// Failure Records
// ─────────────────────────────────────────────────────────

/// Subsystem a recorded failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionKind {
    Adb,
    Server,
    Socket,
    Decoder,
    Encoder,
    Session,
}

impl ExceptionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ExceptionKind::Adb => "adb",
            ExceptionKind::Server => "server",
            ExceptionKind::Socket => "socket",
            ExceptionKind::Decoder => "decoder",
            ExceptionKind::Encoder => "encoder",
            ExceptionKind::Session => "session",
        }
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
