// Typed session events.
//
// The transport reduces the wire protocol to this closed event set; the
// dispatcher consumes it with one exhaustive match. The label methods carry
// the operator-facing wording for the log surface.

use serde::{Deserialize, Serialize};

/// Everything the voice server can tell us that the core reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session is established and usable.
    Connected { welcome: Option<String> },
    /// The session ended; the supervisor takes over from here.
    Disconnected { cause: DisconnectCause },
    /// A user in our channel changed somehow.
    UserChange {
        user: String,
        kind: UserChangeKind,
        /// Occupancy of our channel after the change, ourselves included.
        users_in_channel: usize,
    },
    /// Chat text. `from` is absent for server-originated messages.
    TextMessage { from: Option<String>, body: String },
    /// The server refused something we asked for.
    PermissionDenied { reason: DenyReason },

    // Reserved kinds: delivered by the transport, acknowledged and dropped
    // by the dispatcher.
    ChannelChange,
    UserList,
    Acl,
    BanList,
    ContextAction,
    ServerConfig,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectCause {
    Error,
    Kicked,
    Banned,
    User,
}

impl DisconnectCause {
    /// Log annotation; only transport errors get one.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            DisconnectCause::Error => Some("connection error"),
            DisconnectCause::Kicked | DisconnectCause::Banned | DisconnectCause::User => None,
        }
    }
}

/// What changed about a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserChangeKind {
    Connected,
    Disconnected,
    Registered,
    Unregistered,
    NameChanged,
    ChannelChanged,
    AudioChanged,
    PrioritySpeaker,
    RecordingChanged,
    StatsChanged,
}

impl UserChangeKind {
    pub fn label(&self) -> &'static str {
        match self {
            UserChangeKind::Connected => "connected",
            UserChangeKind::Disconnected => "disconnected",
            UserChangeKind::Registered => "registered",
            UserChangeKind::Unregistered => "unregistered",
            UserChangeKind::NameChanged => "changed name",
            UserChangeKind::ChannelChanged => "changed channel",
            UserChangeKind::AudioChanged => "changed audio",
            UserChangeKind::PrioritySpeaker => "is priority speaker",
            UserChangeKind::RecordingChanged => "changed recording status",
            UserChangeKind::StatsChanged => "changed stats",
        }
    }
}

/// Closed set of denial reasons the server can answer with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// Free-form server-supplied explanation.
    Other(String),
    Permission,
    SuperUser,
    InvalidChannelName,
    TextTooLong,
    TemporaryChannel,
    MissingCertificate,
    InvalidUserName,
    ChannelFull,
    NestingLimit,
}

impl DenyReason {
    pub fn label(&self) -> &str {
        match self {
            DenyReason::Other(text) => text,
            DenyReason::Permission => "insufficient permissions",
            DenyReason::SuperUser => "cannot modify SuperUser",
            DenyReason::InvalidChannelName => "invalid channel name",
            DenyReason::TextTooLong => "text too long",
            DenyReason::TemporaryChannel => "temporary channel",
            DenyReason::MissingCertificate => "missing certificate",
            DenyReason::InvalidUserName => "invalid user name",
            DenyReason::ChannelFull => "channel full",
            DenyReason::NestingLimit => "nesting limit",
        }
    }
}
