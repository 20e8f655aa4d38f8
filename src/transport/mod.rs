//! Voice transport boundary
//!
//! The wire protocol (framing, handshake, codec negotiation) stays behind
//! these traits: the core dials through `Transport`, drives the session
//! through `SessionHandle`, and consumes the typed `SessionEvent` stream.
//! `WsTransport` is the shipping implementation.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::error::TransportError;

pub mod event;
pub mod ws;

pub use event::{DenyReason, DisconnectCause, SessionEvent, UserChangeKind};
pub use ws::WsTransport;

/// Transport security policy applied when dialing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TlsPolicy {
    /// Accept self-signed or otherwise unverifiable server certificates.
    #[serde(default)]
    pub insecure: bool,
}

/// Server-assigned channel identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u32);

/// PCM byte pipes binding an audio stream to the live session.
///
/// Little-endian i16 frames in both directions. A fresh pair comes from
/// `SessionHandle::open_voice` on every call so a stream reset re-binds
/// cleanly; pipes from an earlier call go quiet once replaced.
pub struct VoiceLink {
    /// Captured microphone PCM toward the server.
    pub outgoing: mpsc::Sender<Vec<u8>>,
    /// Remote speech PCM for playback.
    pub incoming: mpsc::Receiver<Vec<u8>>,
}

/// Session dialer.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Establish a session to `address` (host:port).
    ///
    /// Session events arrive on the returned receiver. The transport
    /// guarantees serialized delivery and always finishes with a
    /// `Disconnected` event (or closes the channel, which the supervisor
    /// treats the same way).
    async fn dial(
        &self,
        address: &str,
        tls: &TlsPolicy,
    ) -> Result<(Box<dyn SessionHandle>, mpsc::Receiver<SessionEvent>), TransportError>;
}

/// Operations on a live session.
#[async_trait]
pub trait SessionHandle: Send + Sync {
    /// Look up a channel by name in the server's channel directory.
    async fn find_channel(&self, name: &str) -> Option<ChannelId>;

    /// Move ourselves into the given channel.
    async fn join_channel(&self, channel: ChannelId) -> Result<(), TransportError>;

    /// Open a fresh voice pipe pair bound to this session.
    fn open_voice(&self) -> Result<VoiceLink, TransportError>;

    /// Best-effort goodbye; the session is unusable afterwards.
    async fn disconnect(&self) -> Result<(), TransportError>;
}
