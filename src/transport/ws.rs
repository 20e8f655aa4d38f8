// WebSocket session transport.
//
// Control plane: JSON text frames, tagged by "type" (server to client) or
// "op" (client to server). Voice plane: binary frames of raw little-endian
// i16 PCM, both directions. The socket splits into a write task fed by an
// outbound channel and a read task that owns event emission; the read task
// always finishes with a Disconnected event unless the server already sent
// one.

use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async_tls_with_config, Connector, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::error::TransportError;
use crate::transport::event::{DenyReason, DisconnectCause, SessionEvent, UserChangeKind};
use crate::transport::{ChannelId, SessionHandle, TlsPolicy, Transport, VoiceLink};

/// Queued voice frames per direction before the lossy drop kicks in.
const VOICE_QUEUE: usize = 64;

/// Queued session events; the supervisor drains these promptly.
const EVENT_QUEUE: usize = 64;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Server-to-client control messages.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireEvent {
    Connected {
        welcome: Option<String>,
        /// Channel directory snapshot; backs `find_channel`.
        #[serde(default)]
        channels: Vec<WireChannel>,
    },
    Disconnected {
        cause: Option<DisconnectCause>,
    },
    UserChange {
        user: String,
        kind: UserChangeKind,
        users_in_channel: usize,
    },
    TextMessage {
        from: Option<String>,
        body: String,
    },
    PermissionDenied {
        reason: WireDeny,
        /// Server-supplied text accompanying `reason = "other"`.
        #[serde(default)]
        detail: Option<String>,
    },
    ChannelChange,
    UserList,
    Acl,
    BanList,
    ContextAction,
    ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WireChannel {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireDeny {
    Other,
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

/// Client-to-server control messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WireCommand {
    Hello { username: String },
    Join { channel: u32 },
}

impl WireEvent {
    /// Reduce a wire message to the typed session event the core consumes.
    pub fn into_event(self) -> SessionEvent {
        match self {
            WireEvent::Connected { welcome, .. } => SessionEvent::Connected { welcome },
            WireEvent::Disconnected { cause } => SessionEvent::Disconnected {
                cause: cause.unwrap_or(DisconnectCause::Error),
            },
            WireEvent::UserChange {
                user,
                kind,
                users_in_channel,
            } => SessionEvent::UserChange {
                user,
                kind,
                users_in_channel,
            },
            WireEvent::TextMessage { from, body } => SessionEvent::TextMessage { from, body },
            WireEvent::PermissionDenied { reason, detail } => SessionEvent::PermissionDenied {
                reason: reason.into_reason(detail),
            },
            WireEvent::ChannelChange => SessionEvent::ChannelChange,
            WireEvent::UserList => SessionEvent::UserList,
            WireEvent::Acl => SessionEvent::Acl,
            WireEvent::BanList => SessionEvent::BanList,
            WireEvent::ContextAction => SessionEvent::ContextAction,
            WireEvent::ServerConfig => SessionEvent::ServerConfig,
        }
    }
}

impl WireDeny {
    /// Pair the wire reason with its optional detail text.
    pub fn into_reason(self, detail: Option<String>) -> DenyReason {
        match self {
            WireDeny::Other => DenyReason::Other(detail.unwrap_or_default()),
            WireDeny::Permission => DenyReason::Permission,
            WireDeny::SuperUser => DenyReason::SuperUser,
            WireDeny::InvalidChannelName => DenyReason::InvalidChannelName,
            WireDeny::TextTooLong => DenyReason::TextTooLong,
            WireDeny::TemporaryChannel => DenyReason::TemporaryChannel,
            WireDeny::MissingCertificate => DenyReason::MissingCertificate,
            WireDeny::InvalidUserName => DenyReason::InvalidUserName,
            WireDeny::ChannelFull => DenyReason::ChannelFull,
            WireDeny::NestingLimit => DenyReason::NestingLimit,
        }
    }
}

/// Items bound for the socket write task.
enum Outbound {
    Control(String),
    Voice(Vec<u8>),
    Goodbye,
}

pub struct WsTransport {
    username: String,
}

impl WsTransport {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn dial(
        &self,
        address: &str,
        tls: &TlsPolicy,
    ) -> Result<(Box<dyn SessionHandle>, mpsc::Receiver<SessionEvent>), TransportError> {
        let url = format!("wss://{}/session", address);

        let connector = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(tls.insecure)
            .danger_accept_invalid_hostnames(tls.insecure)
            .build()
            .map_err(|err| TransportError::Tls(err.to_string()))?;

        let (socket, _response) =
            connect_async_tls_with_config(url, None, false, Some(Connector::NativeTls(connector)))
                .await
                .map_err(|err| TransportError::Dial(err.to_string()))?;

        let (mut sink, source) = socket.split();

        // Introduce ourselves before anything else flows.
        let hello = encode(&WireCommand::Hello {
            username: self.username.clone(),
        })?;
        sink.send(Message::Text(hello))
            .await
            .map_err(|err| TransportError::Dial(err.to_string()))?;

        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE);
        let (outbound_tx, outbound_rx) = mpsc::channel(EVENT_QUEUE);
        let channels = Arc::new(RwLock::new(Vec::new()));
        let voice_in = Arc::new(Mutex::new(None));

        tokio::spawn(write_loop(sink, outbound_rx));
        tokio::spawn(read_loop(
            source,
            event_tx,
            channels.clone(),
            voice_in.clone(),
        ));

        let handle = WsHandle {
            outbound: outbound_tx,
            channels,
            voice_in,
        };
        Ok((Box::new(handle), event_rx))
    }
}

struct WsHandle {
    outbound: mpsc::Sender<Outbound>,
    channels: Arc<RwLock<Vec<WireChannel>>>,
    /// Current sink for incoming voice; replaced on every `open_voice`.
    voice_in: Arc<Mutex<Option<mpsc::Sender<Vec<u8>>>>>,
}

impl WsHandle {
    async fn send_control(&self, command: &WireCommand) -> Result<(), TransportError> {
        let json = encode(command)?;
        self.outbound
            .send(Outbound::Control(json))
            .await
            .map_err(|_| TransportError::Closed)
    }
}

#[async_trait]
impl SessionHandle for WsHandle {
    async fn find_channel(&self, name: &str) -> Option<ChannelId> {
        self.channels
            .read()
            .unwrap()
            .iter()
            .find(|channel| channel.name == name)
            .map(|channel| ChannelId(channel.id))
    }

    async fn join_channel(&self, channel: ChannelId) -> Result<(), TransportError> {
        self.send_control(&WireCommand::Join { channel: channel.0 })
            .await
    }

    fn open_voice(&self) -> Result<VoiceLink, TransportError> {
        if self.outbound.is_closed() {
            return Err(TransportError::Closed);
        }

        let (in_tx, in_rx) = mpsc::channel(VOICE_QUEUE);
        *self.voice_in.lock().unwrap() = Some(in_tx);

        // Outgoing frames go through a forwarder so the link holds a plain
        // byte sender; the forwarder dies with the session.
        let (out_tx, mut out_rx) = mpsc::channel::<Vec<u8>>(VOICE_QUEUE);
        let outbound = self.outbound.clone();
        tokio::spawn(async move {
            while let Some(pcm) = out_rx.recv().await {
                if outbound.send(Outbound::Voice(pcm)).await.is_err() {
                    break;
                }
            }
        });

        Ok(VoiceLink {
            outgoing: out_tx,
            incoming: in_rx,
        })
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.outbound
            .send(Outbound::Goodbye)
            .await
            .map_err(|_| TransportError::Closed)
    }
}

fn encode(command: &WireCommand) -> Result<String, TransportError> {
    serde_json::to_string(command).map_err(|err| TransportError::Protocol(err.to_string()))
}

async fn write_loop(mut sink: WsSink, mut outbound: mpsc::Receiver<Outbound>) {
    while let Some(item) = outbound.recv().await {
        let result = match item {
            Outbound::Control(json) => sink.send(Message::Text(json)).await,
            Outbound::Voice(pcm) => sink.send(Message::Binary(pcm)).await,
            Outbound::Goodbye => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
        };

        // The read side observes and reports the failure.
        if result.is_err() {
            break;
        }
    }
}

async fn read_loop(
    mut source: WsSource,
    events: mpsc::Sender<SessionEvent>,
    channels: Arc<RwLock<Vec<WireChannel>>>,
    voice_in: Arc<Mutex<Option<mpsc::Sender<Vec<u8>>>>>,
) {
    let mut reported = false;

    while let Some(frame) = source.next().await {
        match frame {
            Ok(Message::Text(json)) => match serde_json::from_str::<WireEvent>(&json) {
                Ok(wire) => {
                    if let WireEvent::Connected { channels: list, .. } = &wire {
                        *channels.write().unwrap() = list.clone();
                    }
                    let is_disconnect = matches!(wire, WireEvent::Disconnected { .. });

                    if events.send(wire.into_event()).await.is_err() {
                        return;
                    }
                    if is_disconnect {
                        reported = true;
                        break;
                    }
                }
                // Unknown control messages are accepted and ignored.
                Err(err) => debug!("Unhandled control message: {}", err),
            },
            Ok(Message::Binary(pcm)) => {
                // Voice frames are droppable; skip them when playback lags.
                if let Some(tx) = voice_in.lock().unwrap().as_ref() {
                    let _ = tx.try_send(pcm);
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                debug!("Session socket error: {}", err);
                break;
            }
        }
    }

    if !reported {
        let _ = events
            .send(SessionEvent::Disconnected {
                cause: DisconnectCause::Error,
            })
            .await;
    }
}
