pub mod audio;
pub mod client;
pub mod config;
pub mod error;
pub mod hw;
pub mod session;
pub mod text;
pub mod transmit;
pub mod transport;

pub use audio::{AudioEngine, AudioStream, CpalEngine, EngineConfig, StreamManager};
pub use client::Client;
pub use config::{Config, HardwareConfig, ServerConfig};
pub use error::{AudioError, ClientError, HardwareError, TransportError};
pub use hw::{Indicator, IndicatorController, IndicatorPanel, PttEdge, TransmitControl};
pub use session::{ConnectionSupervisor, LinkState, SessionConfig, SessionState};
pub use transmit::TransmitGate;
pub use transport::{SessionEvent, SessionHandle, TlsPolicy, Transport, VoiceLink};
