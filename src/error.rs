// Error types for the session core.
//
// Leaf enums (`TransportError`, `AudioError`, `HardwareError`) describe
// failures at each collaborator boundary. `ClientError` is the top-level
// fatal set: anything it carries ends the process, because the device has
// no degraded mode without its voice session.

use thiserror::Error;

use crate::hw::Indicator;

/// Failures at the voice transport boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("dial failed: {0}")]
    Dial(String),

    #[error("tls setup failed: {0}")]
    Tls(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("connection closed")]
    Closed,
}

/// Failures at the audio engine boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("no audio device available")]
    NoDevice,

    #[error("stream setup failed: {0}")]
    StreamSetup(String),

    #[error("stream closed")]
    StreamClosed,
}

/// Failures at the hardware I/O boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HardwareError {
    #[error("indicator {indicator} unavailable: {detail}")]
    Indicator { indicator: Indicator, detail: String },

    #[error("input device error: {0}")]
    Input(String),

    #[error("input listener stopped")]
    InputClosed,
}

/// Unrecoverable conditions. Each variant maps to process exit status 1.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unable to connect to {address} after {attempts} attempts, giving up")]
    RetriesExhausted { address: String, attempts: u32 },

    #[error("stream open error ({source})")]
    AudioOpen {
        #[from]
        source: AudioError,
    },

    #[error(transparent)]
    Hardware(#[from] HardwareError),
}
