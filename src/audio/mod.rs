//! Audio boundary
//!
//! Capture and playback stay behind `AudioEngine` and `AudioStream`; the
//! `StreamManager` owns the single live stream and its lifecycle. The
//! shipping engine (`CpalEngine`) talks to the platform audio devices.

use async_trait::async_trait;

use crate::error::AudioError;
use crate::transport::SessionHandle;

pub mod engine;
pub mod manager;

pub use engine::{CpalEngine, EngineConfig};
pub use manager::{StreamManager, RESET_COOLDOWN};

/// Builds audio streams bound to live sessions.
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Open a capture/playback stream wired to the session's voice pipes.
    ///
    /// Playback runs as soon as the stream exists; capture stays gated
    /// until `AudioStream::start_source`.
    async fn open_stream(
        &self,
        session: &dyn SessionHandle,
    ) -> Result<Box<dyn AudioStream>, AudioError>;
}

/// A live capture/playback stream. Dropping it releases the devices.
pub trait AudioStream: Send {
    /// Begin sending captured audio to the session.
    fn start_source(&mut self) -> Result<(), AudioError>;

    /// Stop sending captured audio.
    fn stop_source(&mut self) -> Result<(), AudioError>;
}
