// Audio stream lifecycle.
//
// Owns the single stream slot. open/close/reset run from the supervisor;
// start_source/stop_source run from the transmit gate task. The mutex on
// the slot is the ordering guard between the two.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::audio::{AudioEngine, AudioStream};
use crate::error::AudioError;
use crate::transport::SessionHandle;

/// Settle time between destroying a stream and reopening it.
pub const RESET_COOLDOWN: Duration = Duration::from_millis(50);

pub struct StreamManager {
    engine: Box<dyn AudioEngine>,
    stream: Mutex<Option<Box<dyn AudioStream>>>,
}

impl StreamManager {
    pub fn new(engine: Box<dyn AudioEngine>) -> Self {
        Self {
            engine,
            stream: Mutex::new(None),
        }
    }

    /// Open a stream against the given session, replacing any previous one.
    ///
    /// Callers treat failure as fatal: the device is pointless without
    /// audio, so a failed open forfeits the session.
    pub async fn open(&self, session: &dyn SessionHandle) -> Result<(), AudioError> {
        let stream = self.engine.open_stream(session).await?;
        *self.stream.lock().await = Some(stream);
        debug!("Audio stream open");
        Ok(())
    }

    /// Destroy the current stream, if any.
    pub async fn close(&self) {
        if self.stream.lock().await.take().is_some() {
            debug!("Audio stream closed");
        }
    }

    /// Destroy and reopen the stream, pausing briefly so the device can
    /// settle. For use when the stream hits an unrecoverable local error
    /// while the session itself stays up.
    pub async fn reset(&self, session: &dyn SessionHandle) -> Result<(), AudioError> {
        let mut slot = self.stream.lock().await;
        slot.take();
        sleep(RESET_COOLDOWN).await;
        *slot = Some(self.engine.open_stream(session).await?);
        info!("Audio stream reset");
        Ok(())
    }

    pub async fn start_source(&self) -> Result<(), AudioError> {
        match self.stream.lock().await.as_mut() {
            Some(stream) => stream.start_source(),
            // The gate's connected check can race a teardown; nothing to do.
            None => Ok(()),
        }
    }

    pub async fn stop_source(&self) -> Result<(), AudioError> {
        match self.stream.lock().await.as_mut() {
            Some(stream) => stream.stop_source(),
            None => Ok(()),
        }
    }
}
