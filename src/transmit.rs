// Transmit gate: hardware control input → audio source start/stop.
//
// Only effective while the session is connected; the connected check reads
// the atomic snapshot so a press racing a disconnect cannot start
// transmission against a dead session (the stream manager's slot lock is
// the final guard). Redundant edges are no-ops because hardware edge
// detectors report noisy transitions. Audio source errors are logged and
// swallowed; indicator errors propagate as fatal hardware failures.

use std::sync::Arc;

use tracing::warn;

use crate::audio::StreamManager;
use crate::error::HardwareError;
use crate::hw::{Indicator, IndicatorController};
use crate::session::SessionState;

pub struct TransmitGate {
    state: Arc<SessionState>,
    indicators: IndicatorController,
    streams: Arc<StreamManager>,
}

impl TransmitGate {
    pub fn new(
        state: Arc<SessionState>,
        indicators: IndicatorController,
        streams: Arc<StreamManager>,
    ) -> Self {
        Self {
            state,
            indicators,
            streams,
        }
    }

    /// Begin transmitting. No-op while disconnected or already transmitting.
    pub async fn start(&self) -> Result<(), HardwareError> {
        if !self.state.is_connected() {
            return Ok(());
        }
        if self.state.transmitting() {
            return Ok(());
        }

        self.state.set_transmitting(true);
        self.indicators.set_on(Indicator::Transmitting)?;

        if let Err(err) = self.streams.start_source().await {
            warn!("Unable to start audio source: {}", err);
        }
        Ok(())
    }

    /// Stop transmitting. No-op while disconnected or not transmitting.
    pub async fn stop(&self) -> Result<(), HardwareError> {
        if !self.state.is_connected() {
            return Ok(());
        }
        if !self.state.transmitting() {
            return Ok(());
        }

        if let Err(err) = self.streams.stop_source().await {
            warn!("Unable to stop audio source: {}", err);
        }
        self.indicators.set_off(Indicator::Transmitting)?;
        self.state.set_transmitting(false);
        Ok(())
    }
}
