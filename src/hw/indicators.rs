// Indicator controller: projection of session state onto the panel.
//
// Stateless beyond the hardware output itself. No retries; an output that
// cannot be driven is a fatal hardware error for the device.

use std::sync::Arc;

use tracing::debug;

use crate::error::HardwareError;
use crate::hw::{Indicator, IndicatorPanel};

#[derive(Clone)]
pub struct IndicatorController {
    panel: Arc<dyn IndicatorPanel>,
}

impl IndicatorController {
    pub fn new(panel: Arc<dyn IndicatorPanel>) -> Self {
        Self { panel }
    }

    pub fn set_on(&self, indicator: Indicator) -> Result<(), HardwareError> {
        debug!("Indicator {} on", indicator);
        self.panel.set(indicator, true)
    }

    pub fn set_off(&self, indicator: Indicator) -> Result<(), HardwareError> {
        debug!("Indicator {} off", indicator);
        self.panel.set(indicator, false)
    }

    /// Turn every indicator off. Used on disconnect teardown.
    pub fn all_off(&self) -> Result<(), HardwareError> {
        for indicator in Indicator::ALL {
            self.panel.set(indicator, false)?;
        }
        Ok(())
    }
}
