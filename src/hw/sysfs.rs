// Linux LED-class indicator panel.
//
// Each indicator maps to a sysfs brightness path
// (/sys/class/leds/<name>/brightness); driving one writes "1" or "0".
// A write failure is a fatal hardware error for the device.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::HardwareError;
use crate::hw::{Indicator, IndicatorPanel};

/// Brightness paths for the three indicators.
#[derive(Debug, Clone, Deserialize)]
pub struct PanelConfig {
    pub online: PathBuf,
    pub participants: PathBuf,
    pub transmitting: PathBuf,
}

pub struct SysfsPanel {
    config: PanelConfig,
}

impl SysfsPanel {
    pub fn new(config: PanelConfig) -> Self {
        Self { config }
    }

    fn path(&self, indicator: Indicator) -> &PathBuf {
        match indicator {
            Indicator::Online => &self.config.online,
            Indicator::Participants => &self.config.participants,
            Indicator::Transmitting => &self.config.transmitting,
        }
    }
}

impl IndicatorPanel for SysfsPanel {
    fn set(&self, indicator: Indicator, on: bool) -> Result<(), HardwareError> {
        let value = if on { "1" } else { "0" };
        fs::write(self.path(indicator), value).map_err(|err| HardwareError::Indicator {
            indicator,
            detail: err.to_string(),
        })
    }
}
