//! Hardware I/O boundary
//!
//! The device exposes three on/off indicators and one transmit control
//! input. Both sides are traits so the session core can run against fakes;
//! the real adapters (`SysfsPanel`, `EvdevControl`) live alongside.

use std::fmt;

use tokio::sync::mpsc;

use crate::error::HardwareError;

pub mod indicators;
pub mod sysfs;

#[cfg(target_os = "linux")]
pub mod evdev;

pub use indicators::IndicatorController;
pub use sysfs::SysfsPanel;

#[cfg(target_os = "linux")]
pub use evdev::EvdevControl;

/// The three device indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    Online,
    Participants,
    Transmitting,
}

impl Indicator {
    pub const ALL: [Indicator; 3] = [
        Indicator::Online,
        Indicator::Participants,
        Indicator::Transmitting,
    ];
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Indicator::Online => "online",
            Indicator::Participants => "participants",
            Indicator::Transmitting => "transmitting",
        };
        f.write_str(name)
    }
}

/// Edge transition reported by the transmit control input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PttEdge {
    Pressed,
    Released,
}

/// Set of on/off outputs behind the indicator controller.
pub trait IndicatorPanel: Send + Sync {
    fn set(&self, indicator: Indicator, on: bool) -> Result<(), HardwareError>;
}

/// Edge-triggered transmit control input.
///
/// `listen` consumes the control and starts whatever listener it needs
/// (typically a blocking reader thread); edges arrive on the provided
/// channel. Dropping the sender ends the listener's usefulness, so the
/// receiving side treats a closed channel as a dead control.
pub trait TransmitControl: Send {
    fn listen(self: Box<Self>, edges: mpsc::Sender<PttEdge>) -> Result<(), HardwareError>;
}
