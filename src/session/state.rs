// Shared session context.
//
// One object carries the cross-component mutable state: link state, the
// transmit flag, the connect-attempt counter, and the current channel name.
// The supervisor and dispatcher write link/attempts/channel; the transmit
// gate writes only the transmit flag. Fields are atomics (the gate runs off
// the hardware input task, concurrent with event dispatch).

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::Mutex;

/// Connection display state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LinkState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
}

impl LinkState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => LinkState::Connecting,
            2 => LinkState::Connected,
            _ => LinkState::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, LinkState::Connected)
    }
}

#[derive(Debug, Default)]
pub struct SessionState {
    link: AtomicU8,
    transmitting: AtomicBool,
    connect_attempts: AtomicU32,
    channel: Mutex<Option<String>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link(&self) -> LinkState {
        LinkState::from_u8(self.link.load(Ordering::SeqCst))
    }

    pub fn set_link(&self, state: LinkState) {
        self.link.store(state as u8, Ordering::SeqCst);
    }

    pub fn is_connected(&self) -> bool {
        self.link().is_connected()
    }

    pub fn transmitting(&self) -> bool {
        self.transmitting.load(Ordering::SeqCst)
    }

    pub fn set_transmitting(&self, on: bool) {
        self.transmitting.store(on, Ordering::SeqCst);
    }

    /// Count a new connect attempt and return its number (1-based).
    ///
    /// The counter only grows for the lifetime of the process; a successful
    /// connection does not reset it.
    pub fn begin_attempt(&self) -> u32 {
        self.connect_attempts.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn connect_attempts(&self) -> u32 {
        self.connect_attempts.load(Ordering::SeqCst)
    }

    pub fn current_channel(&self) -> Option<String> {
        self.channel.lock().unwrap().clone()
    }

    pub fn set_current_channel(&self, name: Option<String>) {
        *self.channel.lock().unwrap() = name;
    }
}
