// Push-to-talk input via evdev.
//
// A blocking reader thread on the configured /dev/input device. Key value
// 1 is a press, 0 a release; autorepeat is ignored. Edges flow to the gate
// task over the channel; if the device read fails the thread exits and the
// closed channel surfaces as a fatal hardware error downstream.

use std::path::PathBuf;
use std::thread;

use evdev::{Device, InputEventKind, Key};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::error::HardwareError;
use crate::hw::{PttEdge, TransmitControl};

pub struct EvdevControl {
    device: PathBuf,
    key: Key,
}

impl EvdevControl {
    pub fn new(device: impl Into<PathBuf>, key_code: u16) -> Self {
        Self {
            device: device.into(),
            key: Key::new(key_code),
        }
    }
}

impl TransmitControl for EvdevControl {
    fn listen(self: Box<Self>, edges: mpsc::Sender<PttEdge>) -> Result<(), HardwareError> {
        let mut device = Device::open(&self.device)
            .map_err(|err| HardwareError::Input(format!("{}: {}", self.device.display(), err)))?;

        info!(
            "Transmit control on {} ({:?})",
            self.device.display(),
            self.key
        );

        thread::Builder::new()
            .name("pressel-ptt".into())
            .spawn(move || loop {
                let events = match device.fetch_events() {
                    Ok(events) => events,
                    Err(err) => {
                        error!("Transmit control read failed: {}", err);
                        return;
                    }
                };

                for event in events {
                    if event.kind() != InputEventKind::Key(self.key) {
                        continue;
                    }
                    let edge = match event.value() {
                        1 => PttEdge::Pressed,
                        0 => PttEdge::Released,
                        _ => continue, // autorepeat
                    };
                    if edges.blocking_send(edge).is_err() {
                        return;
                    }
                }
            })
            .map_err(|err| HardwareError::Input(err.to_string()))?;

        Ok(())
    }
}
