use anyhow::Result;
use serde::Deserialize;

use crate::audio::engine::EngineConfig;
use crate::hw::sysfs::PanelConfig;
use crate::transport::TlsPolicy;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub audio: EngineConfig,
    pub hardware: HardwareConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Server address, host:port.
    pub address: String,
    pub username: String,
    /// Channel to join after connecting.
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub tls: TlsPolicy,
}

#[derive(Debug, Deserialize)]
pub struct HardwareConfig {
    /// Indicator brightness paths, one per LED.
    pub leds: PanelConfig,
    /// Input device carrying the push-to-talk button.
    pub ptt_device: String,
    /// evdev key code the button reports (e.g. 256 for BTN_0).
    pub ptt_key_code: u16,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
