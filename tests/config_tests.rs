// Unit tests for configuration loading
//
// These tests write TOML files into a temporary directory and verify the
// required fields, the defaults, and the failure on a missing file.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use tempfile::TempDir;

use pressel::Config;

fn write_config(dir: &TempDir, contents: &str) -> Result<String> {
    let path = dir.path().join("pressel.toml");
    fs::write(&path, contents)?;
    let stem = dir.path().join("pressel");
    Ok(stem.to_str().unwrap().to_string())
}

#[test]
fn test_config_loads_full_file() -> Result<()> {
    let dir = TempDir::new()?;
    let stem = write_config(
        &dir,
        r#"
[server]
address = "voice.example.com:8443"
username = "porch-unit"
channel = "Lobby"

[server.tls]
insecure = true

[audio]
input_device = "USB Audio Device"

[hardware]
ptt_device = "/dev/input/event3"
ptt_key_code = 256

[hardware.leds]
online = "/sys/class/leds/led0/brightness"
participants = "/sys/class/leds/led1/brightness"
transmitting = "/sys/class/leds/led2/brightness"
"#,
    )?;

    let config = Config::load(&stem)?;

    assert_eq!(config.server.address, "voice.example.com:8443");
    assert_eq!(config.server.username, "porch-unit");
    assert_eq!(config.server.channel.as_deref(), Some("Lobby"));
    assert!(config.server.tls.insecure);
    assert_eq!(config.audio.input_device.as_deref(), Some("USB Audio Device"));
    assert_eq!(config.audio.output_device, None);
    assert_eq!(config.hardware.ptt_device, "/dev/input/event3");
    assert_eq!(config.hardware.ptt_key_code, 256);
    assert_eq!(
        config.hardware.leds.online,
        PathBuf::from("/sys/class/leds/led0/brightness")
    );
    Ok(())
}

#[test]
fn test_config_defaults_for_optional_sections() -> Result<()> {
    let dir = TempDir::new()?;
    let stem = write_config(
        &dir,
        r#"
[server]
address = "voice.example.com:8443"
username = "porch-unit"

[hardware]
ptt_device = "/dev/input/event0"
ptt_key_code = 256

[hardware.leds]
online = "led0"
participants = "led1"
transmitting = "led2"
"#,
    )?;

    let config = Config::load(&stem)?;

    assert_eq!(config.server.channel, None);
    assert!(!config.server.tls.insecure);
    assert_eq!(config.audio.input_device, None);
    assert_eq!(config.audio.output_device, None);
    Ok(())
}

#[test]
fn test_config_missing_file_errors() {
    let dir = TempDir::new().unwrap();
    let stem = dir.path().join("absent");

    assert!(Config::load(stem.to_str().unwrap()).is_err());
}
