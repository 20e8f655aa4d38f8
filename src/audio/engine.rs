// cpal audio engine.
//
// cpal streams are not Send, so every open stream gets a dedicated thread
// that owns them and services gate commands; the object the manager holds
// is just the command side plus the thread handle. Capture is gated twice:
// the input stream is paused between transmissions and the callback drops
// frames while the sending flag is off (pause support varies by backend).
// Playback pulls straight off the session's voice pipe inside the output
// callback, with silence on underrun. Device-native formats on both ends;
// resampling and mixing are out of scope.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::audio::{AudioEngine, AudioStream};
use crate::error::AudioError;
use crate::transport::{SessionHandle, VoiceLink};

/// Device selection for the engine.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Capture device name; `None` uses the system default.
    #[serde(default)]
    pub input_device: Option<String>,
    /// Playback device name; `None` uses the system default.
    #[serde(default)]
    pub output_device: Option<String>,
}

pub struct CpalEngine {
    config: EngineConfig,
}

impl CpalEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl AudioEngine for CpalEngine {
    async fn open_stream(
        &self,
        session: &dyn SessionHandle,
    ) -> Result<Box<dyn AudioStream>, AudioError> {
        let voice = session
            .open_voice()
            .map_err(|err| AudioError::StreamSetup(err.to_string()))?;

        let config = self.config.clone();
        let stream = tokio::task::spawn_blocking(move || CpalStream::open(config, voice))
            .await
            .map_err(|err| AudioError::StreamSetup(err.to_string()))??;

        Ok(Box::new(stream))
    }
}

enum StreamCmd {
    StartSource,
    StopSource,
    Shutdown,
}

struct CpalStream {
    commands: mpsc::Sender<StreamCmd>,
    thread: Option<thread::JoinHandle<()>>,
}

impl CpalStream {
    /// Spin up the audio thread and wait for it to finish device setup.
    fn open(config: EngineConfig, voice: VoiceLink) -> Result<Self, AudioError> {
        let (command_tx, command_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("pressel-audio".into())
            .spawn(move || audio_thread(config, voice, command_rx, ready_tx))
            .map_err(|err| AudioError::StreamSetup(err.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                commands: command_tx,
                thread: Some(thread),
            }),
            Ok(Err(err)) => {
                let _ = thread.join();
                Err(err)
            }
            Err(_) => {
                let _ = thread.join();
                Err(AudioError::StreamSetup(
                    "audio thread died during setup".into(),
                ))
            }
        }
    }
}

impl AudioStream for CpalStream {
    fn start_source(&mut self) -> Result<(), AudioError> {
        self.commands
            .send(StreamCmd::StartSource)
            .map_err(|_| AudioError::StreamClosed)
    }

    fn stop_source(&mut self) -> Result<(), AudioError> {
        self.commands
            .send(StreamCmd::StopSource)
            .map_err(|_| AudioError::StreamClosed)
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        let _ = self.commands.send(StreamCmd::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn audio_thread(
    config: EngineConfig,
    voice: VoiceLink,
    commands: mpsc::Receiver<StreamCmd>,
    ready: mpsc::Sender<Result<(), AudioError>>,
) {
    let sending = Arc::new(AtomicBool::new(false));

    let (input, output) = match build_streams(&config, voice, sending.clone()) {
        Ok(streams) => {
            let _ = ready.send(Ok(()));
            streams
        }
        Err(err) => {
            let _ = ready.send(Err(err));
            return;
        }
    };

    // Playback runs for the life of the stream; capture waits for the gate.
    if let Err(err) = output.play() {
        warn!("Unable to start playback: {}", err);
    }
    if let Err(err) = input.pause() {
        debug!("Capture pause unsupported: {}", err);
    }

    for command in commands.iter() {
        match command {
            StreamCmd::StartSource => {
                sending.store(true, Ordering::SeqCst);
                if let Err(err) = input.play() {
                    warn!("Unable to start capture: {}", err);
                }
            }
            StreamCmd::StopSource => {
                sending.store(false, Ordering::SeqCst);
                if let Err(err) = input.pause() {
                    debug!("Capture pause unsupported: {}", err);
                }
            }
            StreamCmd::Shutdown => break,
        }
    }
    // Streams drop here, releasing the devices.
}

fn build_streams(
    config: &EngineConfig,
    voice: VoiceLink,
    sending: Arc<AtomicBool>,
) -> Result<(cpal::Stream, cpal::Stream), AudioError> {
    let host = cpal::default_host();

    let input_device = match &config.input_device {
        Some(name) => host
            .input_devices()
            .map_err(|err| AudioError::StreamSetup(format!("enumerate input devices: {err}")))?
            .find(|device| device.name().map(|n| n == *name).unwrap_or(false))
            .ok_or_else(|| AudioError::StreamSetup(format!("input device not found: {name}")))?,
        None => host.default_input_device().ok_or(AudioError::NoDevice)?,
    };

    let output_device = match &config.output_device {
        Some(name) => host
            .output_devices()
            .map_err(|err| AudioError::StreamSetup(format!("enumerate output devices: {err}")))?
            .find(|device| device.name().map(|n| n == *name).unwrap_or(false))
            .ok_or_else(|| AudioError::StreamSetup(format!("output device not found: {name}")))?,
        None => host.default_output_device().ok_or(AudioError::NoDevice)?,
    };

    info!(
        "Audio devices: capture {}, playback {}",
        input_device.name().unwrap_or_else(|_| "unknown".into()),
        output_device.name().unwrap_or_else(|_| "unknown".into()),
    );

    let VoiceLink {
        outgoing,
        mut incoming,
    } = voice;

    let input_config = input_device
        .default_input_config()
        .map_err(|err| AudioError::StreamSetup(format!("input config: {err}")))?;
    let capture_config = StreamConfig {
        channels: input_config.channels(),
        sample_rate: input_config.sample_rate(),
        buffer_size: cpal::BufferSize::Default,
    };

    let input = input_device
        .build_input_stream(
            &capture_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if !sending.load(Ordering::SeqCst) {
                    return;
                }
                let mut pcm = Vec::with_capacity(data.len() * 2);
                for sample in data {
                    let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                    pcm.extend_from_slice(&value.to_le_bytes());
                }
                // Session gone or queue full: the frame is droppable.
                let _ = outgoing.try_send(pcm);
            },
            |err| warn!("Capture stream error: {}", err),
            None,
        )
        .map_err(|err| AudioError::StreamSetup(format!("build capture stream: {err}")))?;

    let output_config = output_device
        .default_output_config()
        .map_err(|err| AudioError::StreamSetup(format!("output config: {err}")))?;
    let playback_config = StreamConfig {
        channels: output_config.channels(),
        sample_rate: output_config.sample_rate(),
        buffer_size: cpal::BufferSize::Default,
    };

    let mut pending: VecDeque<f32> = VecDeque::new();
    let output = output_device
        .build_output_stream(
            &playback_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                while pending.len() < data.len() {
                    match incoming.try_recv() {
                        Ok(pcm) => {
                            for frame in pcm.chunks_exact(2) {
                                let value = i16::from_le_bytes([frame[0], frame[1]]);
                                pending.push_back(value as f32 / i16::MAX as f32);
                            }
                        }
                        Err(_) => break,
                    }
                }
                for slot in data.iter_mut() {
                    // Silence on underrun.
                    *slot = pending.pop_front().unwrap_or(0.0);
                }
            },
            |err| warn!("Playback stream error: {}", err),
            None,
        )
        .map_err(|err| AudioError::StreamSetup(format!("build playback stream: {err}")))?;

    Ok((input, output))
}
