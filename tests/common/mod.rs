// Shared fakes for the session core tests.
//
// The transport, audio engine, and indicator panel are replaced with
// in-memory doubles so connection lifecycle, dispatch, and gate behavior
// can be driven deterministically and observed from the outside.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

use pressel::audio::{AudioEngine, AudioStream};
use pressel::error::{AudioError, HardwareError, TransportError};
use pressel::hw::{Indicator, IndicatorPanel, PttEdge, TransmitControl};
use pressel::transport::{
    ChannelId, SessionEvent, SessionHandle, TlsPolicy, Transport, VoiceLink,
};

/// Park the test until every other task is blocked, letting spawned work
/// observe whatever was just sent. Paused-clock runtimes advance through
/// the sleep instantly.
pub async fn settle() {
    sleep(Duration::from_millis(1)).await;
}

/// What the next `dial` call should do.
pub enum DialOutcome {
    Refused,
    Established,
}

/// Observations shared between a `FakeHandle` and the test.
#[derive(Default)]
pub struct HandleLog {
    pub joins: Mutex<Vec<u32>>,
    pub disconnects: AtomicUsize,
    pub voice_opens: AtomicUsize,
    pub fail_join: AtomicBool,
}

pub struct FakeHandle {
    channels: Vec<(String, u32)>,
    log: Arc<HandleLog>,
}

impl FakeHandle {
    pub fn new(channels: Vec<(&str, u32)>) -> Self {
        Self {
            channels: channels
                .into_iter()
                .map(|(name, id)| (name.to_string(), id))
                .collect(),
            log: Arc::new(HandleLog::default()),
        }
    }

    pub fn log(&self) -> Arc<HandleLog> {
        self.log.clone()
    }
}

#[async_trait]
impl SessionHandle for FakeHandle {
    async fn find_channel(&self, name: &str) -> Option<ChannelId> {
        self.channels
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, id)| ChannelId(*id))
    }

    async fn join_channel(&self, channel: ChannelId) -> Result<(), TransportError> {
        if self.log.fail_join.load(Ordering::SeqCst) {
            return Err(TransportError::Protocol("join refused".into()));
        }
        self.log.joins.lock().unwrap().push(channel.0);
        Ok(())
    }

    fn open_voice(&self) -> Result<VoiceLink, TransportError> {
        self.log.voice_opens.fetch_add(1, Ordering::SeqCst);
        let (outgoing, _sink) = mpsc::channel(8);
        let (_source, incoming) = mpsc::channel(8);
        Ok(VoiceLink { outgoing, incoming })
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.log.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakeSession {
    events: Option<mpsc::Sender<SessionEvent>>,
    handle: Arc<HandleLog>,
}

/// Transport double following a scripted sequence of dial outcomes.
/// Established sessions stay observable through their `HandleLog` and an
/// event sender the test feeds.
pub struct FakeTransport {
    script: Mutex<VecDeque<DialOutcome>>,
    sessions: Mutex<Vec<FakeSession>>,
    pub dials: AtomicUsize,
}

impl FakeTransport {
    pub fn new(script: Vec<DialOutcome>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            sessions: Mutex::new(Vec::new()),
            dials: AtomicUsize::new(0),
        })
    }

    pub fn dial_count(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }

    /// Handle observations for the nth established session.
    pub fn handle(&self, index: usize) -> Arc<HandleLog> {
        self.sessions.lock().unwrap()[index].handle.clone()
    }

    /// Feed a session event into the nth established session.
    pub async fn send_event(&self, index: usize, event: SessionEvent) {
        let sender = self.sessions.lock().unwrap()[index]
            .events
            .as_ref()
            .unwrap()
            .clone();
        sender.send(event).await.unwrap();
    }

    /// Drop the nth session's event sender, closing its stream without a
    /// terminal event.
    pub fn close_events(&self, index: usize) {
        self.sessions.lock().unwrap()[index].events.take();
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn dial(
        &self,
        _address: &str,
        _tls: &TlsPolicy,
    ) -> Result<(Box<dyn SessionHandle>, mpsc::Receiver<SessionEvent>), TransportError> {
        self.dials.fetch_add(1, Ordering::SeqCst);

        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(DialOutcome::Refused);
        match outcome {
            DialOutcome::Refused => Err(TransportError::Dial("connection refused".into())),
            DialOutcome::Established => {
                let (event_tx, event_rx) = mpsc::channel(16);
                let handle = FakeHandle::new(vec![("Lobby", 7)]);
                self.sessions.lock().unwrap().push(FakeSession {
                    events: Some(event_tx),
                    handle: handle.log(),
                });
                Ok((Box::new(handle), event_rx))
            }
        }
    }
}

/// Observations shared between the fake audio side and the test, plus the
/// switch that makes the next open fail.
#[derive(Default)]
pub struct AudioLog {
    pub opens: AtomicUsize,
    pub drops: AtomicUsize,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub fail_open: AtomicBool,
}

impl AudioLog {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn drops(&self) -> usize {
        self.drops.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

pub struct FakeEngine {
    log: Arc<AudioLog>,
}

impl FakeEngine {
    pub fn new() -> (Box<Self>, Arc<AudioLog>) {
        let log = Arc::new(AudioLog::default());
        let engine = Box::new(Self { log: log.clone() });
        (engine, log)
    }
}

#[async_trait]
impl AudioEngine for FakeEngine {
    async fn open_stream(
        &self,
        session: &dyn SessionHandle,
    ) -> Result<Box<dyn AudioStream>, AudioError> {
        if self.log.fail_open.load(Ordering::SeqCst) {
            return Err(AudioError::NoDevice);
        }
        session
            .open_voice()
            .map_err(|err| AudioError::StreamSetup(err.to_string()))?;
        self.log.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeStream {
            log: self.log.clone(),
        }))
    }
}

struct FakeStream {
    log: Arc<AudioLog>,
}

impl AudioStream for FakeStream {
    fn start_source(&mut self) -> Result<(), AudioError> {
        self.log.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop_source(&mut self) -> Result<(), AudioError> {
        self.log.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for FakeStream {
    fn drop(&mut self) {
        self.log.drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Panel double recording both the latest state and the write sequence.
#[derive(Default)]
pub struct FakePanel {
    states: Mutex<HashMap<Indicator, bool>>,
    history: Mutex<Vec<(Indicator, bool)>>,
    pub fail: AtomicBool,
}

impl FakePanel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_on(&self, indicator: Indicator) -> bool {
        *self
            .states
            .lock()
            .unwrap()
            .get(&indicator)
            .unwrap_or(&false)
    }

    pub fn history(&self) -> Vec<(Indicator, bool)> {
        self.history.lock().unwrap().clone()
    }
}

impl IndicatorPanel for FakePanel {
    fn set(&self, indicator: Indicator, on: bool) -> Result<(), HardwareError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(HardwareError::Indicator {
                indicator,
                detail: "unwritable".into(),
            });
        }
        self.states.lock().unwrap().insert(indicator, on);
        self.history.lock().unwrap().push((indicator, on));
        Ok(())
    }
}

/// Control double that hands its edge sender back to the test.
pub struct FakeControl {
    slot: Arc<Mutex<Option<mpsc::Sender<PttEdge>>>>,
}

impl FakeControl {
    pub fn new() -> (Box<Self>, Arc<Mutex<Option<mpsc::Sender<PttEdge>>>>) {
        let slot = Arc::new(Mutex::new(None));
        let control = Box::new(Self { slot: slot.clone() });
        (control, slot)
    }
}

impl TransmitControl for FakeControl {
    fn listen(self: Box<Self>, edges: mpsc::Sender<PttEdge>) -> Result<(), HardwareError> {
        *self.slot.lock().unwrap() = Some(edges);
        Ok(())
    }
}
