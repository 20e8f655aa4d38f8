// Connection supervision: bounded reconnect with fixed backoff.
//
// One select loop over the active session's events and an internal command
// channel. Dial failures and mid-session disconnects both land in
// schedule_retry; the retry timer is a spawned task whose handle stays on
// the supervisor so shutdown can abort it. Reaching the attempt limit
// without a success is terminal for the process.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

use crate::audio::StreamManager;
use crate::error::ClientError;
use crate::hw::IndicatorController;
use crate::session::dispatch::{Dispatch, EventDispatcher};
use crate::session::state::{LinkState, SessionState};
use crate::transport::{DisconnectCause, SessionEvent, SessionHandle, TlsPolicy, Transport};

/// Give up for good after this many failed attempts.
pub const MAX_CONNECT_ATTEMPTS: u32 = 5;

/// Fixed pause between attempts.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(10);

/// Instructions arriving from outside the event stream.
#[derive(Debug)]
pub enum Command {
    /// The retry timer fired; dial again.
    Reconnect,
    /// A component off the event loop hit an unrecoverable error.
    Fatal(ClientError),
}

/// Connection settings the supervisor dials with.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Server address, host:port.
    pub address: String,
    /// Channel to join once connected.
    pub channel: Option<String>,
    pub tls: TlsPolicy,
}

struct ActiveSession {
    handle: Box<dyn SessionHandle>,
    events: mpsc::Receiver<SessionEvent>,
}

enum Wake {
    Session(Option<SessionEvent>),
    Control(Option<Command>),
}

pub struct ConnectionSupervisor {
    config: SessionConfig,
    state: Arc<SessionState>,
    transport: Arc<dyn Transport>,
    streams: Arc<StreamManager>,
    dispatcher: EventDispatcher,
    commands: mpsc::Receiver<Command>,
    command_tx: mpsc::Sender<Command>,
    retry_timer: Option<JoinHandle<()>>,
    active: Option<ActiveSession>,
}

impl ConnectionSupervisor {
    pub fn new(
        config: SessionConfig,
        state: Arc<SessionState>,
        transport: Arc<dyn Transport>,
        streams: Arc<StreamManager>,
        indicators: IndicatorController,
        commands: mpsc::Receiver<Command>,
        command_tx: mpsc::Sender<Command>,
    ) -> Self {
        let dispatcher = EventDispatcher::new(
            state.clone(),
            indicators,
            config.address.clone(),
            config.channel.clone(),
        );

        Self {
            config,
            state,
            transport,
            streams,
            dispatcher,
            commands,
            command_tx,
            retry_timer: None,
            active: None,
        }
    }

    /// Drive the session until a fatal condition.
    ///
    /// The `Ok` exit exists only for the command channel closing, which
    /// cannot happen while the supervisor holds a sender of its own; in
    /// practice this runs until retry exhaustion or a fatal component
    /// error, and the binary maps the error to exit status 1.
    pub async fn run(mut self) -> Result<(), ClientError> {
        self.connect().await?;

        loop {
            match self.next_wake().await {
                Wake::Session(Some(event)) => self.on_session_event(event).await?,
                Wake::Session(None) => {
                    // Transport dropped its sender without a terminal event.
                    warn!("Session event stream ended without a disconnect event");
                    self.on_session_event(SessionEvent::Disconnected {
                        cause: DisconnectCause::Error,
                    })
                    .await?;
                }
                Wake::Control(Some(Command::Reconnect)) => self.connect().await?,
                Wake::Control(Some(Command::Fatal(err))) => return Err(err),
                Wake::Control(None) => return Ok(()),
            }
        }
    }

    async fn next_wake(&mut self) -> Wake {
        match self.active.as_mut() {
            Some(active) => tokio::select! {
                event = active.events.recv() => Wake::Session(event),
                command = self.commands.recv() => Wake::Control(command),
            },
            None => Wake::Control(self.commands.recv().await),
        }
    }

    async fn on_session_event(&mut self, event: SessionEvent) -> Result<(), ClientError> {
        let outcome = match &self.active {
            Some(active) => {
                self.dispatcher
                    .dispatch(event, active.handle.as_ref())
                    .await?
            }
            None => return Ok(()),
        };

        match outcome {
            Dispatch::Continue => Ok(()),
            Dispatch::Disconnected => self.reconnect().await,
        }
    }

    /// Dial the server, counting the attempt. On success the audio stream
    /// opens immediately; on failure the retry path takes over.
    async fn connect(&mut self) -> Result<(), ClientError> {
        self.retry_timer.take();

        let attempt = self.state.begin_attempt();
        self.state.set_link(LinkState::Connecting);
        info!("Connecting to {} (attempt {})", self.config.address, attempt);

        match self
            .transport
            .dial(&self.config.address, &self.config.tls)
            .await
        {
            Ok((handle, events)) => {
                // Audio is essential to the device; a failed open forfeits
                // the session outright.
                self.streams.open(handle.as_ref()).await?;
                self.active = Some(ActiveSession { handle, events });
                Ok(())
            }
            Err(err) => {
                warn!(
                    "Connection to {} failed ({}), attempting again in {} seconds...",
                    self.config.address,
                    err,
                    RECONNECT_DELAY.as_secs()
                );
                self.schedule_retry()
            }
        }
    }

    /// Tear down whatever remains of the current session, then hand over
    /// to the retry path.
    async fn reconnect(&mut self) -> Result<(), ClientError> {
        if let Some(active) = self.active.take() {
            self.streams.close().await;
            if let Err(err) = active.handle.disconnect().await {
                debug!("Session goodbye failed: {}", err);
            }
        }
        self.schedule_retry()
    }

    /// Schedule the next attempt, or give up once the limit is reached.
    /// The timer runs detached so nothing here blocks; its handle is kept
    /// for cancellation.
    fn schedule_retry(&mut self) -> Result<(), ClientError> {
        let attempts = self.state.connect_attempts();
        if attempts >= MAX_CONNECT_ATTEMPTS {
            return Err(ClientError::RetriesExhausted {
                address: self.config.address.clone(),
                attempts,
            });
        }

        let commands = self.command_tx.clone();
        self.retry_timer = Some(tokio::spawn(async move {
            sleep(RECONNECT_DELAY).await;
            let _ = commands.send(Command::Reconnect).await;
        }));
        Ok(())
    }
}

impl Drop for ConnectionSupervisor {
    fn drop(&mut self) {
        // A pending retry must not outlive its supervisor.
        if let Some(timer) = self.retry_timer.take() {
            timer.abort();
        }
    }
}
