// Session event dispatch.
//
// Sole consumer of the transport's event stream; one exhaustive match over
// the closed event set. State and indicator transitions happen here; the
// supervisor acts on the returned outcome for everything that touches the
// connection lifecycle.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::HardwareError;
use crate::hw::{Indicator, IndicatorController};
use crate::session::state::{LinkState, SessionState};
use crate::session::supervisor::RECONNECT_DELAY;
use crate::text::sanitize;
use crate::transport::{SessionEvent, SessionHandle};

/// What the supervisor should do once an event has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Keep consuming events.
    Continue,
    /// The session ended; tear down and schedule a reconnect.
    Disconnected,
}

pub struct EventDispatcher {
    state: Arc<SessionState>,
    indicators: IndicatorController,
    address: String,
    channel: Option<String>,
}

impl EventDispatcher {
    pub fn new(
        state: Arc<SessionState>,
        indicators: IndicatorController,
        address: String,
        channel: Option<String>,
    ) -> Self {
        Self {
            state,
            indicators,
            address,
            channel,
        }
    }

    pub async fn dispatch(
        &self,
        event: SessionEvent,
        handle: &dyn SessionHandle,
    ) -> Result<Dispatch, HardwareError> {
        match event {
            SessionEvent::Connected { welcome } => {
                self.state.set_link(LinkState::Connected);
                self.indicators.set_on(Indicator::Online)?;

                info!(
                    "Connected to {} ({})",
                    self.address,
                    self.state.connect_attempts()
                );

                if let Some(text) = welcome {
                    info!("Welcome message: {}", sanitize(&text));
                }

                if let Some(name) = &self.channel {
                    self.join_channel(handle, name).await;
                }
                Ok(Dispatch::Continue)
            }

            SessionEvent::Disconnected { cause } => {
                self.state.set_link(LinkState::Disconnected);
                self.state.set_transmitting(false);
                self.indicators.all_off()?;

                match cause.label() {
                    Some(reason) => info!(
                        "Connection to {} disconnected ({}), attempting again in {} seconds...",
                        self.address,
                        reason,
                        RECONNECT_DELAY.as_secs()
                    ),
                    None => info!(
                        "Connection to {} disconnected, attempting again in {} seconds...",
                        self.address,
                        RECONNECT_DELAY.as_secs()
                    ),
                }
                Ok(Dispatch::Disconnected)
            }

            SessionEvent::UserChange {
                user,
                kind,
                users_in_channel,
            } => {
                // More than just ourselves in the channel lights the
                // participants indicator.
                if users_in_channel > 1 {
                    self.indicators.set_on(Indicator::Participants)?;
                } else {
                    self.indicators.set_off(Indicator::Participants)?;
                }

                info!("Change event for {}: {}", user, kind.label());
                Ok(Dispatch::Continue)
            }

            SessionEvent::TextMessage { from, body } => {
                let sender = from.as_deref().unwrap_or("server");
                info!("Message from {}: {}", sender, sanitize(&body).trim());
                Ok(Dispatch::Continue)
            }

            SessionEvent::PermissionDenied { reason } => {
                info!("Permission denied: {}", reason.label());
                Ok(Dispatch::Continue)
            }

            // Reserved kinds: accepted, nothing to update yet.
            SessionEvent::ChannelChange
            | SessionEvent::UserList
            | SessionEvent::Acl
            | SessionEvent::BanList
            | SessionEvent::ContextAction
            | SessionEvent::ServerConfig => Ok(Dispatch::Continue),
        }
    }

    /// Find the configured channel by name and move into it. A missing
    /// channel or a refused move is reported and otherwise ignored.
    async fn join_channel(&self, handle: &dyn SessionHandle, name: &str) {
        match handle.find_channel(name).await {
            Some(channel) => {
                if let Err(err) = handle.join_channel(channel).await {
                    warn!("Unable to join channel {}: {}", name, err);
                } else {
                    self.state.set_current_channel(Some(name.to_string()));
                }
            }
            None => warn!("Unable to find channel: {}", name),
        }
    }
}
