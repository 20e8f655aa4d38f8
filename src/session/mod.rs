//! Session lifecycle
//!
//! The heart of the device: the `ConnectionSupervisor` owns the reconnect
//! state machine, the `EventDispatcher` consumes the transport's event
//! stream, and `SessionState` is the shared context both write and the
//! transmit gate reads.

mod dispatch;
mod state;
mod supervisor;

pub use dispatch::{Dispatch, EventDispatcher};
pub use state::{LinkState, SessionState};
pub use supervisor::{
    Command, ConnectionSupervisor, SessionConfig, MAX_CONNECT_ATTEMPTS, RECONNECT_DELAY,
};
