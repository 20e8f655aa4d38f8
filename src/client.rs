// Client facade: assembles the components and runs them.
//
// The gate runs as its own task so button handling never waits on event
// dispatch; fatal hardware errors cross over to the supervisor on its
// command channel.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::error;

use crate::audio::{AudioEngine, StreamManager};
use crate::error::{ClientError, HardwareError};
use crate::hw::{IndicatorController, IndicatorPanel, PttEdge, TransmitControl};
use crate::session::{Command, ConnectionSupervisor, SessionConfig, SessionState};
use crate::transmit::TransmitGate;
use crate::transport::Transport;

pub struct Client {
    supervisor: ConnectionSupervisor,
    state: Arc<SessionState>,
    gate_task: JoinHandle<()>,
}

impl Client {
    pub fn new(
        config: SessionConfig,
        transport: Arc<dyn Transport>,
        engine: Box<dyn AudioEngine>,
        panel: Arc<dyn IndicatorPanel>,
        control: Box<dyn TransmitControl>,
    ) -> Result<Self, ClientError> {
        let state = Arc::new(SessionState::new());
        let indicators = IndicatorController::new(panel);
        let streams = Arc::new(StreamManager::new(engine));

        let (command_tx, command_rx) = mpsc::channel(8);
        let (edge_tx, edge_rx) = mpsc::channel(16);

        control.listen(edge_tx)?;

        let gate = TransmitGate::new(state.clone(), indicators.clone(), streams.clone());
        let gate_task = tokio::spawn(drive_gate(edge_rx, gate, command_tx.clone()));

        let supervisor = ConnectionSupervisor::new(
            config,
            state.clone(),
            transport,
            streams,
            indicators,
            command_rx,
            command_tx,
        );

        Ok(Self {
            supervisor,
            state,
            gate_task,
        })
    }

    /// Shared session context, for observation.
    pub fn state(&self) -> Arc<SessionState> {
        self.state.clone()
    }

    /// Run until a fatal condition. See `ConnectionSupervisor::run`.
    pub async fn run(self) -> Result<(), ClientError> {
        let result = self.supervisor.run().await;
        self.gate_task.abort();
        result
    }
}

/// Feed control-input edges into the gate. A closed edge channel means the
/// input listener died, which leaves the device deaf to its button: fatal.
async fn drive_gate(
    mut edges: mpsc::Receiver<PttEdge>,
    gate: TransmitGate,
    commands: mpsc::Sender<Command>,
) {
    while let Some(edge) = edges.recv().await {
        let result = match edge {
            PttEdge::Pressed => gate.start().await,
            PttEdge::Released => gate.stop().await,
        };

        if let Err(err) = result {
            error!("Transmit gate hardware failure: {}", err);
            let _ = commands.send(Command::Fatal(err.into())).await;
            return;
        }
    }

    error!("Transmit control input closed");
    let _ = commands
        .send(Command::Fatal(HardwareError::InputClosed.into()))
        .await;
}
