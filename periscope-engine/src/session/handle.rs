use crate::session::SessionCommand;
use periscope_core::ConnectionPhase;
use tokio::sync::{mpsc, watch};

/// Owning handle to a spawned negotiation session.
#[derive(Clone)]
pub struct SessionHandle {
    pub(crate) command_tx: mpsc::Sender<SessionCommand>,
    pub(crate) phase_rx: watch::Receiver<ConnectionPhase>,
}

impl SessionHandle {
    /// Stop the session. Idempotent: once the session task is gone the
    /// command is silently dropped.
    pub async fn stop(&self) {
        let _ = self.command_tx.send(SessionCommand::Stop).await;
    }

    pub fn phase(&self) -> ConnectionPhase {
        *self.phase_rx.borrow()
    }

    /// Watch channel for phase transitions, for callers that want to
    /// await a particular state.
    pub fn phase_watch(&self) -> watch::Receiver<ConnectionPhase> {
        self.phase_rx.clone()
    }
}
