use crate::error::SessionError;
use crate::session::{CandidateQueue, SessionCommand, SessionEvents, SessionHandle};
use crate::signaling::SignalingChannel;
use crate::transport::{PeerTransport, TransportConfig, TransportEvent};
use periscope_core::{
    CandidateInit, ConnectionPhase, Role, SessionDescription, SessionId, SignalMessage,
};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

pub struct SessionConfig {
    pub session_id: SessionId,
    pub role: Role,
    pub transport: TransportConfig,
    /// Local tracks to attach before the offer is created. Broadcasters
    /// fill this; viewers leave it empty.
    pub tracks: Vec<Arc<dyn webrtc::track::track_local::TrackLocal + Send + Sync>>,
}

/// Drives exactly one peer-to-peer connection attempt to completion.
///
/// All state (phase, descriptions, candidate queue) is owned by a single
/// task: inbound signaling, transport events and commands are serialized
/// through one `select!` loop, so a second inbound message is never
/// processed while a description operation is still in flight.
pub struct NegotiationSession {
    role: Role,
    topic: String,
    transport: PeerTransport,
    channel: Arc<dyn SignalingChannel>,
    events: Arc<dyn SessionEvents>,
    phase: ConnectionPhase,
    phase_tx: watch::Sender<ConnectionPhase>,
    has_remote_description: bool,
    queue: CandidateQueue,
    /// Hands candidates to the applier task in order without blocking
    /// the loop on each add.
    applier_tx: mpsc::UnboundedSender<CandidateInit>,
    command_rx: mpsc::Receiver<SessionCommand>,
    inbound_rx: mpsc::UnboundedReceiver<SignalMessage>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    deadline: Instant,
}

impl NegotiationSession {
    /// Build the transport, perform the role's opening move and spawn
    /// the event loop. Transport construction failures propagate to the
    /// caller and are not retried.
    pub async fn start(
        config: SessionConfig,
        channel: Arc<dyn SignalingChannel>,
        events: Arc<dyn SessionEvents>,
    ) -> Result<SessionHandle, SessionError> {
        let (transport_tx, transport_rx) = mpsc::channel(256);
        let transport = PeerTransport::new(&config.transport, transport_tx).await?;

        for track in config.tracks {
            transport.add_track(track).await?;
        }

        let topic = config.session_id.topic();
        let inbound_rx = channel.subscribe(&topic).await?;

        let (command_tx, command_rx) = mpsc::channel(8);
        let (phase_tx, phase_rx) = watch::channel(ConnectionPhase::Idle);
        let (applier_tx, applier_rx) = mpsc::unbounded_channel();
        spawn_candidate_applier(transport.clone(), applier_rx);

        let mut session = Self {
            role: config.role,
            topic,
            transport,
            channel,
            events,
            phase: ConnectionPhase::Idle,
            phase_tx,
            has_remote_description: false,
            queue: CandidateQueue::new(),
            applier_tx,
            command_rx,
            inbound_rx,
            transport_rx,
            deadline: Instant::now() + config.transport.negotiation_timeout,
        };

        // The broadcaster opens; the viewer stays idle until an offer
        // arrives. The loop is not running yet, so failures here still
        // propagate to the caller.
        if session.role == Role::Broadcaster {
            let offer = session.transport.create_offer().await?;
            session
                .channel
                .publish(&session.topic, SignalMessage::Offer { offer })
                .await?;
            session.set_phase(ConnectionPhase::OfferSent).await;
        }

        tokio::spawn(session.run());

        Ok(SessionHandle {
            command_tx,
            phase_rx,
        })
    }

    async fn run(mut self) {
        info!(role = ?self.role, topic = %self.topic, "negotiation session started");

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    // None means every handle was dropped: same as Stop.
                    match cmd {
                        Some(SessionCommand::Stop) | None => {
                            self.shutdown().await;
                            break;
                        }
                    }
                }

                msg = self.inbound_rx.recv() => {
                    match msg {
                        Some(m) => self.handle_signal(m).await,
                        None => {
                            warn!(topic = %self.topic, "signaling channel closed");
                            self.shutdown().await;
                            break;
                        }
                    }
                }

                evt = self.transport_rx.recv() => {
                    match evt {
                        Some(e) => self.handle_transport_event(e).await,
                        None => {
                            warn!(topic = %self.topic, "transport event channel closed");
                            self.shutdown().await;
                            break;
                        }
                    }
                }

                _ = tokio::time::sleep_until(self.deadline), if !self.negotiation_settled() => {
                    warn!(topic = %self.topic, phase = %self.phase, "negotiation timed out");
                    self.set_phase(ConnectionPhase::Failed).await;
                }
            }
        }

        info!(topic = %self.topic, "negotiation session finished");
    }

    fn negotiation_settled(&self) -> bool {
        self.phase == ConnectionPhase::Connected || self.phase.is_terminal()
    }

    async fn handle_signal(&mut self, msg: SignalMessage) {
        // Stale traffic after failure or teardown.
        if self.phase.is_terminal() {
            return;
        }

        match msg {
            SignalMessage::Offer { offer } => self.handle_offer(offer).await,
            SignalMessage::Answer { answer } => self.handle_answer(answer).await,
            SignalMessage::IceCandidate { candidate } => self.handle_candidate(candidate),
        }
    }

    async fn handle_offer(&mut self, offer: SessionDescription) {
        // The topic is a broadcast medium: a broadcaster seeing an offer
        // is seeing its own echo.
        if self.role != Role::Viewer {
            debug!(topic = %self.topic, "ignoring offer on broadcaster side");
            return;
        }
        if self.has_remote_description {
            debug!(topic = %self.topic, "duplicate offer after negotiation, ignoring");
            return;
        }

        self.set_phase(ConnectionPhase::OfferReceived).await;

        if let Err(e) = self.apply_remote_description(&offer).await {
            self.fail(e).await;
            return;
        }

        let answer = match self.transport.create_answer().await {
            Ok(answer) => answer,
            Err(e) => {
                self.fail(e).await;
                return;
            }
        };

        if let Err(e) = self
            .channel
            .publish(&self.topic, SignalMessage::Answer { answer })
            .await
        {
            self.fail(SessionError::Channel(e)).await;
            return;
        }

        self.set_phase(ConnectionPhase::AnswerSent).await;
    }

    async fn handle_answer(&mut self, answer: SessionDescription) {
        if self.role != Role::Broadcaster {
            debug!(topic = %self.topic, "ignoring answer on viewer side");
            return;
        }
        // An answer is only meaningful while our offer is outstanding;
        // anything else is an echo or a stale message.
        if self.phase != ConnectionPhase::OfferSent {
            debug!(topic = %self.topic, phase = %self.phase, "ignoring answer outside offer_sent");
            return;
        }

        if let Err(e) = self.apply_remote_description(&answer).await {
            self.fail(e).await;
            return;
        }

        self.set_phase(ConnectionPhase::AnswerReceived).await;
    }

    /// Set the remote description and release any buffered candidates,
    /// in arrival order, into the applier.
    async fn apply_remote_description(
        &mut self,
        description: &SessionDescription,
    ) -> Result<(), SessionError> {
        self.transport.set_remote_description(description).await?;
        self.has_remote_description = true;

        let buffered = self.queue.drain_if_ready(true);
        if !buffered.is_empty() {
            debug!(topic = %self.topic, count = buffered.len(), "draining buffered candidates");
        }
        for candidate in buffered {
            let _ = self.applier_tx.send(candidate);
        }
        Ok(())
    }

    fn handle_candidate(&mut self, candidate: CandidateInit) {
        if self.has_remote_description {
            let _ = self.applier_tx.send(candidate);
        } else {
            self.queue.enqueue(candidate);
        }
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::CandidateDiscovered(candidate) => {
                if self.phase.is_terminal() {
                    return;
                }
                // Published unconditionally; the receiving side owns the
                // buffering.
                if let Err(e) = self
                    .channel
                    .publish(&self.topic, SignalMessage::IceCandidate { candidate })
                    .await
                {
                    warn!(topic = %self.topic, error = %e, "failed to publish local candidate");
                }
            }

            TransportEvent::TrackReceived(track) => {
                self.events.on_remote_track(track).await;
            }

            TransportEvent::StateChanged(state) => match state {
                RTCPeerConnectionState::Connected => {
                    self.set_phase(ConnectionPhase::Connected).await;
                }
                RTCPeerConnectionState::Failed | RTCPeerConnectionState::Disconnected => {
                    // No automatic reconnection: the driver decides.
                    self.set_phase(ConnectionPhase::Failed).await;
                }
                RTCPeerConnectionState::Closed => {
                    self.set_phase(ConnectionPhase::Closed).await;
                }
                _ => {}
            },
        }
    }

    async fn set_phase(&mut self, next: ConnectionPhase) {
        if !self.phase.can_advance_to(next) {
            return;
        }
        debug!(topic = %self.topic, from = %self.phase, to = %next, "phase transition");
        self.phase = next;
        let _ = self.phase_tx.send(next);
        self.events.on_phase(next).await;
    }

    async fn fail(&mut self, err: SessionError) {
        error!(topic = %self.topic, error = %err, "negotiation failed");
        self.events.on_error(err).await;
        self.set_phase(ConnectionPhase::Failed).await;
    }

    async fn shutdown(&mut self) {
        self.transport.close().await;
        self.queue.clear();
        self.channel.unsubscribe(&self.topic).await;
        // A session that already failed keeps its terminal phase.
        self.set_phase(ConnectionPhase::Closed).await;
    }
}

/// Applies remote candidates one at a time, in the order they were
/// handed over. A bad candidate is logged and skipped: ICE tolerates
/// some invalid candidates, so none of them may abort negotiation.
fn spawn_candidate_applier(
    transport: PeerTransport,
    mut rx: mpsc::UnboundedReceiver<CandidateInit>,
) {
    tokio::spawn(async move {
        while let Some(candidate) = rx.recv().await {
            if let Err(e) = transport.add_ice_candidate(candidate).await {
                warn!(error = %e, "failed to apply remote candidate, continuing");
            }
        }
    });
}
