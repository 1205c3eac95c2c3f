//! # Orchestrator Actor
//!
//! Owns an [`Orchestrator`] inside one Tokio task. Control requests arrive on
//! an mpsc channel and are processed sequentially, interleaved with ticks from
//! a `tokio::time::interval`. Registration, status mutation and message
//! enqueue can come from any number of tasks, yet the tables are only ever
//! touched by this loop, so no locks are needed.
//!
//! ```rust
//! use orchestrator_core::{ComponentSpec, OrchestratorActor, OrchestratorConfig, Priority, SystemState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = OrchestratorActor::new(OrchestratorConfig::default()).unwrap();
//!     tokio::spawn(actor.run());
//!
//!     client
//!         .register(ComponentSpec::new("chemistry", Priority::Critical, || true))
//!         .await
//!         .unwrap();
//!     client.start_initialization().await.unwrap();
//!     assert_eq!(client.current_state().await.unwrap(), SystemState::Running);
//! }
//! ```

use crate::client::OrchestratorClient;
use crate::config::OrchestratorConfig;
use crate::error::Result;
use crate::message::{ControlCommand, OrchestratorRequest, Query};
use crate::orchestrator::Orchestrator;
use crate::state::SystemState;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub struct OrchestratorActor {
    orchestrator: Orchestrator,
    receiver: mpsc::Receiver<OrchestratorRequest>,
    tick_interval: Duration,
}

impl OrchestratorActor {
    /// Creates the actor (server) and its client (handle) with the system clock.
    pub fn new(config: OrchestratorConfig) -> Result<(Self, OrchestratorClient)> {
        let orchestrator = Orchestrator::new(config.clone())?;
        Self::with_orchestrator(orchestrator, &config)
    }

    /// Wraps a pre-built orchestrator, e.g. one using a manual clock.
    ///
    /// `config` sizes the request channel and the ticker, so it is validated
    /// again here.
    pub fn with_orchestrator(
        orchestrator: Orchestrator,
        config: &OrchestratorConfig,
    ) -> Result<(Self, OrchestratorClient)> {
        config.validate()?;
        let (sender, receiver) = mpsc::channel(config.request_buffer);
        let actor = Self {
            orchestrator,
            receiver,
            tick_interval: config.tick_interval(),
        };
        Ok((actor, OrchestratorClient::new(sender)))
    }

    /// Runs until every client is dropped or a shutdown request succeeds.
    pub async fn run(mut self) {
        info!(tick_ms = self.tick_interval.as_millis() as u64, "Orchestrator actor started");

        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                request = self.receiver.recv() => {
                    let Some(request) = request else { break };
                    if !self.handle(request) {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let report = self.orchestrator.tick();
                    if let Some(health) = report.health.filter(|h| h.health_changed) {
                        debug!(healthy = health.system_healthy, "Health changed on tick");
                    }
                }
            }
        }

        if self.orchestrator.current_state() != SystemState::Shutdown {
            if let Err(e) = self.orchestrator.shutdown() {
                warn!(error = %e, "Shutdown on close failed");
            }
        }
        info!(state = %self.orchestrator.current_state(), "Orchestrator actor stopped");
    }

    /// Returns `false` when the loop should stop.
    fn handle(&mut self, request: OrchestratorRequest) -> bool {
        let o = &mut self.orchestrator;
        match request {
            OrchestratorRequest::Register { spec, respond_to } => {
                debug!(component = %spec.id, "Register");
                let _ = respond_to.send(o.register(spec));
            }
            OrchestratorRequest::RegisterHandler {
                receiver,
                handler,
                respond_to,
            } => {
                debug!(%receiver, "RegisterHandler");
                o.register_boxed_handler(receiver, handler);
                let _ = respond_to.send(Ok(()));
            }
            OrchestratorRequest::StartInitialization { respond_to } => {
                debug!("StartInitialization");
                let _ = respond_to.send(o.start_initialization());
            }
            OrchestratorRequest::SendMessage {
                sender,
                receiver,
                message_type,
                payload,
                respond_to,
            } => {
                debug!(%sender, %receiver, %message_type, "SendMessage");
                let _ = respond_to.send(o.send_message(sender, receiver, message_type, payload));
            }
            OrchestratorRequest::Tick { respond_to } => {
                let _ = respond_to.send(Ok(o.tick()));
            }
            OrchestratorRequest::Control {
                command,
                respond_to,
            } => {
                debug!(?command, "Control");
                let result = match command {
                    ControlCommand::Pause => o.pause(),
                    ControlCommand::Resume => o.resume(),
                    ControlCommand::Stop => o.stop(),
                    ControlCommand::Recover => o.recover(),
                    ControlCommand::Shutdown => o.shutdown(),
                };
                let finished = command == ControlCommand::Shutdown && result.is_ok();
                let _ = respond_to.send(result);
                if finished {
                    return false;
                }
            }
            OrchestratorRequest::SubscribeEvents { respond_to } => {
                let _ = respond_to.send(Ok(o.subscribe_channel()));
            }
            OrchestratorRequest::Query(query) => Self::answer(o, query),
        }
        true
    }

    fn answer(o: &Orchestrator, query: Query) {
        match query {
            Query::ComponentStatus { id, respond_to } => {
                let _ = respond_to.send(Ok(o.component_status(&id).cloned()));
            }
            Query::ListComponents { respond_to } => {
                let _ = respond_to.send(Ok(o.list_components()));
            }
            Query::IsSystemReady { respond_to } => {
                let _ = respond_to.send(Ok(o.is_system_ready()));
            }
            Query::IsSystemHealthy { respond_to } => {
                let _ = respond_to.send(Ok(o.is_system_healthy()));
            }
            Query::CurrentState { respond_to } => {
                let _ = respond_to.send(Ok(o.current_state()));
            }
            Query::StatusReport { respond_to } => {
                let _ = respond_to.send(Ok(o.status_report()));
            }
            Query::RouterStats { respond_to } => {
                let _ = respond_to.send(Ok(o.router_stats()));
            }
        }
    }
}
