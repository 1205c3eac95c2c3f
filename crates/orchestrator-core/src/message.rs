//! # Actor Requests
//!
//! The messages an [`OrchestratorClient`](crate::OrchestratorClient) sends to
//! the [`OrchestratorActor`](crate::OrchestratorActor). Each carries a one-shot
//! channel the actor answers on.

use crate::component::{ComponentId, ComponentSpec, ComponentStatus};
use crate::error::OrchestratorError;
use crate::events::OrchestratorEvent;
use crate::initializer::InitializationReport;
use crate::report::{ComponentSummary, SystemReport, TickReport};
use crate::router::{MessageHandler, RouterStats, SendOutcome};
use crate::state::SystemState;
use tokio::sync::{broadcast, oneshot};

/// Type alias for the one-shot response channel used by the actor.
pub type Response<T> = oneshot::Sender<Result<T, OrchestratorError>>;

/// Explicit lifecycle commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Pause,
    Resume,
    Stop,
    Recover,
    Shutdown,
}

/// Read-only questions answered from the current orchestrator state.
pub enum Query {
    ComponentStatus {
        id: ComponentId,
        respond_to: Response<Option<ComponentStatus>>,
    },
    ListComponents {
        respond_to: Response<Vec<ComponentSummary>>,
    },
    IsSystemReady {
        respond_to: Response<bool>,
    },
    IsSystemHealthy {
        respond_to: Response<bool>,
    },
    CurrentState {
        respond_to: Response<SystemState>,
    },
    StatusReport {
        respond_to: Response<SystemReport>,
    },
    RouterStats {
        respond_to: Response<RouterStats>,
    },
}

pub enum OrchestratorRequest {
    Register {
        spec: ComponentSpec,
        respond_to: Response<()>,
    },
    RegisterHandler {
        receiver: ComponentId,
        handler: Box<dyn MessageHandler>,
        respond_to: Response<()>,
    },
    StartInitialization {
        respond_to: Response<Option<InitializationReport>>,
    },
    SendMessage {
        sender: ComponentId,
        receiver: ComponentId,
        message_type: String,
        payload: serde_json::Value,
        respond_to: Response<SendOutcome>,
    },
    Tick {
        respond_to: Response<TickReport>,
    },
    Control {
        command: ControlCommand,
        respond_to: Response<()>,
    },
    SubscribeEvents {
        respond_to: Response<broadcast::Receiver<OrchestratorEvent>>,
    },
    Query(Query),
}
