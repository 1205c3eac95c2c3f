//! # Orchestrator Client
//!
//! The handle the rest of the application holds. It is created once by the
//! entry point alongside the actor and passed by clone to anything that needs
//! to register components, send messages or query status.

use crate::component::{ComponentId, ComponentSpec, ComponentStatus};
use crate::error::{OrchestratorError, Result};
use crate::events::OrchestratorEvent;
use crate::initializer::InitializationReport;
use crate::message::{ControlCommand, OrchestratorRequest, Query, Response};
use crate::report::{ComponentSummary, SystemReport, TickReport};
use crate::router::{MessageHandler, RouterStats, SendOutcome};
use crate::state::SystemState;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, instrument};

/// Cheap-to-clone, type-safe handle to an [`OrchestratorActor`](crate::OrchestratorActor).
#[derive(Clone)]
pub struct OrchestratorClient {
    sender: mpsc::Sender<OrchestratorRequest>,
}

impl OrchestratorClient {
    pub fn new(sender: mpsc::Sender<OrchestratorRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Response<T>) -> OrchestratorRequest,
    ) -> Result<T> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| OrchestratorError::ActorClosed)?;
        response.await.map_err(|_| OrchestratorError::ActorDropped)?
    }

    async fn control(&self, command: ControlCommand) -> Result<()> {
        self.request(|respond_to| OrchestratorRequest::Control {
            command,
            respond_to,
        })
        .await
    }

    #[instrument(skip(self, spec), fields(component = %spec.id))]
    pub async fn register(&self, spec: ComponentSpec) -> Result<()> {
        debug!("Sending request");
        self.request(|respond_to| OrchestratorRequest::Register { spec, respond_to })
            .await
    }

    pub async fn register_handler(
        &self,
        receiver: impl Into<ComponentId>,
        handler: impl MessageHandler + 'static,
    ) -> Result<()> {
        let receiver = receiver.into();
        self.request(|respond_to| OrchestratorRequest::RegisterHandler {
            receiver,
            handler: Box::new(handler),
            respond_to,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn start_initialization(&self) -> Result<Option<InitializationReport>> {
        debug!("Sending request");
        self.request(|respond_to| OrchestratorRequest::StartInitialization { respond_to })
            .await
    }

    pub async fn send_message(
        &self,
        sender: impl Into<ComponentId>,
        receiver: impl Into<ComponentId>,
        message_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Result<SendOutcome> {
        let (sender, receiver, message_type) = (sender.into(), receiver.into(), message_type.into());
        self.request(|respond_to| OrchestratorRequest::SendMessage {
            sender,
            receiver,
            message_type,
            payload,
            respond_to,
        })
        .await
    }

    /// Runs one scheduler cycle now, in addition to the actor's own interval.
    pub async fn tick(&self) -> Result<TickReport> {
        self.request(|respond_to| OrchestratorRequest::Tick { respond_to })
            .await
    }

    pub async fn pause(&self) -> Result<()> {
        self.control(ControlCommand::Pause).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.control(ControlCommand::Resume).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.control(ControlCommand::Stop).await
    }

    pub async fn recover(&self) -> Result<()> {
        self.control(ControlCommand::Recover).await
    }

    /// Shuts the orchestrator down; the actor task exits afterwards.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<()> {
        debug!("Sending request");
        self.control(ControlCommand::Shutdown).await
    }

    pub async fn subscribe_events(&self) -> Result<broadcast::Receiver<OrchestratorEvent>> {
        self.request(|respond_to| OrchestratorRequest::SubscribeEvents { respond_to })
            .await
    }

    // --- Queries ---

    pub async fn component_status(
        &self,
        id: impl Into<ComponentId>,
    ) -> Result<Option<ComponentStatus>> {
        let id = id.into();
        self.request(|respond_to| OrchestratorRequest::Query(Query::ComponentStatus { id, respond_to }))
            .await
    }

    pub async fn list_components(&self) -> Result<Vec<ComponentSummary>> {
        self.request(|respond_to| OrchestratorRequest::Query(Query::ListComponents { respond_to }))
            .await
    }

    pub async fn is_system_ready(&self) -> Result<bool> {
        self.request(|respond_to| OrchestratorRequest::Query(Query::IsSystemReady { respond_to }))
            .await
    }

    pub async fn is_system_healthy(&self) -> Result<bool> {
        self.request(|respond_to| OrchestratorRequest::Query(Query::IsSystemHealthy { respond_to }))
            .await
    }

    pub async fn current_state(&self) -> Result<SystemState> {
        self.request(|respond_to| OrchestratorRequest::Query(Query::CurrentState { respond_to }))
            .await
    }

    pub async fn status_report(&self) -> Result<SystemReport> {
        self.request(|respond_to| OrchestratorRequest::Query(Query::StatusReport { respond_to }))
            .await
    }

    pub async fn router_stats(&self) -> Result<RouterStats> {
        self.request(|respond_to| OrchestratorRequest::Query(Query::RouterStats { respond_to }))
            .await
    }
}
