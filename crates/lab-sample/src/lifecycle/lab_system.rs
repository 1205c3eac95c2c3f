use crate::error::LabError;
use crate::subsystems::{LabSubsystem, STANDARD_LAB};
use orchestrator_core::{
    InitializationReport, Orchestrator, OrchestratorActor, OrchestratorClient, OrchestratorConfig,
    SystemState,
};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// The orchestrated lab: one orchestrator actor plus the simulated subsystems.
pub struct LabSystem {
    /// Handle for registering, messaging and querying the orchestrator
    pub client: OrchestratorClient,

    /// Simulated subsystems, in registration order
    subsystems: Vec<LabSubsystem>,

    handle: JoinHandle<()>,
}

impl LabSystem {
    /// Spawns the orchestrator actor. Nothing is registered until [`boot`](Self::boot).
    /// Fails with [`LabError::Orchestrator`] when the configuration is invalid.
    pub fn new(config: OrchestratorConfig) -> Result<Self, LabError> {
        let (actor, client) = OrchestratorActor::new(config)?;
        Ok(Self::spawn(actor, client))
    }

    /// Same as [`new`](Self::new) around a pre-built orchestrator, e.g. one on a manual clock.
    pub fn with_orchestrator(
        orchestrator: Orchestrator,
        config: &OrchestratorConfig,
    ) -> Result<Self, LabError> {
        let (actor, client) = OrchestratorActor::with_orchestrator(orchestrator, config)?;
        Ok(Self::spawn(actor, client))
    }

    fn spawn(actor: OrchestratorActor, client: OrchestratorClient) -> Self {
        let handle = tokio::spawn(actor.run());
        let subsystems = STANDARD_LAB.iter().copied().map(LabSubsystem::new).collect();
        Self {
            client,
            subsystems,
            handle,
        }
    }

    pub fn subsystems(&self) -> &[LabSubsystem] {
        &self.subsystems
    }

    pub fn subsystem(&self, id: &str) -> Result<&LabSubsystem, LabError> {
        self.subsystems
            .iter()
            .find(|s| s.id() == id)
            .ok_or_else(|| LabError::UnknownSubsystem(id.to_string()))
    }

    /// Registers every subsystem with its handler and runs initialization.
    pub async fn boot(&self) -> Result<InitializationReport, LabError> {
        if self.client.current_state().await? != SystemState::Initializing {
            return Err(LabError::AlreadyStarted);
        }
        for subsystem in &self.subsystems {
            self.client.register(subsystem.spec()).await?;
            self.client
                .register_handler(subsystem.id(), subsystem.handler())
                .await?;
        }

        let report = self
            .client
            .start_initialization()
            .await?
            .ok_or(LabError::AlreadyStarted)?;

        if !report.ready {
            error!(missing = ?report.missing_required, "Lab failed to start");
            return Err(LabError::NotReady {
                missing: report.missing_required,
            });
        }
        if !report.failed.is_empty() {
            warn!(failed = ?report.failed, "Lab running without optional subsystems");
        }
        info!(order = ?report.initialized, "Lab ready");
        Ok(report)
    }

    /// Shuts the orchestrator down and waits for the actor task to finish.
    pub async fn shutdown(self) -> Result<(), LabError> {
        info!("Shutting down lab...");
        self.client.shutdown().await?;
        drop(self.client);

        if let Err(e) = self.handle.await {
            error!(error = %e, "Orchestrator task failed");
            return Err(LabError::ActorTask(e.to_string()));
        }

        info!("Lab shutdown complete.");
        Ok(())
    }
}
