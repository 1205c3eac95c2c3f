use orchestrator_core::{ComponentId, ConfigError, OrchestratorError};

#[derive(Debug, thiserror::Error)]
pub enum LabError {
    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] OrchestratorError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Lab already started")]
    AlreadyStarted,
    #[error("Lab not ready, required subsystems down: {}", format_ids(.missing))]
    NotReady { missing: Vec<ComponentId> },
    #[error("Unknown subsystem: {0}")]
    UnknownSubsystem(String),
    #[error("Orchestrator task failed: {0}")]
    ActorTask(String),
}

fn format_ids(ids: &[ComponentId]) -> String {
    ids.iter()
        .map(ComponentId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
