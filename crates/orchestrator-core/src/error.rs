//! # Orchestrator Errors
//!
//! This module defines the error types used throughout the orchestrator.
//! Most failure modes (a blocked dependency, a failed probe, an expired message)
//! are recorded on component status or counted in stats rather than returned.
//! The variants here cover the calls a host can get wrong.

use crate::component::ComponentId;
use crate::state::SystemState;

/// Errors returned by the orchestrator control surface.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("Component already registered: {0}")]
    DuplicateComponent(ComponentId),
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition { from: SystemState, to: SystemState },
    #[error("Message queue full (capacity {capacity})")]
    QueueFull { capacity: usize },
    #[error("Not accepting messages in state {0}")]
    NotAccepting(SystemState),
    #[error("Orchestrator actor closed")]
    ActorClosed,
    #[error("Orchestrator actor dropped response channel")]
    ActorDropped,
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Error reported by a component's reachability probe.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ProbeError(pub String);

impl ProbeError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Errors raised while loading or validating [`OrchestratorConfig`](crate::config::OrchestratorConfig).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T, E = OrchestratorError> = std::result::Result<T, E>;
