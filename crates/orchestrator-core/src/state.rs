//! # System State Machine
//!
//! Tracks the overall orchestration phase. Transitions follow a fixed graph;
//! `Shutdown` is terminal and `Error` is only left through an explicit call.
//!
//! ```text
//! Initializing -> Starting -> Running <-> Paused
//!       ^            |          |          |
//!       |            v          v          v
//!       +-------- Error ----> Stopping -> Shutdown
//! ```

use crate::error::{OrchestratorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemState {
    Initializing,
    Starting,
    Running,
    Paused,
    Stopping,
    Error,
    Shutdown,
}

impl SystemState {
    pub fn can_transition_to(self, to: SystemState) -> bool {
        use SystemState::*;
        matches!(
            (self, to),
            (Initializing, Starting)
                | (Starting, Running)
                | (Starting, Error)
                | (Running, Paused)
                | (Paused, Running)
                | (Error, Initializing)
                | (Initializing | Starting | Running | Paused | Error, Stopping)
                | (Stopping, Shutdown)
        )
    }
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SystemState::Initializing => "initializing",
            SystemState::Starting => "starting",
            SystemState::Running => "running",
            SystemState::Paused => "paused",
            SystemState::Stopping => "stopping",
            SystemState::Error => "error",
            SystemState::Shutdown => "shutdown",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed { from: SystemState, to: SystemState },
    Unchanged,
}

#[derive(Debug)]
pub struct StateMachine {
    current: SystemState,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            current: SystemState::Initializing,
        }
    }

    pub fn current(&self) -> SystemState {
        self.current
    }

    /// Moves to `to` if the graph allows it. Requesting the current state is a no-op.
    pub fn transition(&mut self, to: SystemState) -> Result<Transition> {
        let from = self.current;
        if from == to {
            return Ok(Transition::Unchanged);
        }
        if !from.can_transition_to(to) {
            warn!(%from, %to, "Rejected state transition");
            return Err(OrchestratorError::InvalidTransition { from, to });
        }
        self.current = to;
        info!(%from, %to, "State changed");
        Ok(Transition::Changed { from, to })
    }
}
