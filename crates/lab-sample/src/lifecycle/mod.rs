//! # Lab Lifecycle
//!
//! Creating, wiring and tearing down the orchestrated lab.
//!
//! ## The LabSystem Pattern
//!
//! [`LabSystem`] is the single place where the orchestrator is constructed.
//! Everything else receives a cloned [`OrchestratorClient`](orchestrator_core::OrchestratorClient)
//! instead of reaching for a global:
//!
//! ```rust,ignore
//! let lab = LabSystem::new(OrchestratorConfig::from_env()?)?;
//! let report = lab.boot().await?;          // register + initialize
//! lab.client.send_message("ui", "chemistry", "reaction.start", payload).await?;
//! lab.shutdown().await?;                   // Stopping -> Shutdown, actor exits
//! ```
//!
//! ## Boot Sequence
//!
//! 1. **Register** every subsystem of [`STANDARD_LAB`](crate::subsystems::STANDARD_LAB)
//!    with a probe bound to its `alive` switch.
//! 2. **Install handlers** so messages land in each subsystem's inbox.
//! 3. **Initialize** in tier passes. Critical and High subsystems must come up;
//!    otherwise boot fails with [`LabError::NotReady`](crate::error::LabError::NotReady)
//!    and the orchestrator stays in `Error` until recovered.
//!
//! ## Graceful Shutdown
//!
//! `shutdown` asks the actor to shut down, which marks every component
//! inactive and discards undelivered messages, then awaits the actor task.
//! Dropping every client has the same effect without the explicit request.

pub mod lab_system;

pub use lab_system::*;
