//! # Lab Sample
//!
//! Drives the orchestrator end to end with simulated lab subsystems.
//!
//! - **[subsystems]**: in-memory stand-ins for chemistry, safety, UI and the rest,
//!   each with an `alive` switch and an inbox.
//! - **[lifecycle]**: [`LabSystem`](lifecycle::LabSystem), which spawns the
//!   orchestrator actor, wires every subsystem in and shuts it down again.
//! - **[error]**: the sample's error type.

pub mod error;
pub mod lifecycle;
pub mod subsystems;
