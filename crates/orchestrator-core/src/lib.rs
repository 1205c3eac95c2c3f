//! # Orchestrator Core
//!
//! Integration and orchestration core for a set of independently developed
//! subsystems ("components"). It registers components, brings them up in
//! priority and dependency order, tracks the lifecycle of the whole system,
//! keeps watching component health and routes timestamped messages between
//! components with timeout semantics.
//!
//! The orchestrator never knows a component's concrete type. Each one is
//! registered with a [`Probe`](probe::Probe) that answers "is the instance
//! reachable?", and optionally a [`MessageHandler`](router::MessageHandler)
//! for messages addressed to it.
//!
//! ## Architecture Overview
//!
//! | Piece | Role |
//! |-------|------|
//! | [`registry::ComponentRegistry`] | Descriptors and live status records |
//! | [`initializer::DependencyInitializer`] | Three tier passes: Critical, High, everything else |
//! | [`state::StateMachine`] | System lifecycle with validated transitions |
//! | [`router::MessageRouter`] | Bounded FIFO with expiry and overflow policy |
//! | [`health::HealthMonitor`] | Periodic probe sweep over active components |
//! | [`events::EventBus`] | Panic-isolated observers plus a broadcast channel |
//!
//! These are composed by two front ends:
//!
//! 1. **[`Orchestrator`]**: synchronous and tick-driven. The host calls
//!    [`Orchestrator::tick`] once per cycle.
//! 2. **[`OrchestratorActor`] + [`OrchestratorClient`]**: the same orchestrator
//!    inside one Tokio task. Any number of tasks share cloned clients; the
//!    actor serializes every request and ticks on its own interval.
//!
//! ## Quick Start
//!
//! ```rust
//! use orchestrator_core::{ComponentSpec, Orchestrator, OrchestratorConfig, Priority, SystemState};
//!
//! let mut orchestrator = Orchestrator::new(OrchestratorConfig::default()).unwrap();
//! orchestrator.register(ComponentSpec::new("chemistry", Priority::Critical, || true)).unwrap();
//! orchestrator
//!     .register(ComponentSpec::new("audio", Priority::Normal, || false).depends_on(["chemistry"]))
//!     .unwrap();
//!
//! let report = orchestrator.start_initialization().unwrap().unwrap();
//! // Optional tiers may fail without blocking readiness.
//! assert!(report.ready);
//! assert_eq!(orchestrator.current_state(), SystemState::Running);
//! assert!(!orchestrator.component_status(&"audio".into()).unwrap().is_active);
//! ```
//!
//! ## Concurrency Model
//!
//! - The sync [`Orchestrator`] runs everything to completion on the calling thread
//! - The actor owns the only copy of the tables, so no locks are needed
//! - Probes, handlers and observers are invoked from the control loop and must be `Send`
//!
//! ## Testing
//!
//! The [`mock`] module provides a manual clock, scriptable probes, a recording
//! message handler and an event recorder for deterministic tests.

pub mod actor;
pub mod client;
pub mod clock;
pub mod component;
pub mod config;
pub mod envelope;
pub mod error;
pub mod events;
pub mod health;
pub mod initializer;
pub mod message;
pub mod mock;
pub mod orchestrator;
pub mod probe;
pub mod registry;
pub mod report;
pub mod router;
pub mod state;
pub mod tracing;

// Re-export core types for convenience
pub use actor::OrchestratorActor;
pub use client::OrchestratorClient;
pub use clock::{Clock, SystemClock};
pub use component::{ComponentDescriptor, ComponentId, ComponentSpec, ComponentStatus, Priority};
pub use config::OrchestratorConfig;
pub use envelope::SystemMessage;
pub use error::{ConfigError, OrchestratorError, ProbeError};
pub use events::{EventKind, OrchestratorEvent, SubscriptionId};
pub use health::HealthReport;
pub use initializer::InitializationReport;
pub use orchestrator::Orchestrator;
pub use report::{ComponentSummary, SystemReport, TickReport};
pub use router::{Delivery, DispatchReport, MessageHandler, OverflowPolicy, RouterStats, SendOutcome};
pub use state::SystemState;
