//! # Orchestrator
//!
//! The single-threaded core that ties the pieces together:
//!
//! ```text
//! registry -> initializer -> state machine -> health monitor
//!                                  |
//!                                  +-> message router (dispatches only while Running)
//! ```
//!
//! Everything runs to completion inside the calling thread. The host drives
//! periodic work by calling [`Orchestrator::tick`] at a fixed cadence;
//! [`OrchestratorActor`](crate::OrchestratorActor) does that on a Tokio
//! interval and serializes access from many tasks.
//!
//! ```rust
//! use orchestrator_core::{ComponentSpec, Orchestrator, OrchestratorConfig, Priority, SystemState};
//!
//! let mut orchestrator = Orchestrator::new(OrchestratorConfig::default()).unwrap();
//! orchestrator.register(ComponentSpec::new("chemistry", Priority::Critical, || true)).unwrap();
//! orchestrator.register(
//!     ComponentSpec::new("ui", Priority::High, || true).depends_on(["chemistry"]),
//! ).unwrap();
//!
//! let report = orchestrator.start_initialization().unwrap().unwrap();
//! assert!(report.ready);
//! assert_eq!(orchestrator.current_state(), SystemState::Running);
//! ```

use crate::clock::{Clock, SystemClock};
use crate::component::{ComponentDescriptor, ComponentId, ComponentSpec, ComponentStatus};
use crate::config::OrchestratorConfig;
use crate::envelope::SystemMessage;
use crate::error::{OrchestratorError, Result};
use crate::events::{EventBus, EventKind, OrchestratorEvent, SubscriptionId};
use crate::health::{aggregate_health, HealthMonitor};
use crate::initializer::{DependencyInitializer, InitializationReport};
use crate::registry::ComponentRegistry;
use crate::report::{ComponentSummary, SystemReport, TickReport};
use crate::router::{MessageHandler, MessageRouter, RouterStats, SendOutcome};
use crate::state::{StateMachine, SystemState, Transition};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

pub struct Orchestrator {
    clock: Arc<dyn Clock>,
    registry: ComponentRegistry,
    initializer: DependencyInitializer,
    state: StateMachine,
    router: MessageRouter,
    health: HealthMonitor,
    events: EventBus,
    ready: bool,
}

impl Orchestrator {
    /// Fails with [`OrchestratorError::Config`] when `config` does not validate.
    pub fn new(config: OrchestratorConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: OrchestratorConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            clock,
            registry: ComponentRegistry::new(),
            initializer: DependencyInitializer::new(),
            state: StateMachine::new(),
            router: MessageRouter::from_config(&config),
            health: HealthMonitor::new(
                config.health_check_interval(),
                config.health_monitoring_enabled,
            ),
            events: EventBus::new(),
            ready: false,
        })
    }

    // --- Registration & subscriptions ---

    pub fn register(&mut self, spec: ComponentSpec) -> Result<()> {
        let now = self.clock.now();
        let id = self.registry.register(spec, now)?.id.clone();
        info!(component = %id, "Component registered");
        self.events
            .emit(OrchestratorEvent::ComponentRegistered { id });
        Ok(())
    }

    /// Installs the receiver-side hook for messages addressed to `receiver`.
    pub fn register_handler(
        &mut self,
        receiver: impl Into<ComponentId>,
        handler: impl MessageHandler + 'static,
    ) {
        self.register_boxed_handler(receiver.into(), Box::new(handler));
    }

    pub(crate) fn register_boxed_handler(
        &mut self,
        receiver: ComponentId,
        handler: Box<dyn MessageHandler>,
    ) {
        self.router.register_handler(receiver, handler);
    }

    pub fn subscribe(
        &mut self,
        callback: impl Fn(&OrchestratorEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(callback)
    }

    pub fn subscribe_kind(
        &mut self,
        kind: EventKind,
        callback: impl Fn(&OrchestratorEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.events.subscribe_kind(kind, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn subscribe_channel(&self) -> broadcast::Receiver<OrchestratorEvent> {
        self.events.subscribe_channel()
    }

    // --- Control ---

    /// Runs the three initialization passes and settles on Running or Error.
    ///
    /// Returns `Ok(None)` without doing anything unless the state is `Initializing`.
    pub fn start_initialization(&mut self) -> Result<Option<InitializationReport>> {
        let current = self.state.current();
        if current != SystemState::Initializing {
            warn!(state = %current, "Initialization already started, ignoring");
            return Ok(None);
        }

        self.set_state(SystemState::Starting)?;
        info!(components = self.registry.len(), "Starting component initialization");

        let now = self.clock.now();
        let report = self.initializer.run(&mut self.registry, &self.events, now);

        if report.ready {
            self.ready = true;
            self.set_state(SystemState::Running)?;
            self.health.arm(now);
            info!(
                initialized = report.initialized.len(),
                failed = report.failed.len(),
                blocked = report.blocked.len(),
                "System ready"
            );
            self.events.emit(OrchestratorEvent::SystemInitialized);
            self.events.emit(OrchestratorEvent::SystemReady);
        } else {
            self.ready = false;
            self.set_state(SystemState::Error)?;
            let missing: Vec<&str> = report.missing_required.iter().map(ComponentId::as_str).collect();
            let message = format!(
                "Required components failed to initialize: {}",
                missing.join(", ")
            );
            error!(missing = ?missing, "System initialization failed");
            self.events.emit(OrchestratorEvent::SystemError { message });
        }

        Ok(Some(report))
    }

    pub fn pause(&mut self) -> Result<()> {
        self.set_state(SystemState::Paused)
    }

    pub fn resume(&mut self) -> Result<()> {
        match self.state.current() {
            SystemState::Paused | SystemState::Running => self.set_state(SystemState::Running),
            from => Err(OrchestratorError::InvalidTransition {
                from,
                to: SystemState::Running,
            }),
        }
    }

    /// Moves to `Stopping`; pending messages stay queued until shutdown.
    pub fn stop(&mut self) -> Result<()> {
        self.set_state(SystemState::Stopping)
    }

    /// Leaves `Error` so initialization can be re-run. Status records and
    /// error counts are kept; initializer progress is cleared.
    pub fn recover(&mut self) -> Result<()> {
        self.set_state(SystemState::Initializing)?;
        self.initializer.reset();
        self.ready = false;
        info!("Recovered from error, ready to re-initialize");
        Ok(())
    }

    /// Passes through `Stopping` to `Shutdown` and marks every component inactive.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.state.current() == SystemState::Shutdown {
            warn!("Already shut down");
            return Ok(());
        }
        self.set_state(SystemState::Stopping)?;

        let now = self.clock.now();
        for entry in self.registry.entries_mut() {
            entry.status.deactivate("Shutdown", now);
        }
        let dropped = self.router.clear();
        if dropped > 0 {
            warn!(dropped, "Discarded undelivered messages at shutdown");
        }
        self.ready = false;

        self.set_state(SystemState::Shutdown)?;
        info!("Orchestrator shut down");
        Ok(())
    }

    pub fn send_message(
        &mut self,
        sender: impl Into<ComponentId>,
        receiver: impl Into<ComponentId>,
        message_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Result<SendOutcome> {
        let state = self.state.current();
        if matches!(state, SystemState::Stopping | SystemState::Shutdown) {
            return Err(OrchestratorError::NotAccepting(state));
        }
        let message = SystemMessage::new(sender, receiver, message_type, payload, self.clock.now());
        self.router.send(message)
    }

    /// One scheduler cycle: health sweep when due, then message dispatch.
    /// Does nothing unless the system is `Running`.
    pub fn tick(&mut self) -> TickReport {
        if self.state.current() != SystemState::Running {
            return TickReport::default();
        }
        let now = self.clock.now();
        let health = self
            .health
            .is_due(now)
            .then(|| self.health.sweep(&mut self.registry, &self.events, now));
        let dispatch = Some(self.router.dispatch(now));
        TickReport { health, dispatch }
    }

    // --- Queries ---

    pub fn current_state(&self) -> SystemState {
        self.state.current()
    }

    pub fn is_system_ready(&self) -> bool {
        self.ready
    }

    pub fn is_system_healthy(&self) -> bool {
        aggregate_health(&self.registry)
    }

    pub fn component_status(&self, id: &ComponentId) -> Option<&ComponentStatus> {
        self.registry.status(id)
    }

    pub fn descriptor(&self, id: &ComponentId) -> Option<&ComponentDescriptor> {
        self.registry.descriptor(id)
    }

    pub fn list_components(&self) -> Vec<ComponentSummary> {
        let now = self.clock.now();
        self.registry
            .iter()
            .map(|(d, s)| ComponentSummary::new(d, s, now))
            .collect()
    }

    pub fn initialization_order(&self) -> &[ComponentId] {
        self.initializer.initialization_order()
    }

    pub fn router_stats(&self) -> RouterStats {
        self.router.stats()
    }

    pub fn queue_len(&self) -> usize {
        self.router.queue_len()
    }

    pub fn status_report(&self) -> SystemReport {
        let components = self.list_components();
        SystemReport {
            generated_at: self.clock.now(),
            state: self.state.current(),
            ready: self.ready,
            healthy: self.is_system_healthy(),
            total_components: components.len(),
            active_components: components.iter().filter(|c| c.is_active).count(),
            healthy_components: components
                .iter()
                .filter(|c| c.is_active && c.is_healthy)
                .count(),
            queue_len: self.router.queue_len(),
            router: self.router.stats(),
            components,
        }
    }

    fn set_state(&mut self, to: SystemState) -> Result<()> {
        if let Transition::Changed { .. } = self.state.transition(to)? {
            self.events
                .emit(OrchestratorEvent::StateChanged { state: to });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Priority;
    use serde_json::json;

    fn running() -> Orchestrator {
        let mut orchestrator = Orchestrator::new(OrchestratorConfig::default()).unwrap();
        orchestrator
            .register(ComponentSpec::new("chemistry", Priority::Critical, || true))
            .unwrap();
        orchestrator.start_initialization().unwrap();
        orchestrator
    }

    #[test]
    fn test_second_start_is_ignored() {
        let mut orchestrator = running();
        assert!(orchestrator.start_initialization().unwrap().is_none());
        assert_eq!(orchestrator.current_state(), SystemState::Running);
    }

    #[test]
    fn test_tick_is_idle_unless_running() {
        let mut orchestrator = running();
        orchestrator
            .send_message("ui", "chemistry", "mix", json!({}))
            .unwrap();
        orchestrator.pause().unwrap();
        assert_eq!(orchestrator.tick(), TickReport::default());
        assert_eq!(orchestrator.queue_len(), 1);

        orchestrator.resume().unwrap();
        let report = orchestrator.tick();
        assert_eq!(report.dispatch.unwrap().undeliverable, 1);
    }

    #[test]
    fn test_shutdown_rejects_later_transitions_and_messages() {
        let mut orchestrator = running();
        orchestrator.shutdown().unwrap();
        assert_eq!(orchestrator.current_state(), SystemState::Shutdown);
        assert!(!orchestrator.is_system_ready());

        assert!(orchestrator.pause().is_err());
        assert!(orchestrator.resume().is_err());
        assert!(orchestrator.recover().is_err());
        assert!(orchestrator.start_initialization().unwrap().is_none());
        assert!(orchestrator.shutdown().is_ok());
        assert!(matches!(
            orchestrator.send_message("ui", "chemistry", "mix", json!({})),
            Err(OrchestratorError::NotAccepting(SystemState::Shutdown))
        ));
        assert_eq!(orchestrator.current_state(), SystemState::Shutdown);
    }

    #[test]
    fn test_recover_allows_reinitialization() {
        let mut orchestrator = Orchestrator::new(OrchestratorConfig::default()).unwrap();
        let up = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = up.clone();
        orchestrator
            .register(ComponentSpec::new("safety", Priority::Critical, move || {
                flag.load(std::sync::atomic::Ordering::SeqCst)
            }))
            .unwrap();

        orchestrator.start_initialization().unwrap();
        assert_eq!(orchestrator.current_state(), SystemState::Error);
        assert!(orchestrator.resume().is_err());

        up.store(true, std::sync::atomic::Ordering::SeqCst);
        orchestrator.recover().unwrap();
        let report = orchestrator.start_initialization().unwrap().unwrap();
        assert!(report.ready);
        assert_eq!(orchestrator.current_state(), SystemState::Running);
        let status = orchestrator.component_status(&"safety".into()).unwrap();
        assert!(status.is_active);
        assert_eq!(status.error_count, 1);
    }

    #[test]
    fn test_reinitialization_deactivates_blocked_component() {
        let mut orchestrator = Orchestrator::new(OrchestratorConfig::default()).unwrap();
        let up = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(true));
        let flag = up.clone();
        orchestrator
            .register(ComponentSpec::new("chemistry", Priority::Critical, move || {
                flag.load(std::sync::atomic::Ordering::SeqCst)
            }))
            .unwrap();
        orchestrator
            .register(ComponentSpec::new("safety", Priority::Critical, || false))
            .unwrap();
        orchestrator
            .register(ComponentSpec::new("ui", Priority::High, || true).depends_on(["chemistry"]))
            .unwrap();

        orchestrator.start_initialization().unwrap();
        assert_eq!(orchestrator.current_state(), SystemState::Error);
        assert!(orchestrator.component_status(&"ui".into()).unwrap().is_active);

        up.store(false, std::sync::atomic::Ordering::SeqCst);
        orchestrator.recover().unwrap();
        let report = orchestrator.start_initialization().unwrap().unwrap();

        assert!(!report.ready);
        assert_eq!(report.blocked, vec![ComponentId::from("ui")]);
        let ui = orchestrator.component_status(&"ui".into()).unwrap();
        assert!(!ui.is_active);
        assert_eq!(ui.status_message, "Missing dependencies: chemistry");
        assert_eq!(ui.error_count, 0);
        assert_eq!(orchestrator.status_report().active_components, 0);
    }
}
