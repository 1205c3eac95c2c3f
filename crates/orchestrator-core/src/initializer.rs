//! # Dependency Initializer
//!
//! Brings registered components up in three tier passes:
//!
//! 1. Critical components, in registration order.
//! 2. High components.
//! 3. Everything else that has not been initialized or failed.
//!
//! A candidate whose dependencies are not all initialized yet is blocked for
//! its pass and is not retried later. This is tier ordering, not a topological
//! sort: a Critical component depending on a High one always blocks, because
//! pass 1 runs before the High tier has been probed.

use crate::component::{ComponentId, Priority};
use crate::events::{EventBus, OrchestratorEvent};
use crate::probe;
use crate::registry::{ComponentRegistry, Entry};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
enum Pass {
    Critical,
    High,
    Remaining,
}

impl Pass {
    fn includes(self, priority: Priority) -> bool {
        match self {
            Pass::Critical => priority == Priority::Critical,
            Pass::High => priority == Priority::High,
            Pass::Remaining => true,
        }
    }
}

/// Outcome of one initialization run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InitializationReport {
    /// Successfully initialized components, in the order they came up.
    pub initialized: Vec<ComponentId>,
    /// Components whose probe failed or errored.
    pub failed: Vec<ComponentId>,
    /// Components skipped because a dependency was not initialized in time.
    pub blocked: Vec<ComponentId>,
    /// Required (Critical/High) components that did not come up.
    pub missing_required: Vec<ComponentId>,
    pub ready: bool,
}

#[derive(Debug, Default)]
pub struct DependencyInitializer {
    initialized: HashSet<ComponentId>,
    order: Vec<ComponentId>,
    failed: HashSet<ComponentId>,
}

impl DependencyInitializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self, id: &ComponentId) -> bool {
        self.initialized.contains(id)
    }

    pub fn initialization_order(&self) -> &[ComponentId] {
        &self.order
    }

    /// Forgets previous progress so a later run starts from scratch.
    pub fn reset(&mut self) {
        self.initialized.clear();
        self.order.clear();
        self.failed.clear();
    }

    pub fn run(
        &mut self,
        registry: &mut ComponentRegistry,
        events: &EventBus,
        now: DateTime<Utc>,
    ) -> InitializationReport {
        let mut report = InitializationReport::default();

        for pass in [Pass::Critical, Pass::High, Pass::Remaining] {
            debug!(?pass, "Initialization pass");
            for position in 0..registry.len() {
                let entry = registry.entry_at_mut(position);
                let id = &entry.descriptor.id;
                if !pass.includes(entry.descriptor.priority)
                    || self.initialized.contains(id)
                    || self.failed.contains(id)
                {
                    continue;
                }
                self.attempt(entry, events, now, &mut report);
            }
        }

        report.missing_required = registry
            .iter()
            .filter(|(d, _)| d.required() && !self.initialized.contains(&d.id))
            .map(|(d, _)| d.id.clone())
            .collect();
        report.ready = report.missing_required.is_empty();
        report
    }

    fn attempt(
        &mut self,
        entry: &mut Entry,
        events: &EventBus,
        now: DateTime<Utc>,
        report: &mut InitializationReport,
    ) {
        let id = entry.descriptor.id.clone();

        let missing: Vec<&str> = entry
            .descriptor
            .dependencies
            .iter()
            .filter(|dep| !self.initialized.contains(*dep))
            .map(ComponentId::as_str)
            .collect();
        if !missing.is_empty() {
            warn!(component = %id, missing = ?missing, "Dependencies not ready");
            let message = format!("Missing dependencies: {}", missing.join(", "));
            // A component left active by an earlier run is no longer initialized.
            entry.status.deactivate(message, now);
            self.failed.insert(id.clone());
            report.blocked.push(id);
            return;
        }

        let reason = match probe::invoke(entry.probe.as_ref()) {
            Ok(true) => {
                entry.status.activate(now);
                info!(component = %id, "Component initialized");
                self.initialized.insert(id.clone());
                self.order.push(id.clone());
                report.initialized.push(id.clone());
                events.emit(OrchestratorEvent::ComponentInitialized { id });
                return;
            }
            Ok(false) => "Instance not reachable".to_string(),
            Err(e) => format!("Initialization failed: {e}"),
        };

        warn!(component = %id, %reason, "Component failed to initialize");
        entry.status.is_active = false;
        entry.status.record_failure(reason.clone(), now);
        self.failed.insert(id.clone());
        report.failed.push(id.clone());
        events.emit(OrchestratorEvent::ComponentError { id, reason });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentSpec;
    use crate::error::ProbeError;
    use crate::probe::FallibleProbe;

    fn registry(specs: Vec<ComponentSpec>) -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        for spec in specs {
            registry.register(spec, Utc::now()).unwrap();
        }
        registry
    }

    #[test]
    fn test_tiers_run_before_registration_order() {
        let mut reg = registry(vec![
            ComponentSpec::new("optional", Priority::Optional, || true),
            ComponentSpec::new("high", Priority::High, || true),
            ComponentSpec::new("critical", Priority::Critical, || true),
            ComponentSpec::new("normal", Priority::Normal, || true),
        ]);
        let mut init = DependencyInitializer::new();
        let report = init.run(&mut reg, &EventBus::new(), Utc::now());

        let order: Vec<_> = report.initialized.iter().map(ComponentId::as_str).collect();
        assert_eq!(order, vec!["critical", "high", "optional", "normal"]);
        assert!(report.ready);
    }

    #[test]
    fn test_blocked_component_keeps_error_count() {
        let mut reg = registry(vec![
            ComponentSpec::new("panels", Priority::Normal, || true).depends_on(["missing"]),
        ]);
        let mut init = DependencyInitializer::new();
        let report = init.run(&mut reg, &EventBus::new(), Utc::now());

        assert_eq!(report.blocked, vec![ComponentId::from("panels")]);
        assert!(report.failed.is_empty());
        let status = reg.status(&"panels".into()).unwrap();
        assert!(!status.is_active);
        assert_eq!(status.error_count, 0);
        assert_eq!(status.status_message, "Missing dependencies: missing");
    }

    #[test]
    fn test_probe_error_recorded_and_others_continue() {
        let mut reg = registry(vec![
            ComponentSpec::new(
                "audio",
                Priority::Normal,
                FallibleProbe(|| Err(ProbeError::new("no output device"))),
            ),
            ComponentSpec::new("analytics", Priority::Low, || true),
        ]);
        let mut init = DependencyInitializer::new();
        let report = init.run(&mut reg, &EventBus::new(), Utc::now());

        assert_eq!(report.failed, vec![ComponentId::from("audio")]);
        assert_eq!(report.initialized, vec![ComponentId::from("analytics")]);
        let audio = reg.status(&"audio".into()).unwrap();
        assert!(!audio.is_healthy);
        assert_eq!(audio.error_count, 1);
        assert_eq!(audio.status_message, "Initialization failed: no output device");
        // Optional tiers do not affect readiness.
        assert!(report.ready);
    }

    #[test]
    fn test_failed_required_component_blocks_readiness() {
        let mut reg = registry(vec![
            ComponentSpec::new("chemistry", Priority::Critical, || false),
            ComponentSpec::new("ui", Priority::High, || true).depends_on(["chemistry"]),
        ]);
        let mut init = DependencyInitializer::new();
        let report = init.run(&mut reg, &EventBus::new(), Utc::now());

        assert!(!report.ready);
        assert_eq!(report.failed, vec![ComponentId::from("chemistry")]);
        assert_eq!(report.blocked, vec![ComponentId::from("ui")]);
        assert_eq!(
            report.missing_required,
            vec![ComponentId::from("chemistry"), ComponentId::from("ui")]
        );
    }
}
