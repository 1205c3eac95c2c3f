//! # Health Monitor
//!
//! Periodically re-runs the probe of every active component. Inactive
//! components are never evaluated, so their status is left as it was.

use crate::component::ComponentId;
use crate::events::{EventBus, OrchestratorEvent};
use crate::probe;
use crate::registry::ComponentRegistry;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HealthReport {
    pub checked: usize,
    pub unhealthy: Vec<ComponentId>,
    pub system_healthy: bool,
    /// Set when the aggregate flag flipped during this sweep.
    pub health_changed: bool,
}

#[derive(Debug)]
pub struct HealthMonitor {
    interval: Duration,
    enabled: bool,
    last_sweep: Option<DateTime<Utc>>,
    system_healthy: bool,
}

impl HealthMonitor {
    pub fn new(interval: Duration, enabled: bool) -> Self {
        Self {
            interval,
            enabled,
            last_sweep: None,
            system_healthy: true,
        }
    }

    /// Starts the interval clock; the first sweep is due one interval later.
    pub fn arm(&mut self, now: DateTime<Utc>) {
        self.last_sweep = Some(now);
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        if !self.enabled {
            return false;
        }
        match self.last_sweep {
            Some(last) => (now - last).to_std().unwrap_or_default() >= self.interval,
            None => true,
        }
    }

    pub fn sweep(
        &mut self,
        registry: &mut ComponentRegistry,
        events: &EventBus,
        now: DateTime<Utc>,
    ) -> HealthReport {
        self.last_sweep = Some(now);
        let mut report = HealthReport::default();

        for entry in registry.entries_mut().filter(|e| e.status.is_active) {
            report.checked += 1;
            let id = entry.descriptor.id.clone();
            match probe::invoke(entry.probe.as_ref()) {
                Ok(true) => {
                    entry.status.is_healthy = true;
                    entry.status.status_message = "Healthy".to_string();
                    entry.status.last_update = now;
                }
                outcome => {
                    if let Err(e) = &outcome {
                        debug!(component = %id, error = %e, "Probe error");
                    }
                    entry.status.record_failure("Not responding", now);
                    warn!(component = %id, errors = entry.status.error_count, "Component not responding");
                    report.unhealthy.push(id.clone());
                    events.emit(OrchestratorEvent::ComponentError {
                        id,
                        reason: "Not responding".to_string(),
                    });
                }
            }
        }

        report.system_healthy = report.unhealthy.is_empty();
        if report.system_healthy != self.system_healthy {
            report.health_changed = true;
            if report.system_healthy {
                info!("System health restored");
            } else {
                warn!(unhealthy = ?report.unhealthy, "System health degraded");
            }
        }
        self.system_healthy = report.system_healthy;
        debug!(checked = report.checked, healthy = report.system_healthy, "Health sweep complete");
        report
    }
}

/// Logical AND of `is_healthy` over active components.
pub fn aggregate_health(registry: &ComponentRegistry) -> bool {
    registry
        .iter()
        .filter(|(_, s)| s.is_active)
        .all(|(_, s)| s.is_healthy)
}
