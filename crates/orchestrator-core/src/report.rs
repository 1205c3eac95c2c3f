//! Serializable snapshots of orchestrator state for hosts and dashboards.

use crate::component::{ComponentDescriptor, ComponentId, ComponentStatus, Priority};
use crate::health::HealthReport;
use crate::router::{DispatchReport, RouterStats};
use crate::state::SystemState;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSummary {
    pub id: ComponentId,
    pub category: String,
    pub priority: Priority,
    pub required: bool,
    pub dependencies: Vec<ComponentId>,
    pub is_active: bool,
    pub is_healthy: bool,
    pub error_count: u32,
    pub status_message: String,
    pub last_update: DateTime<Utc>,
    pub uptime_secs: f64,
}

impl ComponentSummary {
    pub(crate) fn new(
        descriptor: &ComponentDescriptor,
        status: &ComponentStatus,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: descriptor.id.clone(),
            category: descriptor.category.clone(),
            priority: descriptor.priority,
            required: descriptor.required(),
            dependencies: descriptor.dependencies.clone(),
            is_active: status.is_active,
            is_healthy: status.is_healthy,
            error_count: status.error_count,
            status_message: status.status_message.clone(),
            last_update: status.last_update,
            uptime_secs: status.uptime(now).as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemReport {
    pub generated_at: DateTime<Utc>,
    pub state: SystemState,
    pub ready: bool,
    pub healthy: bool,
    pub total_components: usize,
    pub active_components: usize,
    pub healthy_components: usize,
    pub queue_len: usize,
    pub router: RouterStats,
    pub components: Vec<ComponentSummary>,
}

/// What one call to [`Orchestrator::tick`](crate::Orchestrator::tick) did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub health: Option<HealthReport>,
    pub dispatch: Option<DispatchReport>,
}
