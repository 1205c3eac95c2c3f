//! # Component Model
//!
//! Identity, priority tier, and live status for every component the
//! orchestrator tracks. Descriptors are immutable once registered; status
//! records are mutated by the initializer and the health monitor.

use crate::probe::Probe;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Stable string identity of a component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub String);

impl ComponentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ComponentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Coarse ordering class controlling which initialization pass a component runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Normal,
    Low,
    Optional,
}

impl Priority {
    /// Critical and High components must initialize for the system to be ready.
    pub fn is_required(self) -> bool {
        matches!(self, Priority::Critical | Priority::High)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
            Priority::Optional => "optional",
        };
        f.write_str(name)
    }
}

/// Immutable registration record for a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    pub id: ComponentId,
    pub category: String,
    pub priority: Priority,
    pub dependencies: Vec<ComponentId>,
}

impl ComponentDescriptor {
    pub fn required(&self) -> bool {
        self.priority.is_required()
    }
}

/// Live status of a registered component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub is_active: bool,
    pub is_healthy: bool,
    pub error_count: u32,
    pub status_message: String,
    pub last_update: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
}

impl ComponentStatus {
    pub(crate) fn registered(now: DateTime<Utc>) -> Self {
        Self {
            is_active: false,
            is_healthy: true,
            error_count: 0,
            status_message: "Registered".to_string(),
            last_update: now,
            activated_at: None,
        }
    }

    /// Time since activation, or zero while inactive.
    pub fn uptime(&self, now: DateTime<Utc>) -> Duration {
        match (self.is_active, self.activated_at) {
            (true, Some(since)) => (now - since).to_std().unwrap_or_default(),
            _ => Duration::ZERO,
        }
    }

    pub(crate) fn activate(&mut self, now: DateTime<Utc>) {
        self.is_active = true;
        self.is_healthy = true;
        self.activated_at = Some(now);
        self.status_message = "Initialized".to_string();
        self.last_update = now;
    }

    pub(crate) fn record_failure(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.is_healthy = false;
        self.error_count += 1;
        self.status_message = message.into();
        self.last_update = now;
    }

    pub(crate) fn deactivate(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.is_active = false;
        self.activated_at = None;
        self.status_message = message.into();
        self.last_update = now;
    }
}

/// Everything needed to register a component: identity, tier, dependencies and probe.
///
/// ```rust
/// use orchestrator_core::{ComponentSpec, Priority};
///
/// let spec = ComponentSpec::new("safety", Priority::Critical, || true)
///     .category("protocols")
///     .depends_on(["chemistry"]);
/// assert_eq!(spec.dependencies.len(), 1);
/// ```
pub struct ComponentSpec {
    pub id: ComponentId,
    pub category: String,
    pub priority: Priority,
    pub dependencies: Vec<ComponentId>,
    pub probe: Box<dyn Probe>,
}

impl ComponentSpec {
    pub fn new(id: impl Into<ComponentId>, priority: Priority, probe: impl Probe + 'static) -> Self {
        Self {
            id: id.into(),
            category: "general".to_string(),
            priority,
            dependencies: Vec::new(),
            probe: Box::new(probe),
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn depends_on<I, D>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<ComponentId>,
    {
        self.dependencies.extend(dependencies.into_iter().map(Into::into));
        self
    }
}

impl fmt::Debug for ComponentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentSpec")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("priority", &self.priority)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_required_tiers() {
        assert!(Priority::Critical.is_required());
        assert!(Priority::High.is_required());
        assert!(!Priority::Normal.is_required());
        assert!(!Priority::Low.is_required());
        assert!(!Priority::Optional.is_required());
    }

    #[test]
    fn test_uptime_only_while_active() {
        let start = Utc::now();
        let mut status = ComponentStatus::registered(start);
        assert_eq!(status.uptime(start + TimeDelta::seconds(10)), Duration::ZERO);

        status.activate(start);
        assert_eq!(
            status.uptime(start + TimeDelta::seconds(10)),
            Duration::from_secs(10)
        );

        status.deactivate("Shutdown", start + TimeDelta::seconds(10));
        assert_eq!(status.uptime(start + TimeDelta::seconds(20)), Duration::ZERO);
    }
}
