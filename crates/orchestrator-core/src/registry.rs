//! # Component Registry
//!
//! Stores descriptors, live status records and probes in registration order.
//! The registry never invokes probes itself; the initializer and health
//! monitor do.

use crate::component::{ComponentDescriptor, ComponentId, ComponentSpec, ComponentStatus};
use crate::error::{OrchestratorError, Result};
use crate::probe::Probe;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, warn};

pub(crate) struct Entry {
    pub(crate) descriptor: ComponentDescriptor,
    pub(crate) status: ComponentStatus,
    pub(crate) probe: Box<dyn Probe>,
}

/// Registration-ordered table of components.
#[derive(Default)]
pub struct ComponentRegistry {
    entries: Vec<Entry>,
    index: HashMap<ComponentId, usize>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a component. A duplicate id leaves the existing entry untouched.
    pub fn register(&mut self, spec: ComponentSpec, now: DateTime<Utc>) -> Result<&ComponentDescriptor> {
        if self.index.contains_key(&spec.id) {
            warn!(component = %spec.id, "Component already registered, ignoring");
            return Err(OrchestratorError::DuplicateComponent(spec.id));
        }

        let descriptor = ComponentDescriptor {
            id: spec.id.clone(),
            category: spec.category,
            priority: spec.priority,
            dependencies: spec.dependencies,
        };
        debug!(component = %descriptor.id, priority = %descriptor.priority, deps = ?descriptor.dependencies, "Registered");

        let position = self.entries.len();
        self.index.insert(spec.id, position);
        self.entries.push(Entry {
            descriptor,
            status: ComponentStatus::registered(now),
            probe: spec.probe,
        });
        Ok(&self.entries[position].descriptor)
    }

    pub fn contains(&self, id: &ComponentId) -> bool {
        self.index.contains_key(id)
    }

    pub fn descriptor(&self, id: &ComponentId) -> Option<&ComponentDescriptor> {
        self.entry(id).map(|e| &e.descriptor)
    }

    pub fn status(&self, id: &ComponentId) -> Option<&ComponentStatus> {
        self.entry(id).map(|e| &e.status)
    }

    /// Descriptors and status in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&ComponentDescriptor, &ComponentStatus)> {
        self.entries.iter().map(|e| (&e.descriptor, &e.status))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entry(&self, id: &ComponentId) -> Option<&Entry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut Entry> {
        self.entries.iter_mut()
    }

    pub(crate) fn entry_at_mut(&mut self, position: usize) -> &mut Entry {
        &mut self.entries[position]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Priority;

    #[test]
    fn test_register_creates_initial_status() {
        let mut registry = ComponentRegistry::new();
        let now = Utc::now();
        registry
            .register(ComponentSpec::new("chemistry", Priority::Critical, || true), now)
            .unwrap();

        let id = ComponentId::from("chemistry");
        let status = registry.status(&id).unwrap();
        assert!(!status.is_active);
        assert!(status.is_healthy);
        assert_eq!(status.error_count, 0);
        assert_eq!(status.status_message, "Registered");
        assert!(registry.descriptor(&id).unwrap().required());
    }

    #[test]
    fn test_duplicate_keeps_original() {
        let mut registry = ComponentRegistry::new();
        let now = Utc::now();
        registry
            .register(
                ComponentSpec::new("ui", Priority::High, || true).category("panels"),
                now,
            )
            .unwrap();

        let err = registry
            .register(
                ComponentSpec::new("ui", Priority::Optional, || false).category("other"),
                now,
            )
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::DuplicateComponent(id) if id.as_str() == "ui"));

        assert_eq!(registry.len(), 1);
        let descriptor = registry.descriptor(&"ui".into()).unwrap();
        assert_eq!(descriptor.category, "panels");
        assert_eq!(descriptor.priority, Priority::High);
    }

    #[test]
    fn test_unknown_ids_read_as_none() {
        let registry = ComponentRegistry::new();
        assert!(registry.status(&"ghost".into()).is_none());
        assert!(registry.descriptor(&"ghost".into()).is_none());
        assert_eq!(registry.iter().count(), 0);
    }

    #[test]
    fn test_iter_keeps_registration_order() {
        let mut registry = ComponentRegistry::new();
        let now = Utc::now();
        for id in ["c", "a", "b"] {
            registry
                .register(ComponentSpec::new(id, Priority::Normal, || true), now)
                .unwrap();
        }
        let ids: Vec<_> = registry.iter().map(|(d, _)| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
