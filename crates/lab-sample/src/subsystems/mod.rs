//! # Simulated Lab Subsystems
//!
//! The real subsystems (reaction engine, UI panels, audio mixer, ...) live
//! elsewhere. Here each one is reduced to what the orchestrator can observe:
//! whether its instance is reachable, and which messages it received.

use orchestrator_core::probe::Probe;
use orchestrator_core::{ComponentSpec, MessageHandler, Priority, SystemMessage};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Static description of one standard lab subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blueprint {
    pub id: &'static str,
    pub category: &'static str,
    pub priority: Priority,
    pub dependencies: &'static [&'static str],
}

/// The standard lab, in registration order.
pub const STANDARD_LAB: &[Blueprint] = &[
    Blueprint {
        id: "chemistry",
        category: "simulation",
        priority: Priority::Critical,
        dependencies: &[],
    },
    Blueprint {
        id: "safety",
        category: "protocols",
        priority: Priority::Critical,
        dependencies: &["chemistry"],
    },
    Blueprint {
        id: "ui",
        category: "presentation",
        priority: Priority::High,
        dependencies: &["chemistry"],
    },
    Blueprint {
        id: "localization",
        category: "presentation",
        priority: Priority::High,
        dependencies: &[],
    },
    Blueprint {
        id: "audio",
        category: "media",
        priority: Priority::Normal,
        dependencies: &["ui"],
    },
    Blueprint {
        id: "analytics",
        category: "telemetry",
        priority: Priority::Low,
        dependencies: &["ui"],
    },
    Blueprint {
        id: "multiplayer",
        category: "network",
        priority: Priority::Optional,
        dependencies: &["analytics"],
    },
];

/// A simulated subsystem instance. Clones share the same switch and inbox.
#[derive(Debug, Clone)]
pub struct LabSubsystem {
    blueprint: Blueprint,
    alive: Arc<AtomicBool>,
    inbox: Arc<Mutex<Vec<SystemMessage>>>,
}

impl LabSubsystem {
    pub fn new(blueprint: Blueprint) -> Self {
        Self {
            blueprint,
            alive: Arc::new(AtomicBool::new(true)),
            inbox: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn id(&self) -> &'static str {
        self.blueprint.id
    }

    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Simulates the instance going away (`false`) or coming back (`true`).
    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::SeqCst);
    }

    pub fn inbox(&self) -> Vec<SystemMessage> {
        self.inbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn probe(&self) -> impl Probe + 'static {
        let alive = self.alive.clone();
        move || alive.load(Ordering::SeqCst)
    }

    pub fn handler(&self) -> impl MessageHandler + 'static {
        let inbox = self.inbox.clone();
        move |message: &SystemMessage| {
            inbox
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(message.clone());
        }
    }

    /// Registration spec wired to this instance's probe.
    pub fn spec(&self) -> ComponentSpec {
        ComponentSpec::new(self.blueprint.id, self.blueprint.priority, self.probe())
            .category(self.blueprint.category)
            .depends_on(self.blueprint.dependencies.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_probe_follows_alive_switch() {
        let audio = LabSubsystem::new(STANDARD_LAB[4]);
        let probe = audio.probe();
        assert_eq!(probe.check(), Ok(true));
        audio.set_alive(false);
        assert_eq!(probe.check(), Ok(false));
    }

    #[test]
    fn test_handler_fills_inbox() {
        let chemistry = LabSubsystem::new(STANDARD_LAB[0]);
        let mut handler = chemistry.handler();
        handler.deliver(&SystemMessage::new("ui", "chemistry", "reaction.start", json!({}), Utc::now()));
        assert_eq!(chemistry.inbox()[0].message_type, "reaction.start");
    }

    #[test]
    fn test_standard_lab_dependencies_are_registered_earlier() {
        for (position, blueprint) in STANDARD_LAB.iter().enumerate() {
            for dependency in blueprint.dependencies {
                assert!(STANDARD_LAB[..position].iter().any(|b| b.id == *dependency));
            }
        }
    }
}
