//! # Notifications
//!
//! The orchestrator raises one [`OrchestratorEvent`] per notable outcome.
//! Subscribers are either synchronous observers, invoked in subscription order
//! on the control loop, or async consumers reading a `broadcast` channel.
//!
//! A panicking observer is logged and skipped; it never aborts the operation
//! that emitted the event, and later observers still run.

use crate::component::ComponentId;
use crate::probe::panic_message;
use crate::state::SystemState;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use tokio::sync::broadcast;
use tracing::error;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrchestratorEvent {
    ComponentRegistered { id: ComponentId },
    ComponentInitialized { id: ComponentId },
    ComponentError { id: ComponentId, reason: String },
    SystemInitialized,
    SystemReady,
    SystemError { message: String },
    StateChanged { state: SystemState },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ComponentRegistered,
    ComponentInitialized,
    ComponentError,
    SystemInitialized,
    SystemReady,
    SystemError,
    StateChanged,
}

impl OrchestratorEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ComponentRegistered { .. } => EventKind::ComponentRegistered,
            Self::ComponentInitialized { .. } => EventKind::ComponentInitialized,
            Self::ComponentError { .. } => EventKind::ComponentError,
            Self::SystemInitialized => EventKind::SystemInitialized,
            Self::SystemReady => EventKind::SystemReady,
            Self::SystemError { .. } => EventKind::SystemError,
            Self::StateChanged { .. } => EventKind::StateChanged,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn Fn(&OrchestratorEvent) + Send + Sync>;

struct Observer {
    id: SubscriptionId,
    kind: Option<EventKind>,
    callback: Callback,
}

pub struct EventBus {
    observers: Vec<Observer>,
    next_id: u64,
    sender: broadcast::Sender<OrchestratorEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            observers: Vec::new(),
            next_id: 1,
            sender,
        }
    }

    /// Observes every event.
    pub fn subscribe(
        &mut self,
        callback: impl Fn(&OrchestratorEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.add(None, Box::new(callback))
    }

    /// Observes one kind of event.
    pub fn subscribe_kind(
        &mut self,
        kind: EventKind,
        callback: impl Fn(&OrchestratorEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.add(Some(kind), Box::new(callback))
    }

    /// Returns whether a subscription was removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.id != id);
        self.observers.len() != before
    }

    pub fn subscribe_channel(&self) -> broadcast::Receiver<OrchestratorEvent> {
        self.sender.subscribe()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn emit(&self, event: OrchestratorEvent) {
        let kind = event.kind();
        for observer in &self.observers {
            if observer.kind.is_some_and(|k| k != kind) {
                continue;
            }
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| (observer.callback)(&event))) {
                error!(
                    subscription = observer.id.0,
                    ?kind,
                    reason = %panic_message(payload.as_ref()),
                    "Event observer failed"
                );
            }
        }
        // No receivers is fine.
        let _ = self.sender.send(event);
    }

    fn add(&mut self, kind: Option<EventKind>, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push(Observer { id, kind, callback });
        id
    }
}
