//! # Message Router
//!
//! A bounded FIFO of [`SystemMessage`]s plus a dispatch step run once per tick.
//!
//! ## Backpressure
//!
//! The queue never grows past `capacity`. When it is full, a send is either
//! delivered synchronously ([`OverflowPolicy::ProcessImmediately`]) or handed
//! back to the caller as [`OrchestratorError::QueueFull`]
//! ([`OverflowPolicy::Reject`]). A submitted message is never silently dropped.
//!
//! ## Expiry
//!
//! Messages carry their creation timestamp. At dispatch, a message older than
//! the configured timeout is discarded without reaching its receiver and is
//! never retried.

use crate::component::ComponentId;
use crate::config::OrchestratorConfig;
use crate::envelope::SystemMessage;
use crate::error::{OrchestratorError, Result};
use crate::probe::panic_message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use tracing::{debug, error, warn};

/// What to do with a send that finds the queue full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    #[default]
    ProcessImmediately,
    Reject,
}

/// Receiver-side hook. The router decides *that* a message is delivered;
/// the handler owns what the payload means.
pub trait MessageHandler: Send {
    fn deliver(&mut self, message: &SystemMessage);
}

impl<F> MessageHandler for F
where
    F: FnMut(&SystemMessage) + Send,
{
    fn deliver(&mut self, message: &SystemMessage) {
        self(message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    NoHandler,
    HandlerFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Queued { queue_len: usize },
    ProcessedImmediately(Delivery),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RouterStats {
    pub sent: u64,
    pub queued: u64,
    pub processed_immediately: u64,
    pub delivered: u64,
    pub expired: u64,
    pub rejected: u64,
    pub undeliverable: u64,
    pub handler_failures: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub delivered: usize,
    pub expired: usize,
    pub undeliverable: usize,
    pub handler_failures: usize,
}

pub struct MessageRouter {
    queue: VecDeque<SystemMessage>,
    capacity: usize,
    timeout: Duration,
    routing_enabled: bool,
    overflow: OverflowPolicy,
    handlers: HashMap<ComponentId, Box<dyn MessageHandler>>,
    stats: RouterStats,
}

impl MessageRouter {
    pub fn new(capacity: usize, timeout: Duration) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity,
            timeout,
            routing_enabled: true,
            overflow: OverflowPolicy::default(),
            handlers: HashMap::new(),
            stats: RouterStats::default(),
        }
    }

    pub fn from_config(config: &OrchestratorConfig) -> Self {
        Self::new(config.max_queue_size, config.message_timeout())
            .with_routing_enabled(config.routing_enabled)
            .with_overflow_policy(config.overflow_policy)
    }

    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow = policy;
        self
    }

    /// With routing disabled every send is processed synchronously.
    pub fn with_routing_enabled(mut self, enabled: bool) -> Self {
        self.routing_enabled = enabled;
        self
    }

    /// Installs the hook for `receiver`, replacing any previous one.
    pub fn register_handler(&mut self, receiver: ComponentId, handler: Box<dyn MessageHandler>) {
        self.handlers.insert(receiver, handler);
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn stats(&self) -> RouterStats {
        self.stats
    }

    /// Drops every queued message, returning how many were discarded.
    pub fn clear(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }

    pub fn send(&mut self, message: SystemMessage) -> Result<SendOutcome> {
        self.stats.sent += 1;

        if self.routing_enabled && self.queue.len() < self.capacity {
            self.queue.push_back(message);
            self.stats.queued += 1;
            return Ok(SendOutcome::Queued {
                queue_len: self.queue.len(),
            });
        }

        if self.routing_enabled && self.overflow == OverflowPolicy::Reject {
            self.stats.rejected += 1;
            warn!(
                id = %message.id,
                receiver = %message.receiver,
                capacity = self.capacity,
                "Message queue full, rejecting"
            );
            return Err(OrchestratorError::QueueFull {
                capacity: self.capacity,
            });
        }

        debug!(id = %message.id, receiver = %message.receiver, "Processing message immediately");
        self.stats.processed_immediately += 1;
        Ok(SendOutcome::ProcessedImmediately(self.deliver(&message)))
    }

    /// Drains the queue in FIFO order, dropping expired messages.
    pub fn dispatch(&mut self, now: DateTime<Utc>) -> DispatchReport {
        let mut report = DispatchReport::default();
        let batch: Vec<SystemMessage> = self.queue.drain(..).collect();

        for message in batch {
            if message.is_expired(now, self.timeout) {
                warn!(
                    id = %message.id,
                    sender = %message.sender,
                    receiver = %message.receiver,
                    age_ms = message.age(now).as_millis() as u64,
                    "Message timed out"
                );
                self.stats.expired += 1;
                report.expired += 1;
                continue;
            }
            match self.deliver(&message) {
                Delivery::Delivered => report.delivered += 1,
                Delivery::NoHandler => report.undeliverable += 1,
                Delivery::HandlerFailed => report.handler_failures += 1,
            }
        }
        report
    }

    fn deliver(&mut self, message: &SystemMessage) -> Delivery {
        let Some(handler) = self.handlers.get_mut(&message.receiver) else {
            warn!(id = %message.id, receiver = %message.receiver, "No handler for receiver");
            self.stats.undeliverable += 1;
            return Delivery::NoHandler;
        };

        match panic::catch_unwind(AssertUnwindSafe(|| handler.deliver(message))) {
            Ok(()) => {
                debug!(id = %message.id, message_type = %message.message_type, receiver = %message.receiver, "Delivered");
                self.stats.delivered += 1;
                Delivery::Delivered
            }
            Err(payload) => {
                error!(
                    id = %message.id,
                    receiver = %message.receiver,
                    reason = %panic_message(payload.as_ref()),
                    "Message handler failed"
                );
                self.stats.handler_failures += 1;
                Delivery::HandlerFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn recording_router(capacity: usize) -> (MessageRouter, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut router = MessageRouter::new(capacity, Duration::from_secs(1));
        router.register_handler(
            "chemistry".into(),
            Box::new(move |m: &SystemMessage| sink.lock().unwrap().push(m.message_type.clone())),
        );
        (router, seen)
    }

    fn msg(kind: &str, at: DateTime<Utc>) -> SystemMessage {
        SystemMessage::new("ui", "chemistry", kind, json!(null), at)
    }

    #[test]
    fn test_dispatch_is_fifo_and_at_most_once() {
        let (mut router, seen) = recording_router(8);
        let now = Utc::now();
        for kind in ["a", "b", "c"] {
            router.send(msg(kind, now)).unwrap();
        }
        assert_eq!(router.dispatch(now).delivered, 3);
        assert_eq!(router.dispatch(now).delivered, 0);
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_expired_messages_are_dropped() {
        let (mut router, seen) = recording_router(8);
        let sent = Utc::now();
        router.send(msg("stale", sent)).unwrap();

        let report = router.dispatch(sent + TimeDelta::seconds(2));
        assert_eq!(report.expired, 1);
        assert_eq!(report.delivered, 0);
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(router.stats().expired, 1);
    }

    #[test]
    fn test_full_queue_spills_to_immediate_delivery() {
        let (mut router, seen) = recording_router(2);
        let now = Utc::now();
        assert!(matches!(router.send(msg("1", now)), Ok(SendOutcome::Queued { queue_len: 1 })));
        assert!(matches!(router.send(msg("2", now)), Ok(SendOutcome::Queued { queue_len: 2 })));
        assert_eq!(
            router.send(msg("3", now)).unwrap(),
            SendOutcome::ProcessedImmediately(Delivery::Delivered)
        );
        assert_eq!(*seen.lock().unwrap(), vec!["3"]);
        assert_eq!(router.queue_len(), 2);
    }

    #[test]
    fn test_full_queue_rejects_under_reject_policy() {
        let (router, seen) = recording_router(2);
        let mut router = router.with_overflow_policy(OverflowPolicy::Reject);
        let now = Utc::now();
        router.send(msg("1", now)).unwrap();
        router.send(msg("2", now)).unwrap();
        assert!(matches!(
            router.send(msg("3", now)),
            Err(OrchestratorError::QueueFull { capacity: 2 })
        ));
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(router.stats().rejected, 1);
        assert_eq!(router.dispatch(now).delivered, 2);
    }

    #[test]
    fn test_routing_disabled_delivers_synchronously() {
        let (router, seen) = recording_router(2);
        let mut router = router.with_routing_enabled(false);
        let outcome = router.send(msg("direct", Utc::now())).unwrap();
        assert_eq!(outcome, SendOutcome::ProcessedImmediately(Delivery::Delivered));
        assert_eq!(router.queue_len(), 0);
        assert_eq!(*seen.lock().unwrap(), vec!["direct"]);
    }

    #[test]
    fn test_missing_handler_and_panicking_handler_are_counted() {
        let mut router = MessageRouter::new(4, Duration::from_secs(1));
        router.register_handler(
            "audio".into(),
            Box::new(|_: &SystemMessage| panic!("speaker on fire")),
        );
        let now = Utc::now();
        router
            .send(SystemMessage::new("ui", "nobody", "ping", json!(1), now))
            .unwrap();
        router
            .send(SystemMessage::new("ui", "audio", "play", json!(2), now))
            .unwrap();

        let report = router.dispatch(now);
        assert_eq!(report.undeliverable, 1);
        assert_eq!(report.handler_failures, 1);
        assert_eq!(router.stats().delivered, 0);
    }
}
