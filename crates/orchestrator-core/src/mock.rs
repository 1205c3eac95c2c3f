//! # Test Doubles & Testing Guide
//!
//! Deterministic stand-ins for the three things an orchestrator depends on
//! from the outside world: time, component reachability and message receivers.
//!
//! | Double | Replaces | Typical use |
//! |--------|----------|-------------|
//! | [`ManualClock`] | [`SystemClock`](crate::clock::SystemClock) | Message expiry, health intervals, uptime |
//! | [`MockProbe`] | A real component's liveness check | Failing, recovering or erroring components |
//! | [`RecordingHandler`] | A real receiver hook | Asserting what was delivered and in which order |
//! | [`EventRecorder`] | A host's event observer | Asserting which notifications were raised |
//!
//! ## Testing Strategies
//!
//! <details>
//! <summary><b>Pattern 1: Synchronous core (fast, fully deterministic)</b></summary>
//!
//! Drive an [`Orchestrator`] directly, advancing a [`ManualClock`] between ticks.
//!
//! ```rust
//! use orchestrator_core::mock::{ManualClock, MockProbe, RecordingHandler};
//! use orchestrator_core::{ComponentSpec, Orchestrator, OrchestratorConfig, Priority};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut orchestrator = Orchestrator::with_clock(OrchestratorConfig::default(), Arc::new(clock.clone())).unwrap();
//!
//! let probe = MockProbe::reachable();
//! orchestrator.register(ComponentSpec::new("chemistry", Priority::Critical, probe.clone())).unwrap();
//! let inbox = RecordingHandler::new();
//! orchestrator.register_handler("chemistry", inbox.clone());
//! orchestrator.start_initialization().unwrap();
//!
//! orchestrator.send_message("ui", "chemistry", "mix", serde_json::json!({"a": 1})).unwrap();
//! clock.advance(Duration::from_millis(100));
//! orchestrator.tick();
//! assert_eq!(inbox.message_types(), vec!["mix"]);
//!
//! probe.set_reachable(false);
//! clock.advance(Duration::from_secs(5));
//! let report = orchestrator.tick();
//! assert!(!report.health.unwrap().system_healthy);
//! ```
//! </details>
//!
//! <details>
//! <summary><b>Pattern 2: Actor + client (async, end-to-end)</b></summary>
//!
//! Spawn an [`OrchestratorActor`](crate::OrchestratorActor) around an
//! orchestrator built with a [`ManualClock`] and use an explicit
//! `client.tick()` instead of waiting for the interval. See
//! `tests/integration_test.rs` for full examples.
//! </details>

use crate::clock::Clock;
use crate::envelope::SystemMessage;
use crate::error::ProbeError;
use crate::events::OrchestratorEvent;
use crate::events::EventKind;
use crate::orchestrator::Orchestrator;
use crate::probe::Probe;
use crate::router::MessageHandler;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// =============================================================================
// CLOCK
// =============================================================================

/// A clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Starts at the current wall-clock time.
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let delta = TimeDelta::from_std(by).unwrap_or(TimeDelta::MAX);
        let mut now = lock(&self.now);
        *now = now.checked_add_signed(delta).unwrap_or(*now);
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *lock(&self.now) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }
}

// =============================================================================
// PROBE
// =============================================================================

#[derive(Debug, Clone)]
enum ProbeAnswer {
    Reachable(bool),
    Fail(ProbeError),
}

/// A probe whose answer is set by the test. Clones share state, so keep one
/// clone and register the other.
#[derive(Debug, Clone)]
pub struct MockProbe {
    answer: Arc<Mutex<ProbeAnswer>>,
    calls: Arc<AtomicUsize>,
}

impl MockProbe {
    pub fn reachable() -> Self {
        Self::with_answer(ProbeAnswer::Reachable(true))
    }

    pub fn unreachable() -> Self {
        Self::with_answer(ProbeAnswer::Reachable(false))
    }

    fn with_answer(answer: ProbeAnswer) -> Self {
        Self {
            answer: Arc::new(Mutex::new(answer)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_reachable(&self, reachable: bool) {
        *lock(&self.answer) = ProbeAnswer::Reachable(reachable);
    }

    /// Makes every later check return `Err(error)`.
    pub fn fail_with(&self, error: ProbeError) {
        *lock(&self.answer) = ProbeAnswer::Fail(error);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Probe for MockProbe {
    fn check(&self) -> Result<bool, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &*lock(&self.answer) {
            ProbeAnswer::Reachable(reachable) => Ok(*reachable),
            ProbeAnswer::Fail(error) => Err(error.clone()),
        }
    }
}

// =============================================================================
// HANDLER
// =============================================================================

/// Records every delivered message in arrival order.
#[derive(Debug, Clone, Default)]
pub struct RecordingHandler {
    messages: Arc<Mutex<Vec<SystemMessage>>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<SystemMessage> {
        lock(&self.messages).clone()
    }

    pub fn message_types(&self) -> Vec<String> {
        lock(&self.messages)
            .iter()
            .map(|m| m.message_type.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.messages).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.messages).is_empty()
    }
}

impl MessageHandler for RecordingHandler {
    fn deliver(&mut self, message: &SystemMessage) {
        lock(&self.messages).push(message.clone());
    }
}

// =============================================================================
// EVENTS
// =============================================================================

/// Collects every event raised by an orchestrator it is attached to.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<OrchestratorEvent>>>,
}

impl EventRecorder {
    /// Subscribes a new recorder to all events of `orchestrator`.
    pub fn attach(orchestrator: &mut Orchestrator) -> Self {
        let recorder = Self::default();
        let sink = recorder.events.clone();
        orchestrator.subscribe(move |event| lock(&sink).push(event.clone()));
        recorder
    }

    pub fn events(&self) -> Vec<OrchestratorEvent> {
        lock(&self.events).clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        lock(&self.events).iter().map(OrchestratorEvent::kind).collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        lock(&self.events).iter().filter(|e| e.kind() == kind).count()
    }

    pub fn clear(&self) {
        lock(&self.events).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        let start = clock.now();
        other.advance(Duration::from_secs(3));
        assert_eq!(clock.now() - start, TimeDelta::seconds(3));
    }

    #[test]
    fn test_mock_probe_answers_and_counts() {
        let probe = MockProbe::reachable();
        assert_eq!(probe.check(), Ok(true));
        probe.set_reachable(false);
        assert_eq!(probe.check(), Ok(false));
        probe.fail_with(ProbeError::new("bus error"));
        assert_eq!(probe.check(), Err(ProbeError::new("bus error")));
        assert_eq!(probe.call_count(), 3);
    }
}
