//! # Reachability Probes
//!
//! Every component is registered with a probe answering "is the underlying
//! instance alive and constructed?". The orchestrator has no compile-time
//! knowledge of concrete component types; the probe is the only seam.
//!
//! Plain closures returning `bool` are probes. Closures that can fail with a
//! reason go through [`FallibleProbe`].
//!
//! ```rust
//! use orchestrator_core::probe::{FallibleProbe, Probe};
//! use orchestrator_core::ProbeError;
//!
//! let always_up = || true;
//! assert_eq!(always_up.check(), Ok(true));
//!
//! let broken = FallibleProbe(|| Err(ProbeError::new("device lost")));
//! assert!(broken.check().is_err());
//! ```

use crate::error::ProbeError;
use std::panic::{self, AssertUnwindSafe};

/// Answers whether a component instance is reachable.
///
/// Implementations must be idempotent and free of side effects visible to
/// the orchestrator.
pub trait Probe: Send + Sync {
    fn check(&self) -> Result<bool, ProbeError>;
}

impl<F> Probe for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn check(&self) -> Result<bool, ProbeError> {
        Ok(self())
    }
}

/// Adapts a closure that reports failure reasons.
pub struct FallibleProbe<F>(pub F);

impl<F> Probe for FallibleProbe<F>
where
    F: Fn() -> Result<bool, ProbeError> + Send + Sync,
{
    fn check(&self) -> Result<bool, ProbeError> {
        (self.0)()
    }
}

/// Runs a probe, turning a panic into a [`ProbeError`].
pub(crate) fn invoke(probe: &dyn Probe) -> Result<bool, ProbeError> {
    match panic::catch_unwind(AssertUnwindSafe(|| probe.check())) {
        Ok(result) => result,
        Err(payload) => Err(ProbeError::new(panic_message(payload.as_ref()))),
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panicking_probe_becomes_error() {
        let probe = || -> bool { panic!("instance destroyed") };
        let err = invoke(&probe).unwrap_err();
        assert!(err.0.contains("instance destroyed"));
    }

    #[test]
    fn test_fallible_probe_passes_reason_through() {
        let probe = FallibleProbe(|| Err(ProbeError::new("audio device missing")));
        assert_eq!(invoke(&probe), Err(ProbeError::new("audio device missing")));
    }
}
