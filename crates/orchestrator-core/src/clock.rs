//! Time source for timestamps, uptime, health intervals and message expiry.
//!
//! Production code uses [`SystemClock`]; tests drive
//! [`ManualClock`](crate::mock::ManualClock) forward explicitly.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
