//! # Message Envelope
//!
//! The unit routed between components. The payload is opaque to the
//! orchestrator. All fields, including the original timestamp, serialize
//! verbatim so timeout evaluation stays correct across a process boundary.

use crate::component::ComponentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMessage {
    pub id: Uuid,
    pub sender: ComponentId,
    pub receiver: ComponentId,
    pub message_type: String,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl SystemMessage {
    pub fn new(
        sender: impl Into<ComponentId>,
        receiver: impl Into<ComponentId>,
        message_type: impl Into<String>,
        payload: serde_json::Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: sender.into(),
            receiver: receiver.into(),
            message_type: message_type.into(),
            payload,
            timestamp,
        }
    }

    /// Age at `now`; zero if `now` precedes the timestamp.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.timestamp).to_std().unwrap_or_default()
    }

    pub fn is_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        self.age(now) > timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use serde_json::json;

    #[test]
    fn test_expiry_is_strictly_greater_than_timeout() {
        let sent = Utc::now();
        let msg = SystemMessage::new("ui", "chemistry", "mix", json!({}), sent);
        let timeout = Duration::from_secs(1);

        assert!(!msg.is_expired(sent, timeout));
        assert!(!msg.is_expired(sent + TimeDelta::seconds(1), timeout));
        assert!(msg.is_expired(sent + TimeDelta::milliseconds(1001), timeout));
    }

    #[test]
    fn test_envelope_survives_serialization() {
        let msg = SystemMessage::new(
            "safety",
            "ui",
            "alert",
            json!({ "level": "high", "panel": "goggles" }),
            Utc::now(),
        );
        let wire = serde_json::to_string(&msg).unwrap();
        let back: SystemMessage = serde_json::from_str(&wire).unwrap();
        assert_eq!(back, msg);
    }
}
