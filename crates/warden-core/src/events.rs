use crate::health::HealthStatus;
use crate::probe::CheckResult;
use serde::{Deserialize, Serialize};

/// An event emitted by the monitor on an observable status transition
///
/// Delivery is best-effort: the monitor uses a non-blocking send and drops
/// the event when the sink is saturated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthEvent {
    /// Name of the listener that transitioned
    pub listener: String,
    /// Status the listener transitioned into
    pub status: HealthStatus,
    /// Snapshot of the probe result that drove the transition
    pub result: CheckResult,
}

impl HealthEvent {
    pub fn new(listener: impl Into<String>, status: HealthStatus, result: CheckResult) -> Self {
        Self {
            listener: listener.into(),
            status,
            result,
        }
    }

    /// Create a healthy event
    pub fn healthy(listener: impl Into<String>, result: CheckResult) -> Self {
        Self::new(listener, HealthStatus::Healthy, result)
    }

    /// Create an unhealthy event
    pub fn unhealthy(listener: impl Into<String>, result: CheckResult) -> Self {
        Self::new(listener, HealthStatus::Unhealthy, result)
    }
}
