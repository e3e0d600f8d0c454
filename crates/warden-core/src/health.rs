use crate::listener::ListenerState;
use crate::probe::CheckResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Derived health of a listener or of the whole process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Degraded,
    Unknown,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Supervisor-reported state of the monitored process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessState {
    Running,
    Stopped,
    Failed,
}

impl std::fmt::Display for ProcessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProcessState::Running => "running",
            ProcessState::Stopped => "stopped",
            ProcessState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Per-listener probe bookkeeping
///
/// At most one of the two counters is non-zero at any observation point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerHealth {
    pub name: String,
    pub state: ListenerState,
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,
    pub last_result: Option<CheckResult>,
}

impl ListenerHealth {
    pub fn new(name: impl Into<String>, state: ListenerState) -> Self {
        Self {
            name: name.into(),
            state,
            consecutive_successes: 0,
            consecutive_failures: 0,
            last_result: None,
        }
    }

    /// A listener is unhealthy from the aggregate's point of view until it
    /// has reached Ready
    pub fn is_unhealthy(&self) -> bool {
        self.state != ListenerState::Ready
    }
}

/// The monitor's externally exposed view
///
/// Copies handed out by the monitor are deep: every listener entry and its
/// last result are owned by the copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedHealth {
    pub process_state: ProcessState,
    pub custom_status: String,
    /// Most recent probe latency observed across all listeners
    pub latency: Duration,
    pub listeners: Vec<ListenerHealth>,
}

impl AggregatedHealth {
    pub fn new() -> Self {
        Self {
            process_state: ProcessState::Stopped,
            custom_status: String::new(),
            latency: Duration::ZERO,
            listeners: Vec::new(),
        }
    }
}

impl Default for AggregatedHealth {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_listener_health_has_zero_counters() {
        let health = ListenerHealth::new("web", ListenerState::Closed);
        assert_eq!(health.consecutive_successes, 0);
        assert_eq!(health.consecutive_failures, 0);
        assert!(health.last_result.is_none());
    }

    #[test]
    fn test_unhealthy_until_ready() {
        assert!(ListenerHealth::new("a", ListenerState::Closed).is_unhealthy());
        assert!(ListenerHealth::new("b", ListenerState::Listening).is_unhealthy());
        assert!(!ListenerHealth::new("c", ListenerState::Ready).is_unhealthy());
    }

    #[test]
    fn test_aggregated_health_defaults() {
        let health = AggregatedHealth::new();
        assert_eq!(health.process_state, ProcessState::Stopped);
        assert_eq!(health.latency, Duration::ZERO);
        assert!(health.custom_status.is_empty());
        assert!(health.listeners.is_empty());
    }

    #[test]
    fn test_status_serde_roundtrip() {
        let json = serde_json::to_string(&HealthStatus::Degraded).unwrap();
        assert_eq!(json, "\"degraded\"");
        let back: HealthStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, HealthStatus::Degraded);
    }
}
