//! Adapters that turn a [`warden_log::Logger`] into monitor callbacks.
//!
//! The logger contract (non-blocking enqueue, thread-safe writers) is what
//! lets these callbacks run inside the monitor's critical section.

use crate::monitor::{StateChangeCallback, UnhealthyCallback};
use std::sync::Arc;
use warden_log::Logger;

/// Build an `OnStateChange` callback that records transitions on a logger
pub fn state_change_logger(
    service: impl Into<String>,
    logger: Arc<dyn Logger>,
) -> StateChangeCallback {
    let service = service.into();
    Arc::new(move |listener, prev, new, result| {
        let from = prev.to_string();
        let to = new.to_string();
        let success = if result.success { "true" } else { "false" };
        let latency = format!("{:?}", result.latency);
        logger.info(
            &service,
            "listener-state-change",
            &format!("listener '{}' transitioned {} -> {}", listener, from, to),
            &[
                ("listener", listener),
                ("from", &from),
                ("to", &to),
                ("success", success),
                ("latency", &latency),
            ],
        );
    })
}

/// Build an `OnUnhealthy` callback that records restarts on a logger
pub fn unhealthy_logger(
    service: impl Into<String>,
    logger: Arc<dyn Logger>,
) -> UnhealthyCallback {
    let service = service.into();
    Arc::new(move |listener, reason| {
        logger.warn(
            &service,
            "listener-unhealthy",
            &format!("listener '{}' exhausted its failure budget: {}", listener, reason),
            &[("listener", listener), ("reason", reason)],
        );
    })
}
