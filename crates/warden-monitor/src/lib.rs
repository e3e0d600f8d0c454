//! Warden Monitor - Probe orchestration for the warden supervisor
//!
//! The monitor owns a set of probe bindings, runs one cancellable probe
//! loop per bound listener, evaluates outcomes through a pure hysteresis
//! function, drives legal listener state transitions and fans results out
//! to an events sink, logging callbacks and the supervisor's restart
//! callback.

pub mod error;
pub mod evaluator;
pub mod logging;
pub mod mock;
pub mod monitor;
pub mod traits;

// Re-export primary types
pub use error::{MonitorError, Result};
pub use evaluator::{evaluate, ProbeEvaluation};
pub use logging::{state_change_logger, unhealthy_logger};
pub use monitor::{
    HealthyCallback, MonitorConfig, ProbeMonitor, StateChangeCallback, UnhealthyCallback,
};
pub use traits::{Prober, ProberFactory};
