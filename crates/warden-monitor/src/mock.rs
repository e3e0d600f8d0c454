//! Mock probers, factories and listeners for testing the monitor without
//! real network endpoints.

use crate::error::{MonitorError, Result};
use crate::traits::{Prober, ProberFactory};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use warden_core::{CheckResult, CoreError, ListenerState, Listener, ProbeKind, ProbeTarget};

/// Prober that plays back a scripted sequence of results
///
/// Once the script is exhausted it keeps returning the fallback result, so
/// loop-driven tests stay in a stable final state.
pub struct ScriptedProber {
    kind: ProbeKind,
    script: Mutex<VecDeque<CheckResult>>,
    fallback: CheckResult,
    calls: AtomicU32,
}

impl ScriptedProber {
    /// A prober that always succeeds quickly
    pub fn healthy() -> Self {
        Self::with_script(Vec::new(), CheckResult::ok(Duration::from_millis(1)))
    }

    /// A prober that always fails with the given error
    pub fn failing(error: impl Into<String>) -> Self {
        Self::with_script(
            Vec::new(),
            CheckResult::failure(Duration::from_millis(1), error),
        )
    }

    pub fn with_script(script: Vec<CheckResult>, fallback: CheckResult) -> Self {
        Self {
            kind: ProbeKind::Tcp,
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicU32::new(0),
        }
    }

    /// How many probes have run
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn check(&self, _scope: &CancellationToken, _target: &ProbeTarget) -> CheckResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn kind(&self) -> ProbeKind {
        self.kind
    }
}

/// Prober that ignores its cancellation scope and blocks for a fixed delay
///
/// Simulates the misbehaving prober the monitor must still stop promptly.
pub struct BlockingProber {
    delay: Duration,
    calls: AtomicU32,
}

impl BlockingProber {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for BlockingProber {
    async fn check(&self, _scope: &CancellationToken, _target: &ProbeTarget) -> CheckResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        CheckResult::ok(self.delay)
    }

    fn kind(&self) -> ProbeKind {
        ProbeKind::Tcp
    }
}

/// Factory that hands out one shared prober regardless of kind
pub struct MockFactory {
    prober: Arc<dyn Prober>,
}

impl MockFactory {
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self { prober }
    }
}

impl ProberFactory for MockFactory {
    fn create(&self, _kind: ProbeKind, _timeout: Duration) -> Result<Arc<dyn Prober>> {
        Ok(self.prober.clone())
    }
}

/// Factory that refuses every creation request
pub struct FailingFactory {
    message: String,
}

impl FailingFactory {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl ProberFactory for FailingFactory {
    fn create(&self, kind: ProbeKind, _timeout: Duration) -> Result<Arc<dyn Prober>> {
        Err(MonitorError::prober_creation(
            kind.to_string(),
            self.message.clone(),
        ))
    }
}

/// Listener wedged in a fixed state that refuses every transition
pub struct WedgedListener {
    name: String,
    state: ListenerState,
}

impl WedgedListener {
    pub fn new(name: impl Into<String>, state: ListenerState) -> Self {
        Self {
            name: name.into(),
            state,
        }
    }
}

impl Listener for WedgedListener {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> ListenerState {
        self.state
    }

    fn host(&self) -> String {
        "127.0.0.1".to_string()
    }

    fn port(&self) -> u16 {
        0
    }

    fn mark_listening(&self) -> warden_core::Result<()> {
        Err(CoreError::invalid_transition(
            self.name.clone(),
            self.state.to_string(),
            ListenerState::Listening.to_string(),
        ))
    }

    fn mark_ready(&self) -> warden_core::Result<()> {
        Err(CoreError::invalid_transition(
            self.name.clone(),
            self.state.to_string(),
            ListenerState::Ready.to_string(),
        ))
    }

    fn close(&self) -> warden_core::Result<()> {
        Err(CoreError::invalid_transition(
            self.name.clone(),
            self.state.to_string(),
            ListenerState::Closed.to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_prober_plays_script_then_fallback() {
        let prober = ScriptedProber::with_script(
            vec![CheckResult::failure(Duration::from_millis(1), "boom")],
            CheckResult::ok(Duration::from_millis(1)),
        );
        let scope = CancellationToken::new();
        let target = ProbeTarget::default();

        let first = prober.check(&scope, &target).await;
        assert!(!first.success);
        let second = prober.check(&scope, &target).await;
        assert!(second.success);
        assert_eq!(prober.calls(), 2);
    }

    #[test]
    fn test_wedged_listener_refuses_everything() {
        let listener = WedgedListener::new("stuck", ListenerState::Closed);
        assert!(listener.mark_listening().is_err());
        assert!(listener.mark_ready().is_err());
        assert_eq!(listener.state(), ListenerState::Closed);
    }
}
