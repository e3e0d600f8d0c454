use crate::error::{MonitorError, Result};
use crate::evaluator::evaluate;
use crate::traits::{Prober, ProberFactory};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};
use warden_core::{
    normalize_threshold, AggregatedHealth, CheckResult, HealthEvent, HealthStatus, Listener,
    ListenerHealth, ListenerState, ProbeBinding, ProcessState,
};

/// Invoked on every state transition the monitor drives
pub type StateChangeCallback =
    Arc<dyn Fn(&str, ListenerState, ListenerState, &CheckResult) + Send + Sync>;
/// Invoked when a listener's failure budget is exhausted or it leaves Ready
pub type UnhealthyCallback = Arc<dyn Fn(&str, &str) + Send + Sync>;
/// Invoked when a listener reaches Ready
pub type HealthyCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Configuration for the probe monitor
///
/// Everything is optional except the defaults: without a factory no probe
/// can be bound, without an events sink transitions are not published, and
/// absent callbacks are simply skipped.
pub struct MonitorConfig {
    pub factory: Option<Arc<dyn ProberFactory>>,
    pub events: Option<mpsc::Sender<HealthEvent>>,
    /// Used when a binding carries no interval
    pub default_interval: Duration,
    /// Used when a binding carries no timeout
    pub default_timeout: Duration,
    pub on_state_change: Option<StateChangeCallback>,
    pub on_unhealthy: Option<UnhealthyCallback>,
    pub on_healthy: Option<HealthyCallback>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            factory: None,
            events: None,
            default_interval: Duration::from_secs(10),
            default_timeout: Duration::from_secs(5),
            on_state_change: None,
            on_unhealthy: None,
            on_healthy: None,
        }
    }
}

impl MonitorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_factory(mut self, factory: Arc<dyn ProberFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn with_events(mut self, events: mpsc::Sender<HealthEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_defaults(mut self, interval: Duration, timeout: Duration) -> Self {
        self.default_interval = interval;
        self.default_timeout = timeout;
        self
    }

    pub fn with_on_state_change(mut self, callback: StateChangeCallback) -> Self {
        self.on_state_change = Some(callback);
        self
    }

    pub fn with_on_unhealthy(mut self, callback: UnhealthyCallback) -> Self {
        self.on_unhealthy = Some(callback);
        self
    }

    pub fn with_on_healthy(mut self, callback: HealthyCallback) -> Self {
        self.on_healthy = Some(callback);
        self
    }
}

/// A tracked listener together with its optional binding and prober
#[derive(Clone)]
struct BoundListener {
    listener: Arc<dyn Listener>,
    binding: Option<ProbeBinding>,
    prober: Option<Arc<dyn Prober>>,
}

/// Mutable state behind the monitor's single readers/writer lock
struct MonitorState {
    listeners: Vec<BoundListener>,
    statuses: HashMap<String, ListenerHealth>,
    process_state: ProcessState,
    custom_status: String,
    latency: Duration,
    running: bool,
    stop: Option<CancellationToken>,
    tasks: Option<TaskTracker>,
}

/// Runs one probe loop per bound listener, aggregates outcomes into a
/// health snapshot, drives legal listener transitions and fans results out
/// to the events sink and the configured callbacks.
pub struct ProbeMonitor {
    factory: Option<Arc<dyn ProberFactory>>,
    events: Option<mpsc::Sender<HealthEvent>>,
    default_interval: Duration,
    default_timeout: Duration,
    on_state_change: Option<StateChangeCallback>,
    on_unhealthy: Option<UnhealthyCallback>,
    on_healthy: Option<HealthyCallback>,
    state: RwLock<MonitorState>,
}

impl ProbeMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            factory: config.factory,
            events: config.events,
            default_interval: config.default_interval,
            default_timeout: config.default_timeout,
            on_state_change: config.on_state_change,
            on_unhealthy: config.on_unhealthy,
            on_healthy: config.on_healthy,
            state: RwLock::new(MonitorState {
                listeners: Vec::new(),
                statuses: HashMap::new(),
                process_state: ProcessState::Stopped,
                custom_status: String::new(),
                latency: Duration::ZERO,
                running: false,
                stop: None,
                tasks: None,
            }),
        }
    }

    /// Track a listener without probing it
    pub fn add_listener(&self, listener: Arc<dyn Listener>) {
        let mut state = self.state.write().expect("monitor lock poisoned");
        state.listeners.push(BoundListener {
            listener,
            binding: None,
            prober: None,
        });
    }

    /// Track a listener and create a prober for its binding
    pub fn add_listener_with_binding(
        &self,
        listener: Arc<dyn Listener>,
        binding: ProbeBinding,
    ) -> Result<()> {
        let factory = self.factory.as_ref().ok_or(MonitorError::FactoryMissing)?;
        let timeout = if binding.config.timeout > Duration::ZERO {
            binding.config.timeout
        } else {
            self.default_timeout
        };
        let prober = factory
            .create(binding.kind, timeout)
            .map_err(|e| MonitorError::prober_creation(listener.name(), e.to_string()))?;

        let mut state = self.state.write().expect("monitor lock poisoned");
        state.listeners.push(BoundListener {
            listener,
            binding: Some(binding),
            prober: Some(prober),
        });
        Ok(())
    }

    pub fn set_process_state(&self, process_state: ProcessState) {
        let mut state = self.state.write().expect("monitor lock poisoned");
        state.process_state = process_state;
    }

    pub fn set_custom_status(&self, custom_status: impl Into<String>) {
        let mut state = self.state.write().expect("monitor lock poisoned");
        state.custom_status = custom_status.into();
    }

    /// Spawn one probe loop per bound listener
    ///
    /// Idempotent: calling while running is a no-op. Each start arms a
    /// fresh stop signal and task group, so the monitor can be restarted
    /// after `stop`.
    pub fn start(self: &Arc<Self>, token: CancellationToken) {
        let (entries, stop, tasks) = {
            let mut state = self.state.write().expect("monitor lock poisoned");
            if state.running {
                debug!("probe monitor already running");
                return;
            }
            state.running = true;
            let stop = CancellationToken::new();
            let tasks = TaskTracker::new();
            state.stop = Some(stop.clone());
            state.tasks = Some(tasks.clone());

            let entries: Vec<(Arc<dyn Listener>, ProbeBinding, Arc<dyn Prober>)> = state
                .listeners
                .iter()
                .filter_map(|bound| match (&bound.binding, &bound.prober) {
                    (Some(binding), Some(prober)) => {
                        Some((bound.listener.clone(), binding.clone(), prober.clone()))
                    }
                    _ => None,
                })
                .collect();
            (entries, stop, tasks)
        };

        // Spawning happens outside the lock
        for (listener, binding, prober) in entries {
            let monitor = Arc::clone(self);
            let stop = stop.clone();
            let parent = token.clone();
            tasks.spawn(async move {
                monitor
                    .probe_loop(listener, binding, prober, stop, parent)
                    .await;
            });
        }
    }

    /// Signal all probe loops and wait until every one has terminated
    ///
    /// Idempotent: calling while stopped is a no-op.
    pub async fn stop(&self) {
        let (stop, tasks) = {
            let mut state = self.state.write().expect("monitor lock poisoned");
            if !state.running {
                return;
            }
            state.running = false;
            (state.stop.take(), state.tasks.take())
        };
        if let Some(stop) = stop {
            stop.cancel();
        }
        if let Some(tasks) = tasks {
            tasks.close();
            tasks.wait().await;
        }
        debug!("probe monitor stopped");
    }

    /// Derived aggregate status
    ///
    /// Unknown until any probe has reported; then Stopped/Failed process
    /// states force Unhealthy; then the unhealthy count across reporting
    /// listeners decides between Unhealthy, Degraded and Healthy.
    pub fn status(&self) -> HealthStatus {
        let state = self.state.read().expect("monitor lock poisoned");
        if state.statuses.is_empty() {
            return HealthStatus::Unknown;
        }
        if state.process_state != ProcessState::Running {
            return HealthStatus::Unhealthy;
        }
        let unhealthy = state.statuses.values().filter(|s| s.is_unhealthy()).count();
        if unhealthy == 0 {
            HealthStatus::Healthy
        } else if unhealthy == state.statuses.len() {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Degraded
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status() == HealthStatus::Healthy
    }

    /// Most recent probe latency observed
    pub fn latency(&self) -> Duration {
        let state = self.state.read().expect("monitor lock poisoned");
        state.latency
    }

    /// Deep copy of the aggregated health view
    pub fn health(&self) -> AggregatedHealth {
        let state = self.state.read().expect("monitor lock poisoned");
        let mut listeners: Vec<ListenerHealth> = state.statuses.values().cloned().collect();
        listeners.sort_by(|a, b| a.name.cmp(&b.name));
        AggregatedHealth {
            process_state: state.process_state,
            custom_status: state.custom_status.clone(),
            latency: state.latency,
            listeners,
        }
    }

    async fn probe_loop(
        self: Arc<Self>,
        listener: Arc<dyn Listener>,
        binding: ProbeBinding,
        prober: Arc<dyn Prober>,
        stop: CancellationToken,
        parent: CancellationToken,
    ) {
        let interval = if binding.config.interval > Duration::ZERO {
            binding.config.interval
        } else {
            self.default_interval
        };
        let mut ticker = tokio::time::interval(interval);
        // Consume the immediate first tick so the loop owns its startup
        // probe explicitly
        ticker.tick().await;

        debug!(
            listener = %listener.name(),
            kind = %binding.kind,
            interval = ?interval,
            "probe loop started"
        );

        if stop.is_cancelled() || parent.is_cancelled() {
            return;
        }
        self.run_probe(&listener, &binding, &prober, &stop, &parent)
            .await;

        loop {
            tokio::select! {
                _ = stop.cancelled() => {
                    debug!(listener = %listener.name(), "probe loop stopping");
                    return;
                }
                _ = parent.cancelled() => {
                    debug!(listener = %listener.name(), "probe loop cancelled");
                    return;
                }
                _ = ticker.tick() => {
                    self.run_probe(&listener, &binding, &prober, &stop, &parent).await;
                }
            }
        }
    }

    async fn run_probe(
        &self,
        listener: &Arc<dyn Listener>,
        binding: &ProbeBinding,
        prober: &Arc<dyn Prober>,
        stop: &CancellationToken,
        parent: &CancellationToken,
    ) {
        let timeout = if binding.config.timeout > Duration::ZERO {
            binding.config.timeout
        } else {
            self.default_timeout
        };

        let mut target = binding.target.clone();
        if target.address.is_empty() {
            target.address = listener.probe_address();
        }

        // The child scope expires with the timeout; a prober that ignores
        // it is dropped at the deadline instead of stalling the loop
        let scope = parent.child_token();
        let result = tokio::select! {
            result = prober.check(&scope, &target) => result,
            _ = tokio::time::sleep(timeout) => CheckResult::timed_out(timeout),
            _ = stop.cancelled() => {
                scope.cancel();
                return;
            }
        };
        scope.cancel();

        self.update_from_result(listener, binding, result);
    }

    /// Apply one probe result under the monitor's exclusive lock
    fn update_from_result(
        &self,
        listener: &Arc<dyn Listener>,
        binding: &ProbeBinding,
        result: CheckResult,
    ) {
        let mut guard = self.state.write().expect("monitor lock poisoned");
        let state = &mut *guard;

        let success_threshold = normalize_threshold(binding.config.success_threshold);
        let failure_threshold = normalize_threshold(binding.config.failure_threshold);
        let name = listener.name().to_string();

        let fsm_state = listener.state();
        let status = state
            .statuses
            .entry(name.clone())
            .or_insert_with(|| ListenerHealth::new(name.clone(), fsm_state));
        let prev_successes = status.consecutive_successes;
        let prev_failures = status.consecutive_failures;

        let eval = evaluate(
            prev_successes,
            prev_failures,
            fsm_state,
            result.success,
            success_threshold,
            failure_threshold,
        );

        let prev_state = fsm_state;
        let mut new_state = fsm_state;
        let mut refused = false;

        if !eval.should_transition || fsm_state == eval.target_state {
            status.consecutive_successes = eval.successes;
            status.consecutive_failures = eval.failures;
            status.state = fsm_state;
        } else {
            let requested = match eval.target_state {
                ListenerState::Ready => listener.mark_ready(),
                ListenerState::Listening => listener.mark_listening(),
                // The monitor never drives transitions into Closed
                ListenerState::Closed => Ok(()),
            };
            match requested {
                Ok(()) => {
                    status.consecutive_successes = eval.successes;
                    status.consecutive_failures = eval.failures;
                    status.state = eval.target_state;
                    new_state = eval.target_state;
                }
                Err(err) => {
                    // Drift recovery: trust the entity's actual state and
                    // hand the listener a clean budget
                    let actual = listener.state();
                    warn!(
                        listener = %name,
                        requested = %eval.target_state,
                        actual = %actual,
                        error = %err,
                        "listener refused transition, resyncing"
                    );
                    status.state = actual;
                    status.consecutive_successes = 0;
                    status.consecutive_failures = 0;
                    refused = true;
                }
            }
        }

        status.last_result = Some(result.clone());
        let current_failures = status.consecutive_failures;
        state.latency = result.latency;

        let mut unhealthy_notified = false;
        if !refused && new_state != prev_state {
            if let Some(callback) = &self.on_state_change {
                callback(&name, prev_state, new_state, &result);
            }
            if new_state == ListenerState::Ready {
                if let Some(callback) = &self.on_healthy {
                    callback(&name);
                }
            }
            if prev_state == ListenerState::Ready && new_state == ListenerState::Listening {
                if let Some(callback) = &self.on_unhealthy {
                    callback(&name, &failure_reason(&result));
                    unhealthy_notified = true;
                }
            }
            if let Some(events) = &self.events {
                let event = match new_state {
                    ListenerState::Ready => HealthEvent::healthy(name.clone(), result.clone()),
                    ListenerState::Listening => {
                        HealthEvent::unhealthy(name.clone(), result.clone())
                    }
                    ListenerState::Closed => {
                        HealthEvent::new(name.clone(), HealthStatus::Unknown, result.clone())
                    }
                };
                // A saturated sink drops the event; probes are never
                // back-pressured
                let _ = events.try_send(event);
            }
        }

        // Failure budget: notify the supervisor once when the threshold is
        // crossed, then reset so the restarted process starts clean
        if !result.success && prev_failures < failure_threshold && current_failures >= failure_threshold
        {
            if let Some(callback) = &self.on_unhealthy {
                if !unhealthy_notified {
                    callback(&name, &failure_reason(&result));
                }
                if let Some(status) = state.statuses.get_mut(&name) {
                    status.consecutive_failures = 0;
                }
            }
        }
    }
}

/// Human-readable reason handed to the supervisor callback
fn failure_reason(result: &CheckResult) -> String {
    if let Some(error) = &result.error {
        if !error.is_empty() {
            return error.clone();
        }
    }
    if !result.output.is_empty() {
        return result.output.clone();
    }
    "health probe failed".to_string()
}
