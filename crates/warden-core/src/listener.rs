use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// State machine for a monitored listener
///
/// Legal transitions: Closed -> Listening, Listening <-> Ready, and any
/// state -> Closed. The entity owner drives Closed; the monitor only ever
/// requests Listening and Ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenerState {
    Closed,
    Listening,
    Ready,
}

impl ListenerState {
    /// Whether a transition from `self` to `next` is legal
    pub fn can_transition_to(self, next: ListenerState) -> bool {
        matches!(
            (self, next),
            (ListenerState::Closed, ListenerState::Listening)
                | (ListenerState::Listening, ListenerState::Ready)
                | (ListenerState::Ready, ListenerState::Listening)
                | (_, ListenerState::Closed)
        )
    }
}

impl std::fmt::Display for ListenerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ListenerState::Closed => "closed",
            ListenerState::Listening => "listening",
            ListenerState::Ready => "ready",
        };
        write!(f, "{}", s)
    }
}

/// Contract between the monitor and the externally owned listener entity
///
/// The monitor consults the state and requests transitions through the
/// trait; it never writes state directly. Implementations validate every
/// requested transition and refuse illegal ones, which the monitor
/// recovers from by re-syncing to the actual state.
pub trait Listener: Send + Sync {
    /// Unique, non-empty listener name
    fn name(&self) -> &str;

    /// Current state of the listener
    fn state(&self) -> ListenerState;

    /// Configured bind host (may be a wildcard address)
    fn host(&self) -> String;

    /// Configured port
    fn port(&self) -> u16;

    /// Request the Listening state
    fn mark_listening(&self) -> Result<()>;

    /// Request the Ready state
    fn mark_ready(&self) -> Result<()>;

    /// Request the Closed state
    fn close(&self) -> Result<()>;

    /// Dialable address for probes: the bind host rewritten to loopback
    /// when it is empty or a wildcard, joined with the port
    fn probe_address(&self) -> String {
        join_host_port(loopback_host(&self.host()), self.port())
    }
}

/// Rewrite empty and wildcard bind hosts to their loopback equivalent
pub fn loopback_host(host: &str) -> &str {
    match host {
        "" | "0.0.0.0" => "127.0.0.1",
        "::" => "::1",
        other => other,
    }
}

/// Join host and port with standard host:port semantics, bracketing IPv6
pub fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

/// Concrete listener entity tracked by a supervised service
///
/// Created Closed; every transition is validated against the state machine.
#[derive(Debug)]
pub struct ServiceListener {
    name: String,
    protocol: String,
    host: String,
    port: u16,
    state: RwLock<ListenerState>,
}

impl ServiceListener {
    pub fn new(
        name: impl Into<String>,
        protocol: impl Into<String>,
        host: impl Into<String>,
        port: u16,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(CoreError::invalid_listener("listener name is empty"));
        }
        Ok(Self {
            name,
            protocol: protocol.into(),
            host: host.into(),
            port,
            state: RwLock::new(ListenerState::Closed),
        })
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    fn transition(&self, to: ListenerState) -> Result<()> {
        let mut state = self.state.write().expect("listener state lock poisoned");
        if !state.can_transition_to(to) {
            return Err(CoreError::invalid_transition(
                self.name.clone(),
                state.to_string(),
                to.to_string(),
            ));
        }
        *state = to;
        Ok(())
    }
}

impl Listener for ServiceListener {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> ListenerState {
        *self.state.read().expect("listener state lock poisoned")
    }

    fn host(&self) -> String {
        self.host.clone()
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn mark_listening(&self) -> Result<()> {
        self.transition(ListenerState::Listening)
    }

    fn mark_ready(&self) -> Result<()> {
        self.transition(ListenerState::Ready)
    }

    fn close(&self) -> Result<()> {
        self.transition(ListenerState::Closed)
    }
}
