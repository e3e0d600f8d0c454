use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which kind of probe a binding runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    Tcp,
    Udp,
    Http,
    Grpc,
    Exec,
    Icmp,
}

impl ProbeKind {
    /// Parse from a configuration string
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "" => Err(CoreError::EmptyProbeKind),
            "tcp" => Ok(ProbeKind::Tcp),
            "udp" => Ok(ProbeKind::Udp),
            "http" => Ok(ProbeKind::Http),
            "grpc" => Ok(ProbeKind::Grpc),
            "exec" => Ok(ProbeKind::Exec),
            "icmp" => Ok(ProbeKind::Icmp),
            other => Err(CoreError::unknown_probe_kind(other)),
        }
    }
}

impl std::fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProbeKind::Tcp => "tcp",
            ProbeKind::Udp => "udp",
            ProbeKind::Http => "http",
            ProbeKind::Grpc => "grpc",
            ProbeKind::Exec => "exec",
            ProbeKind::Icmp => "icmp",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for ProbeKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// What a probe dials or runs
///
/// Only the fields relevant to the binding's kind are consulted; probers of
/// other kinds ignore the rest. An empty address is replaced at probe time
/// by the listener's loopback-rewritten bind address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeTarget {
    /// host:port to dial (empty means "derive from the listener")
    pub address: String,
    /// HTTP request path
    pub path: Option<String>,
    /// HTTP request method (GET when unset)
    pub method: Option<String>,
    /// Exact HTTP status required for success (any 2xx when unset)
    pub expected_status: Option<u16>,
    /// gRPC service name, reported in probe output
    pub grpc_service: Option<String>,
    /// Command for exec probes
    pub command: Option<String>,
    /// Arguments for exec probes
    pub args: Vec<String>,
}

impl ProbeTarget {
    pub fn for_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_expected_status(mut self, status: u16) -> Self {
        self.expected_status = Some(status);
        self
    }

    pub fn with_grpc_service(mut self, service: impl Into<String>) -> Self {
        self.grpc_service = Some(service.into());
        self
    }

    pub fn with_command(mut self, command: impl Into<String>, args: Vec<String>) -> Self {
        self.command = Some(command.into());
        self.args = args;
        self
    }
}

/// Timing and hysteresis settings for one binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Time between probes
    pub interval: Duration,
    /// Per-probe deadline
    pub timeout: Duration,
    /// Consecutive successes required to mark the listener ready
    pub success_threshold: u32,
    /// Consecutive failures tolerated before the listener is marked
    /// unhealthy and the supervisor is notified
    pub failure_threshold: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(5),
            success_threshold: 1,
            failure_threshold: 3,
        }
    }
}

/// Normalize a threshold to at least 1
pub fn normalize_threshold(value: u32) -> u32 {
    value.max(1)
}

/// Immutable association of a listener with a probe kind, target and timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeBinding {
    pub listener_name: String,
    pub kind: ProbeKind,
    pub target: ProbeTarget,
    pub config: ProbeConfig,
}

impl ProbeBinding {
    /// Build a binding with the default timing block
    pub fn new(listener_name: impl Into<String>, kind: ProbeKind, target: ProbeTarget) -> Self {
        Self {
            listener_name: listener_name.into(),
            kind,
            target,
            config: ProbeConfig::default(),
        }
    }

    /// Replace the timing block
    pub fn with_config(mut self, config: ProbeConfig) -> Self {
        self.config = config;
        self
    }
}

/// Outcome of a single probe execution
///
/// Probers clock their own latency; the monitor only records it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub success: bool,
    pub latency: Duration,
    pub output: String,
    pub error: Option<String>,
}

impl CheckResult {
    pub fn ok(latency: Duration) -> Self {
        Self {
            success: true,
            latency,
            output: String::new(),
            error: None,
        }
    }

    pub fn ok_with_output(latency: Duration, output: impl Into<String>) -> Self {
        Self {
            success: true,
            latency,
            output: output.into(),
            error: None,
        }
    }

    pub fn failure(latency: Duration, error: impl Into<String>) -> Self {
        Self {
            success: false,
            latency,
            output: String::new(),
            error: Some(error.into()),
        }
    }

    pub fn failure_with_output(
        latency: Duration,
        error: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            latency,
            output: output.into(),
            error: Some(error.into()),
        }
    }

    /// The dedicated timeout outcome
    pub fn timed_out(timeout: Duration) -> Self {
        Self {
            success: false,
            latency: timeout,
            output: String::new(),
            error: Some(format!("probe timed out after {:?}", timeout)),
        }
    }
}
