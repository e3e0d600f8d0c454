use miette::Diagnostic;
use thiserror::Error;

/// Core error type for listener and probe-model operations
#[derive(Error, Debug, Diagnostic)]
pub enum CoreError {
    /// Listener state machine refused a transition
    #[error("Invalid state transition for listener '{listener}': cannot transition from {from} to {to}")]
    #[diagnostic(
        code(warden::core::invalid_state_transition),
        help("Only closed->listening, listening<->ready and *->closed are legal. Current state is '{from}'")
    )]
    InvalidTransition {
        #[allow(unused)]
        listener: String,
        #[allow(unused)]
        from: String,
        #[allow(unused)]
        to: String,
    },

    /// Probe kind string was empty
    #[error("Probe kind is empty")]
    #[diagnostic(
        code(warden::core::empty_probe_kind),
        help("Specify one of: tcp, udp, http, grpc, exec, icmp")
    )]
    EmptyProbeKind,

    /// Probe kind string was not recognized
    #[error("Unknown probe kind: '{value}'")]
    #[diagnostic(
        code(warden::core::unknown_probe_kind),
        help("Supported kinds are: tcp, udp, http, grpc, exec, icmp")
    )]
    UnknownProbeKind {
        #[allow(unused)]
        value: String,
    },

    /// Invalid listener definition
    #[error("Invalid listener: {message}")]
    #[diagnostic(
        code(warden::core::invalid_listener),
        help("Listener names must be unique and non-empty")
    )]
    InvalidListener {
        #[allow(unused)]
        message: String,
    },
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn invalid_transition(
        listener: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self::InvalidTransition {
            listener: listener.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn unknown_probe_kind(value: impl Into<String>) -> Self {
        Self::UnknownProbeKind {
            value: value.into(),
        }
    }

    pub fn invalid_listener(message: impl Into<String>) -> Self {
        Self::InvalidListener {
            message: message.into(),
        }
    }
}
