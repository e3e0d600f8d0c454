use miette::Diagnostic;
use thiserror::Error;

/// Monitor error type for binding and orchestration operations
#[derive(Error, Debug, Diagnostic)]
pub enum MonitorError {
    /// No prober factory was configured on the monitor
    #[error("No prober factory configured")]
    #[diagnostic(
        code(warden::monitor::factory_missing),
        help("Construct the monitor with `MonitorConfig::with_factory` before binding probes")
    )]
    FactoryMissing,

    /// The factory failed to create a prober for a binding
    #[error("Failed to create prober for listener '{listener}': {message}")]
    #[diagnostic(
        code(warden::monitor::prober_creation),
        help("Check the binding's probe kind and the factory's supported kinds")
    )]
    ProberCreation {
        #[allow(unused)]
        listener: String,
        #[allow(unused)]
        message: String,
    },

    /// Core model error
    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] warden_core::CoreError),
}

/// Result type alias for monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;

impl MonitorError {
    pub fn prober_creation(listener: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProberCreation {
            listener: listener.into(),
            message: message.into(),
        }
    }
}
