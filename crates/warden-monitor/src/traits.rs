use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use warden_core::{CheckResult, ProbeKind, ProbeTarget};

/// Stateless executor for one probe kind
///
/// Implementations must honour the cancellation scope: on scope expiry the
/// probe returns an unsuccessful result with the dedicated timeout error,
/// and no I/O continues outside the scope. Probers clock their own latency.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Run one probe against the target
    async fn check(&self, scope: &CancellationToken, target: &ProbeTarget) -> CheckResult;

    /// Which kind of probe this is
    fn kind(&self) -> ProbeKind;
}

/// Yields probers on demand for a given kind and timeout
///
/// Owned by an infrastructure adapter; the monitor depends only on this
/// interface and wraps creation errors with the binding's listener name.
pub trait ProberFactory: Send + Sync {
    fn create(&self, kind: ProbeKind, timeout: Duration) -> Result<Arc<dyn Prober>>;
}
