use crate::run_with_deadline;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use warden_core::{CheckResult, ProbeKind, ProbeTarget};
use warden_monitor::Prober;

/// Probes a listener by completing a TCP handshake
pub struct TcpProber {
    timeout: Duration,
}

impl TcpProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn check(&self, scope: &CancellationToken, target: &ProbeTarget) -> CheckResult {
        let start = Instant::now();
        let address = target.address.clone();
        run_with_deadline(scope, self.timeout, async move {
            match TcpStream::connect(&address).await {
                Ok(_) => CheckResult::ok(start.elapsed()),
                Err(e) => CheckResult::failure(
                    start.elapsed(),
                    format!("TCP connection to {} failed: {}", address, e),
                ),
            }
        })
        .await
    }

    fn kind(&self) -> ProbeKind {
        ProbeKind::Tcp
    }
}
