use crate::run_with_deadline;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use warden_core::{CheckResult, ProbeKind, ProbeTarget};
use warden_monitor::Prober;

/// HTTP/2 client connection preface
const H2_PREFACE: &[u8] = b"PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n";
/// An empty SETTINGS frame: length 0, type 0x4, no flags, stream 0
const H2_EMPTY_SETTINGS: [u8; 9] = [0, 0, 0, 0x04, 0, 0, 0, 0, 0];
/// Frame type for SETTINGS
const H2_FRAME_SETTINGS: u8 = 0x04;

/// Probes a gRPC endpoint at the connection level
///
/// Sends the HTTP/2 client preface and an empty SETTINGS frame, then
/// expects the server's SETTINGS frame back. This confirms an HTTP/2
/// server is speaking on the port without needing a full gRPC stack; the
/// configured service name is only echoed in the probe output.
pub struct GrpcProber {
    timeout: Duration,
}

impl GrpcProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

async fn grpc_attempt(start: Instant, target: ProbeTarget) -> CheckResult {
    let address = target.address;
    let mut stream = match TcpStream::connect(&address).await {
        Ok(s) => s,
        Err(e) => {
            return CheckResult::failure(
                start.elapsed(),
                format!("gRPC connection to {} failed: {}", address, e),
            )
        }
    };

    if let Err(e) = stream.write_all(H2_PREFACE).await {
        return CheckResult::failure(start.elapsed(), format!("HTTP/2 preface write failed: {}", e));
    }
    if let Err(e) = stream.write_all(&H2_EMPTY_SETTINGS).await {
        return CheckResult::failure(start.elapsed(), format!("SETTINGS write failed: {}", e));
    }

    let mut header = [0u8; 9];
    if let Err(e) = stream.read_exact(&mut header).await {
        return CheckResult::failure(
            start.elapsed(),
            format!("no HTTP/2 frame from {}: {}", address, e),
        );
    }

    if header[3] != H2_FRAME_SETTINGS {
        return CheckResult::failure(
            start.elapsed(),
            format!(
                "expected SETTINGS frame from {}, got frame type {:#x}",
                address, header[3]
            ),
        );
    }

    let output = match &target.grpc_service {
        Some(service) => format!("h2 settings exchanged (service {})", service),
        None => "h2 settings exchanged".to_string(),
    };
    CheckResult::ok_with_output(start.elapsed(), output)
}

#[async_trait]
impl Prober for GrpcProber {
    async fn check(&self, scope: &CancellationToken, target: &ProbeTarget) -> CheckResult {
        let start = Instant::now();
        run_with_deadline(scope, self.timeout, grpc_attempt(start, target.clone())).await
    }

    fn kind(&self) -> ProbeKind {
        ProbeKind::Grpc
    }
}
