//! Warden Probes - Concrete prober implementations for the warden monitor
//!
//! Each prober honours its cancellation scope, applies the timeout handed
//! to it by the factory and clocks its own latency. Network probers dial
//! raw sockets; exec and icmp delegate to child processes.

pub mod exec;
pub mod factory;
pub mod grpc;
pub mod http;
pub mod icmp;
pub mod tcp;
pub mod udp;

pub use exec::ExecProber;
pub use factory::StandardProberFactory;
pub use grpc::GrpcProber;
pub use http::HttpProber;
pub use icmp::IcmpProber;
pub use tcp::TcpProber;
pub use udp::UdpProber;

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use warden_core::CheckResult;

/// Race a probe attempt against its deadline and cancellation scope
///
/// Scope expiry and the deadline both yield the dedicated timeout result;
/// the attempt future is dropped either way, so no I/O continues past the
/// scope.
pub(crate) async fn run_with_deadline<F>(
    scope: &CancellationToken,
    timeout: Duration,
    attempt: F,
) -> CheckResult
where
    F: Future<Output = CheckResult>,
{
    tokio::select! {
        _ = scope.cancelled() => CheckResult::timed_out(timeout),
        outcome = tokio::time::timeout(timeout, attempt) => match outcome {
            Ok(result) => result,
            Err(_) => CheckResult::timed_out(timeout),
        },
    }
}
