use crate::run_with_deadline;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use warden_core::{CheckResult, ProbeKind, ProbeTarget};
use warden_monitor::Prober;

/// Probes reachability with a single ICMP echo
///
/// Delegates to the system `ping` binary so the supervisor does not need
/// raw-socket privileges.
pub struct IcmpProber {
    timeout: Duration,
}

impl IcmpProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

/// Strip a trailing port from a target address; ICMP has no ports
pub(crate) fn ping_host(address: &str) -> &str {
    if let Some(rest) = address.strip_prefix('[') {
        if let Some((host, _)) = rest.split_once(']') {
            return host;
        }
    }
    match address.rsplit_once(':') {
        Some((host, _port)) if !host.contains(':') => host,
        _ => address,
    }
}

async fn icmp_attempt(start: Instant, address: String, wait_secs: u64) -> CheckResult {
    let host = ping_host(&address).to_string();
    let wait = wait_secs.to_string();
    let output = Command::new("ping")
        .args(["-c", "1", "-W", wait.as_str(), host.as_str()])
        .kill_on_drop(true)
        .output()
        .await;

    match output {
        Ok(output) if output.status.success() => CheckResult::ok(start.elapsed()),
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            CheckResult::failure(
                start.elapsed(),
                format!("ping to {} failed (exit {}): {}", host, output.status.code().unwrap_or(-1), stderr),
            )
        }
        Err(e) => CheckResult::failure(start.elapsed(), format!("ping spawn failed: {}", e)),
    }
}

#[async_trait]
impl Prober for IcmpProber {
    async fn check(&self, scope: &CancellationToken, target: &ProbeTarget) -> CheckResult {
        let start = Instant::now();
        let wait_secs = self.timeout.as_secs().max(1);
        run_with_deadline(
            scope,
            self.timeout,
            icmp_attempt(start, target.address.clone(), wait_secs),
        )
        .await
    }

    fn kind(&self) -> ProbeKind {
        ProbeKind::Icmp
    }
}
