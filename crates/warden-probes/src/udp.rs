use crate::run_with_deadline;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use warden_core::{CheckResult, ProbeKind, ProbeTarget};
use warden_monitor::Prober;

/// Probes a datagram listener with an empty datagram
///
/// UDP gives no handshake to observe, so the semantics are send-oriented:
/// a reply within the response window confirms health, an ICMP
/// port-unreachable surfaces as a recv error and fails the probe, and
/// silence counts as success (fire-and-forget protocols never answer).
pub struct UdpProber {
    timeout: Duration,
}

impl UdpProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn response_window(&self) -> Duration {
        self.timeout.min(Duration::from_millis(250))
    }
}

#[async_trait]
impl Prober for UdpProber {
    async fn check(&self, scope: &CancellationToken, target: &ProbeTarget) -> CheckResult {
        let start = Instant::now();
        let address = target.address.clone();
        let window = self.response_window();
        run_with_deadline(scope, self.timeout, async move {
            let is_v6 = address
                .parse::<SocketAddr>()
                .map(|a| a.is_ipv6())
                .unwrap_or(false);
            let bind_addr = if is_v6 { "[::]:0" } else { "0.0.0.0:0" };

            let socket = match UdpSocket::bind(bind_addr).await {
                Ok(s) => s,
                Err(e) => {
                    return CheckResult::failure(
                        start.elapsed(),
                        format!("UDP socket bind failed: {}", e),
                    )
                }
            };
            if let Err(e) = socket.connect(&address).await {
                return CheckResult::failure(
                    start.elapsed(),
                    format!("UDP connect to {} failed: {}", address, e),
                );
            }
            if let Err(e) = socket.send(&[]).await {
                return CheckResult::failure(
                    start.elapsed(),
                    format!("UDP send to {} failed: {}", address, e),
                );
            }

            let mut buf = [0u8; 512];
            match tokio::time::timeout(window, socket.recv(&mut buf)).await {
                Ok(Ok(n)) => CheckResult::ok_with_output(
                    start.elapsed(),
                    format!("received {} byte reply", n),
                ),
                Ok(Err(e)) => CheckResult::failure(
                    start.elapsed(),
                    format!("UDP probe to {} failed: {}", address, e),
                ),
                Err(_) => CheckResult::ok(start.elapsed()),
            }
        })
        .await
    }

    fn kind(&self) -> ProbeKind {
        ProbeKind::Udp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_udp_probe_reply_is_success_with_output() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap();

        tokio::spawn(async move {
            let mut buf = [0u8; 64];
            if let Ok((_, peer)) = server.recv_from(&mut buf).await {
                let _ = server.send_to(b"pong", peer).await;
            }
        });

        let prober = UdpProber::new(Duration::from_secs(1));
        let target = ProbeTarget::for_address(addr.to_string());
        let result = prober.check(&CancellationToken::new(), &target).await;

        assert!(result.success);
        assert!(result.output.contains("4 byte reply"));
    }

    #[tokio::test]
    async fn test_udp_probe_silence_is_success() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap();

        let prober = UdpProber::new(Duration::from_millis(300));
        let target = ProbeTarget::for_address(addr.to_string());
        let result = prober.check(&CancellationToken::new(), &target).await;

        assert!(result.success);
        assert!(result.output.is_empty());

        drop(server);
    }

    #[tokio::test]
    async fn test_udp_probe_unresolvable_target_fails() {
        let prober = UdpProber::new(Duration::from_secs(1));
        let target = ProbeTarget::for_address("host.invalid:1");
        let result = prober.check(&CancellationToken::new(), &target).await;

        assert!(!result.success);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_kind() {
        assert_eq!(
            UdpProber::new(Duration::from_secs(1)).kind(),
            ProbeKind::Udp
        );
    }
}
