use crate::run_with_deadline;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use warden_core::{CheckResult, ProbeKind, ProbeTarget};
use warden_monitor::Prober;

/// Probes an HTTP endpoint with a hand-rolled HTTP/1.1 request
///
/// Success means the response status matches `expected_status` when it is
/// set, or falls in the 2xx range otherwise.
pub struct HttpProber {
    timeout: Duration,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

async fn http_attempt(start: Instant, target: ProbeTarget) -> CheckResult {
    let address = target.address;
    let method = target
        .method
        .as_deref()
        .unwrap_or("GET")
        .to_ascii_uppercase();
    let path = target.path.as_deref().unwrap_or("/");

    let mut stream = match TcpStream::connect(&address).await {
        Ok(s) => s,
        Err(e) => {
            return CheckResult::failure(
                start.elapsed(),
                format!("HTTP connection to {} failed: {}", address, e),
            )
        }
    };

    let request = format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        method, path, address
    );
    if let Err(e) = stream.write_all(request.as_bytes()).await {
        return CheckResult::failure(start.elapsed(), format!("HTTP write failed: {}", e));
    }

    let mut response = Vec::new();
    if let Err(e) = stream.read_to_end(&mut response).await {
        return CheckResult::failure(start.elapsed(), format!("HTTP read failed: {}", e));
    }

    let response_str = String::from_utf8_lossy(&response);
    let Some(status_line) = response_str.lines().next() else {
        return CheckResult::failure(start.elapsed(), "HTTP probe: empty response".to_string());
    };

    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok());
    let Some(status) = status else {
        return CheckResult::failure(
            start.elapsed(),
            "HTTP probe: could not parse response status".to_string(),
        );
    };

    let accepted = match target.expected_status {
        Some(expected) => status == expected,
        None => (200..300).contains(&status),
    };
    if accepted {
        CheckResult::ok_with_output(start.elapsed(), status_line.to_string())
    } else {
        CheckResult::failure_with_output(
            start.elapsed(),
            format!("HTTP probe returned status {}", status),
            status_line.to_string(),
        )
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn check(&self, scope: &CancellationToken, target: &ProbeTarget) -> CheckResult {
        let start = Instant::now();
        run_with_deadline(scope, self.timeout, http_attempt(start, target.clone())).await
    }

    fn kind(&self) -> ProbeKind {
        ProbeKind::Http
    }
}
