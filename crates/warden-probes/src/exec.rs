use crate::run_with_deadline;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use warden_core::{CheckResult, ProbeKind, ProbeTarget};
use warden_monitor::Prober;

/// Probes by running a command; exit code zero means healthy
pub struct ExecProber {
    timeout: Duration,
}

impl ExecProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

async fn exec_attempt(start: Instant, target: ProbeTarget) -> CheckResult {
    let Some(command) = target.command else {
        return CheckResult::failure(start.elapsed(), "exec probe has no command".to_string());
    };

    let output = Command::new(&command)
        .args(&target.args)
        .kill_on_drop(true)
        .output()
        .await;

    match output {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if output.status.success() {
                CheckResult::ok_with_output(start.elapsed(), stdout)
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                CheckResult::failure_with_output(
                    start.elapsed(),
                    format!(
                        "command '{}' exited with code {} (stderr: {})",
                        command,
                        output.status.code().unwrap_or(-1),
                        stderr
                    ),
                    stdout,
                )
            }
        }
        Err(e) => CheckResult::failure(
            start.elapsed(),
            format!("exec of '{}' failed: {}", command, e),
        ),
    }
}

#[async_trait]
impl Prober for ExecProber {
    async fn check(&self, scope: &CancellationToken, target: &ProbeTarget) -> CheckResult {
        let start = Instant::now();
        run_with_deadline(scope, self.timeout, exec_attempt(start, target.clone())).await
    }

    fn kind(&self) -> ProbeKind {
        ProbeKind::Exec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_exec_probe_success_captures_stdout() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "all good").unwrap();

        let prober = ExecProber::new(Duration::from_secs(5));
        let target = ProbeTarget::default()
            .with_command("cat", vec![file.path().to_string_lossy().into_owned()]);
        let result = prober.check(&CancellationToken::new(), &target).await;

        assert!(result.success);
        assert_eq!(result.output, "all good");
    }

    #[tokio::test]
    async fn test_exec_probe_nonzero_exit_fails() {
        let prober = ExecProber::new(Duration::from_secs(5));
        let target =
            ProbeTarget::default().with_command("sh", vec!["-c".to_string(), "exit 3".to_string()]);
        let result = prober.check(&CancellationToken::new(), &target).await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("exited with code 3"));
    }

    #[tokio::test]
    async fn test_exec_probe_missing_binary_fails() {
        let prober = ExecProber::new(Duration::from_secs(5));
        let target = ProbeTarget::default().with_command("warden-no-such-binary", vec![]);
        let result = prober.check(&CancellationToken::new(), &target).await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("exec of"));
    }

    #[tokio::test]
    async fn test_exec_probe_without_command_fails() {
        let prober = ExecProber::new(Duration::from_secs(5));
        let result = prober
            .check(&CancellationToken::new(), &ProbeTarget::default())
            .await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("no command"));
    }

    #[tokio::test]
    async fn test_exec_probe_hits_timeout() {
        let prober = ExecProber::new(Duration::from_millis(50));
        let target =
            ProbeTarget::default().with_command("sleep", vec!["5".to_string()]);
        let result = prober.check(&CancellationToken::new(), &target).await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("probe timed out"));
    }

    #[test]
    fn test_kind() {
        assert_eq!(
            ExecProber::new(Duration::from_secs(1)).kind(),
            ProbeKind::Exec
        );
    }
}
