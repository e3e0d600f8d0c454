use crate::{ExecProber, GrpcProber, HttpProber, IcmpProber, TcpProber, UdpProber};
use std::sync::Arc;
use std::time::Duration;
use warden_core::ProbeKind;
use warden_monitor::{Prober, ProberFactory, Result};

/// Factory covering every built-in probe kind
///
/// The timeout is baked into the prober so its internal deadlines match
/// the monitor's.
#[derive(Debug, Default)]
pub struct StandardProberFactory;

impl StandardProberFactory {
    pub fn new() -> Self {
        Self
    }
}

impl ProberFactory for StandardProberFactory {
    fn create(&self, kind: ProbeKind, timeout: Duration) -> Result<Arc<dyn Prober>> {
        tracing::debug!(kind = %kind, timeout = ?timeout, "creating prober");
        let prober: Arc<dyn Prober> = match kind {
            ProbeKind::Tcp => Arc::new(TcpProber::new(timeout)),
            ProbeKind::Udp => Arc::new(UdpProber::new(timeout)),
            ProbeKind::Http => Arc::new(HttpProber::new(timeout)),
            ProbeKind::Grpc => Arc::new(GrpcProber::new(timeout)),
            ProbeKind::Exec => Arc::new(ExecProber::new(timeout)),
            ProbeKind::Icmp => Arc::new(IcmpProber::new(timeout)),
        };
        Ok(prober)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_covers_every_kind() {
        let factory = StandardProberFactory::new();
        for kind in [
            ProbeKind::Tcp,
            ProbeKind::Udp,
            ProbeKind::Http,
            ProbeKind::Grpc,
            ProbeKind::Exec,
            ProbeKind::Icmp,
        ] {
            let prober = factory.create(kind, Duration::from_secs(1)).unwrap();
            assert_eq!(prober.kind(), kind);
        }
    }
}
