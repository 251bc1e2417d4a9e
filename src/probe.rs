use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time;

use crate::types::ProbeStatus;

/// Raw outcome of one connect attempt, before host-level escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The attempt resolved to a per-port classification.
    Classified(ProbeStatus),
    /// The network layer reported the host itself unreachable. The engine
    /// counts these and may abort the whole sweep.
    HostDown,
}

/// Attempt exactly one TCP connect to `addr`, bounded by `timeout`.
///
/// Refusal and timeout are expected outcomes, not errors; this function is
/// infallible. The stream is dropped as soon as the connect completes, so
/// the socket is released on every exit path.
pub async fn probe_port(addr: SocketAddr, timeout: Duration) -> ProbeOutcome {
    match time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => {
            drop(stream);
            ProbeOutcome::Classified(ProbeStatus::Open)
        }
        Ok(Err(err)) => match err.kind() {
            io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset => {
                ProbeOutcome::Classified(ProbeStatus::Closed)
            }
            io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable => {
                ProbeOutcome::HostDown
            }
            // Anything else never answered usefully; treat as unresponsive.
            _ => ProbeOutcome::Classified(ProbeStatus::Timeout),
        },
        Err(_) => ProbeOutcome::Classified(ProbeStatus::Timeout),
    }
}
