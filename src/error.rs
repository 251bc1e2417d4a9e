use thiserror::Error;

/// Sweep-wide failure conditions. Per-port refusals and timeouts are not
/// errors and never appear here; they are recorded in `ProbeResult`.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("target `{0}` could not be resolved")]
    HostUnresolved(String),
    #[error("target `{0}` is not reachable")]
    HostUnreachable(String),
    #[error("sweep interrupted before completion")]
    Interrupted,
}
