use std::fmt;
use std::ops::RangeInclusive;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Classification of a single connect attempt.
///
/// `Closed` and `Timeout` are both "not open" but are kept apart so callers
/// can tell an active refusal from a port that never answered.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    Open,
    Closed,
    Timeout,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ProbeStatus::Open => "open",
                ProbeStatus::Closed => "closed",
                ProbeStatus::Timeout => "timeout",
            }
        )
    }
}

/// One classified probe of a (target, port) pair.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub port: u16,
    pub status: ProbeStatus,
}

/// Settings for one sweep invocation. Immutable once the sweep starts.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Per-connection attempt timeout.
    pub timeout: Duration,
    /// Max concurrent connect attempts. Clamped to 1..=5000 by the engine.
    pub concurrency: usize,
    /// Inclusive port range to cover.
    pub ports: RangeInclusive<u16>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(500),
            concurrency: 1000,
            ports: 1..=u16::MAX,
        }
    }
}

/// Aggregate result of a completed sweep.
///
/// `results` holds exactly one entry per port in the configured range,
/// sorted ascending by port number.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SweepOutcome {
    pub target: String,
    pub started_at: String,
    pub finished_at: String,
    pub open_count: u64,
    pub results: Vec<ProbeResult>,
}

impl SweepOutcome {
    /// Ports classified as open, in ascending order.
    pub fn open_ports(&self) -> Vec<u16> {
        self.results
            .iter()
            .filter(|r| r.status == ProbeStatus::Open)
            .map(|r| r.port)
            .collect()
    }
}
