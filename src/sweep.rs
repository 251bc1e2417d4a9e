use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use ::time::{format_description::well_known, OffsetDateTime};
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::SweepError;
use crate::probe::{self, ProbeOutcome};
use crate::target::resolve;
use crate::types::{ProbeResult, ProbeStatus, ScanConfig, SweepOutcome};

/// Consecutive host-unreachable probe outcomes after which the sweep aborts.
/// A single port's refusal or timeout never trips this; the counter resets on
/// every classified outcome.
const HOST_DOWN_ABORT_THRESHOLD: u32 = 16;

/// Sweep every port in `config.ports` on `target` using asynchronous TCP
/// connects with a concurrency limit.
///
/// - Resolves the target once before any probe is issued.
/// - Limits concurrent socket attempts using a `Semaphore`.
/// - Bounds each connect with `config.timeout`.
/// - Returns one classified result per port, sorted ascending.
pub async fn sweep(target: &str, config: &ScanConfig) -> Result<SweepOutcome, SweepError> {
    sweep_internal(target, config, None, None).await
}

/// Variant that accepts a `CancellationToken` to allow external cancellation.
/// A cancelled sweep abandons in-flight probes and reports `Interrupted`.
pub async fn sweep_with_cancel(
    target: &str,
    config: &ScanConfig,
    cancel: CancellationToken,
) -> Result<SweepOutcome, SweepError> {
    sweep_internal(target, config, Some(cancel), None).await
}

/// Variant that additionally streams each open-port discovery to `open_tx`
/// as it happens, in completion order. The returned outcome is still sorted
/// by port number.
pub async fn sweep_with_events(
    target: &str,
    config: &ScanConfig,
    cancel: CancellationToken,
    open_tx: mpsc::UnboundedSender<ProbeResult>,
) -> Result<SweepOutcome, SweepError> {
    sweep_internal(target, config, Some(cancel), Some(open_tx)).await
}

async fn sweep_internal(
    target: &str,
    config: &ScanConfig,
    cancel_opt: Option<CancellationToken>,
    open_tx: Option<mpsc::UnboundedSender<ProbeResult>>,
) -> Result<SweepOutcome, SweepError> {
    let ip = resolve(target).await?;
    let started_at = now_rfc3339();

    let expected = config.ports.clone().count();
    let concurrency = config.concurrency.clamp(1, 5_000);
    let entries = Arc::new(Mutex::new(Vec::with_capacity(expected)));
    let sem = Arc::new(Semaphore::new(concurrency));
    let mut set = JoinSet::new();

    let external = cancel_opt.unwrap_or_default();
    // Internal aborts must not cancel the caller's token, so the sweep runs
    // on a child of it.
    let cancel = external.child_token();

    let host_down_streak = Arc::new(AtomicU32::new(0));
    let aborted = Arc::new(AtomicBool::new(false));

    log::debug!("sweeping {expected} ports on {ip}, {concurrency} max in flight");

    for port in config.ports.clone() {
        let permit = tokio::select! {
            _ = cancel.cancelled() => break,
            permit = sem.clone().acquire_owned() => permit.expect("semaphore never closed"),
        };

        let entries = entries.clone();
        let host_down_streak = host_down_streak.clone();
        let aborted = aborted.clone();
        let cancel = cancel.clone();
        let open_tx = open_tx.clone();
        let timeout = config.timeout;

        set.spawn(async move {
            let _permit = permit; // keep permit until task completes

            if cancel.is_cancelled() {
                return;
            }

            let addr = SocketAddr::new(ip, port);
            match probe::probe_port(addr, timeout).await {
                ProbeOutcome::Classified(status) => {
                    host_down_streak.store(0, Ordering::Relaxed);
                    let entry = ProbeResult { port, status };
                    if status == ProbeStatus::Open {
                        if let Some(tx) = &open_tx {
                            let _ = tx.send(entry);
                        }
                    }
                    entries.lock().await.push(entry);
                }
                ProbeOutcome::HostDown => {
                    let streak = host_down_streak.fetch_add(1, Ordering::Relaxed) + 1;
                    if streak >= HOST_DOWN_ABORT_THRESHOLD
                        && !aborted.swap(true, Ordering::Relaxed)
                    {
                        log::debug!(
                            "aborting sweep after {streak} consecutive unreachable errors"
                        );
                        cancel.cancel();
                    }
                    // Below the threshold the port still gets covered; the
                    // host answered nothing, so it reads as unresponsive.
                    entries.lock().await.push(ProbeResult {
                        port,
                        status: ProbeStatus::Timeout,
                    });
                }
            }
        });
    }

    while !cancel.is_cancelled() {
        tokio::select! {
            _ = cancel.cancelled() => break,
            next = set.join_next() => if next.is_none() { break },
        }
    }
    // Abandons anything still in flight after cancellation; the aborted
    // tasks drop their sockets with them. A no-op on a drained set.
    set.shutdown().await;

    if aborted.load(Ordering::Relaxed) {
        return Err(SweepError::HostUnreachable(target.to_string()));
    }
    if cancel.is_cancelled() {
        log::debug!("sweep cancelled, partial results discarded");
        return Err(SweepError::Interrupted);
    }

    let mut results = std::mem::take(&mut *entries.lock().await);
    results.sort_unstable_by_key(|r| r.port);
    let open_count = results
        .iter()
        .filter(|r| r.status == ProbeStatus::Open)
        .count() as u64;

    Ok(SweepOutcome {
        target: target.to_string(),
        started_at,
        finished_at: now_rfc3339(),
        open_count,
        results,
    })
}

/// RFC 3339 UTC timestamp using the `time` crate.
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
