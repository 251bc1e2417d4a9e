use std::fs::File;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use port_sweep_rs::cli::Cli;
use port_sweep_rs::error::SweepError;
use port_sweep_rs::types::{ProbeResult, ScanConfig, SweepOutcome};
use port_sweep_rs::{logger, sweep};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.debug {
        logger::init();
    }

    let config = ScanConfig {
        timeout: Duration::from_millis(cli.timeout_ms),
        concurrency: cli.concurrency,
        ..ScanConfig::default()
    };

    // Ctrl-C cancels the sweep.
    let cancel = CancellationToken::new();
    let cancel_ctrlc = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        cancel_ctrlc.cancel();
    });

    print_banner(&cli.target);

    // Open ports print as they are discovered; the sweep outcome keeps the
    // full port-ordered classification.
    let (open_tx, mut open_rx) = mpsc::unbounded_channel::<ProbeResult>();
    let printer = tokio::spawn(async move {
        while let Some(result) = open_rx.recv().await {
            println!("Port {} is open and accessible", result.port);
        }
    });

    let started = Instant::now();
    let outcome = sweep::sweep_with_events(&cli.target, &config, cancel, open_tx).await;
    let _ = printer.await;

    match outcome {
        Ok(outcome) => {
            println!(
                "\nScan completed in {:.2}s: {} of {} ports open",
                started.elapsed().as_secs_f32(),
                outcome.open_count,
                outcome.results.len()
            );
            if let Some(path) = cli.output.as_deref() {
                if let Err(e) = write_outcome_json(path, &outcome) {
                    eprintln!("Failed to write JSON to {}: {}", path.display(), e);
                } else {
                    println!("Wrote JSON results to {}", path.display());
                }
            }
            ExitCode::SUCCESS
        }
        Err(SweepError::Interrupted) => {
            println!("\n\nExperienced keyboard interrupt, exiting.");
            ExitCode::from(130)
        }
        Err(SweepError::HostUnresolved(target)) => {
            println!("\n\nHostname for target {target} could not be resolved, exiting.");
            ExitCode::from(1)
        }
        Err(SweepError::HostUnreachable(target)) => {
            println!("\n\nTarget {target} not responding, exiting.");
            ExitCode::from(1)
        }
    }
}

fn print_banner(target: &str) {
    let rule = "-".repeat(60);
    println!("{rule}");
    println!("Scanning target: {target}");
    println!("Scanning commenced at {}", sweep::now_rfc3339());
    println!("{rule}");
}

fn write_outcome_json(path: &std::path::Path, outcome: &SweepOutcome) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, outcome)?;
    Ok(())
}
