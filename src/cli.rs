use std::path::PathBuf;

use clap::Parser;

use crate::target;

/// Command-line surface for the port sweep binary.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "port-sweep-rs",
    version,
    about = "Scans for open TCP ports on a given target machine.",
    after_help = include_str!("../LICENSE")
)]
pub struct Cli {
    /// IPv4 address of the target machine.
    #[arg(value_parser = target::parse_ipv4)]
    pub target: String,

    /// Max concurrent TCP connect attempts.
    #[arg(long, default_value_t = 1000)]
    pub concurrency: usize,

    /// Socket connect timeout in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = 500)]
    pub timeout_ms: u64,

    /// Write the full classified outcome as pretty JSON to this path (optional).
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Turns on debugging information.
    #[arg(short, long)]
    pub debug: bool,
}
