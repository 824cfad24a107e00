//! sgkv-bench binary entry point.
//!
//! Loads a TOML config (path from the first argument, defaulting to
//! `sgkv-bench.toml` in the working directory, missing file means
//! defaults), runs the closed-loop workload, and logs the report.

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sgkv_bench::{load_config, run_closed_loop};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sgkv-bench.toml"));

    let config = load_config(&path).with_context(|| format!("loading {}", path.display()))?;

    info!("starting sgkv-bench");
    info!("wire format: {}", config.protocol.format);
    info!(
        "workload: {} rounds over {} keys, {} byte values, miss probe every {} rounds",
        config.workload.rounds,
        config.workload.key_count,
        config.workload.value_len,
        config.workload.miss_every
    );

    let report = run_closed_loop(&config).await?;

    info!(
        "verified {} of {} rounds, {} miss probes",
        report.reads_verified, report.rounds, report.miss_probes
    );
    if let Some(summary) = &report.put_latency {
        info!("put latency: {summary}");
    }
    if let Some(summary) = &report.get_latency {
        info!("get latency: {summary}");
    }
    info!("finished");

    Ok(())
}
