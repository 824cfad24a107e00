//! Closed-loop benchmark harness.
//!
//! One client and one in-process server task exchange buffers over a pair
//! of unbounded tokio channels. The loop is closed: every round writes a
//! value, reads it back, and verifies the bytes before the next round
//! starts, so a reported latency always belongs to a correct exchange.

use std::time::Instant;

use sgkv_core::{
    ClientError, KvClient, KvServer, RequestIdCounter, ResponseOutcome, SegmentBuffer,
};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};

use crate::config::BenchConfig;
use crate::stats::{LatencyRecorder, LatencySummary};

/// Ways a benchmark run can fail.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("server task stopped before the run finished")]
    ServerGone,

    #[error("read back a different value than was written for {key}")]
    WrongValue { key: String },

    #[error("a key that was never written came back as a hit: {key}")]
    UnexpectedHit { key: String },
}

/// What a completed run measured.
#[derive(Debug)]
pub struct HarnessReport {
    /// Write/read rounds completed.
    pub rounds: u64,
    /// Reads whose bytes matched what was written.
    pub reads_verified: u64,
    /// Probes for never-written keys that correctly came back empty.
    pub miss_probes: u64,
    pub put_latency: Option<LatencySummary>,
    pub get_latency: Option<LatencySummary>,
}

/// Runs the configured closed-loop workload to completion.
///
/// The server lives in a spawned task; the client drives it one request
/// at a time from this task. Dropping the request sender at the end of
/// the run is what tells the server to exit.
pub async fn run_closed_loop(config: &BenchConfig) -> Result<HarnessReport, HarnessError> {
    let format = config.protocol.format.build();
    let server_format = config.protocol.format.build();

    let (req_tx, mut req_rx) = mpsc::unbounded_channel::<SegmentBuffer>();
    let (resp_tx, mut resp_rx) = mpsc::unbounded_channel::<SegmentBuffer>();

    let server = tokio::spawn(async move {
        let mut server = KvServer::new(server_format);
        while let Some(request) = req_rx.recv().await {
            match server.handle_request(request) {
                Ok(response) => {
                    if resp_tx.send(response).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!("server rejected a request: {e}");
                    break;
                }
            }
        }
        debug!("server task draining complete");
    });

    let ids = RequestIdCounter::new();
    let mut client = KvClient::new(format);
    let mut put_latency = LatencyRecorder::with_capacity(config.workload.rounds as usize);
    let mut get_latency = LatencyRecorder::with_capacity(config.workload.rounds as usize);
    let mut reads_verified = 0u64;
    let mut miss_probes = 0u64;

    for round in 0..config.workload.rounds {
        let key = key_for(round, config.workload.key_count);
        let value = value_for(round, config.workload.value_len);

        // Write the round's value.
        let started = Instant::now();
        let request = client.send_put(ids.next(), key.as_bytes(), &value)?;
        exchange(&mut client, &req_tx, &mut resp_rx, request).await?;
        put_latency.record(started.elapsed());

        // Read it back and verify the bytes.
        let started = Instant::now();
        let request = client.send_get(ids.next(), key.as_bytes())?;
        exchange(&mut client, &req_tx, &mut resp_rx, request).await?;
        get_latency.record(started.elapsed());

        match client.check_response()? {
            ResponseOutcome::Get { value: Some(v) } if *v == value => reads_verified += 1,
            _ => return Err(HarnessError::WrongValue { key }),
        }

        // Periodically probe a key nothing ever writes.
        if config.workload.miss_every != 0 && round % config.workload.miss_every == 0 {
            let missing = format!("bench/missing/{round:08}");
            let started = Instant::now();
            let request = client.send_get(ids.next(), missing.as_bytes())?;
            exchange(&mut client, &req_tx, &mut resp_rx, request).await?;
            get_latency.record(started.elapsed());

            match client.check_response()? {
                ResponseOutcome::Get { value: None } => miss_probes += 1,
                _ => return Err(HarnessError::UnexpectedHit { key: missing }),
            }
        }
    }

    drop(req_tx);
    server.await.map_err(|_| HarnessError::ServerGone)?;

    info!(
        "run complete: {} rounds, {} reads verified, {} miss probes",
        config.workload.rounds, reads_verified, miss_probes
    );

    Ok(HarnessReport {
        rounds: config.workload.rounds,
        reads_verified,
        miss_probes,
        put_latency: put_latency.summarize(),
        get_latency: get_latency.summarize(),
    })
}

/// Pushes one encoded request to the server and feeds the reply back into
/// the client's state machine.
async fn exchange(
    client: &mut KvClient,
    req_tx: &UnboundedSender<SegmentBuffer>,
    resp_rx: &mut UnboundedReceiver<SegmentBuffer>,
    request: SegmentBuffer,
) -> Result<(), HarnessError> {
    req_tx.send(request).map_err(|_| HarnessError::ServerGone)?;
    let reply = resp_rx.recv().await.ok_or(HarnessError::ServerGone)?;
    client.handle_response(reply)?;
    Ok(())
}

/// Round `n` writes to one of `key_count` rotating keys.
fn key_for(round: u64, key_count: usize) -> String {
    format!("bench/key/{:08}", round % key_count.max(1) as u64)
}

/// A value whose bytes identify the round that wrote it, so a stale read
/// fails verification instead of passing by accident.
fn value_for(round: u64, value_len: usize) -> Vec<u8> {
    vec![(round as u8).wrapping_add(1); value_len]
}
