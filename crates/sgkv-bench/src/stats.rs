//! Latency recording and summary statistics for benchmark runs.
//!
//! The recorder collects raw per-operation durations; the summary reduces
//! them to the handful of numbers worth logging. Percentiles use the
//! nearest-rank method: p99 over 100 samples is the 99th smallest, not an
//! interpolation.

use std::fmt;
use std::time::Duration;

/// Collects per-operation latencies during a run.
#[derive(Debug, Default)]
pub struct LatencyRecorder {
    samples: Vec<Duration>,
}

impl LatencyRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Creates a recorder pre-sized for an expected sample count.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            samples: Vec::with_capacity(n),
        }
    }

    /// Records one sample.
    pub fn record(&mut self, sample: Duration) {
        self.samples.push(sample);
    }

    /// Number of recorded samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Reduces the samples to a [`LatencySummary`], or `None` when no
    /// samples were recorded.
    pub fn summarize(&self) -> Option<LatencySummary> {
        if self.samples.is_empty() {
            return None;
        }
        let mut sorted = self.samples.clone();
        sorted.sort_unstable();

        let count = sorted.len();
        let total: Duration = sorted.iter().sum();
        let mean = Duration::from_nanos((total.as_nanos() / count as u128) as u64);

        Some(LatencySummary {
            count,
            min: sorted[0],
            mean,
            p50: percentile(&sorted, 50),
            p99: percentile(&sorted, 99),
            max: sorted[count - 1],
        })
    }
}

/// Nearest-rank percentile over an ascending-sorted, non-empty slice.
fn percentile(sorted: &[Duration], pct: usize) -> Duration {
    let rank = (pct * sorted.len()).div_ceil(100);
    sorted[rank.saturating_sub(1)]
}

/// The numbers a run reports per operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySummary {
    pub count: usize,
    pub min: Duration,
    pub mean: Duration,
    pub p50: Duration,
    pub p99: Duration,
    pub max: Duration,
}

impl fmt::Display for LatencySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={} min={:?} mean={:?} p50={:?} p99={:?} max={:?}",
            self.count, self.min, self.mean, self.p50, self.p99, self.max
        )
    }
}
