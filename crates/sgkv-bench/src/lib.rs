//! # sgkv-bench
//!
//! Closed-loop benchmark harness for the SGKV protocol. Drives a
//! [`sgkv_core::KvClient`] against an in-process [`sgkv_core::KvServer`]
//! over async channels, verifies every read-back, and reports latency
//! percentiles per operation.
//!
//! The harness is a library plus a thin binary: tests exercise the run
//! loop directly, and the `sgkv-bench` binary wires it to a TOML config
//! file and structured logging.

pub mod config;
pub mod harness;
pub mod stats;

pub use config::{load_config, BenchConfig, ConfigError, FormatChoice};
pub use harness::{run_closed_loop, HarnessError, HarnessReport};
pub use stats::{LatencyRecorder, LatencySummary};
