//! TOML-based configuration for benchmark runs.
//!
//! The `sgkv-bench` binary reads its workload from a TOML file whose path
//! is the first command-line argument (default: `sgkv-bench.toml`). A
//! missing file is not an error; the built-in defaults describe a small
//! smoke-test workload. Example:
//!
//! ```toml
//! [workload]
//! rounds = 10000
//! key_count = 256
//! value_len = 4096
//! miss_every = 16
//!
//! [protocol]
//! format = "bincode"
//! ```
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return
//! value of `some_fn()` when the field is absent from the TOML file, so a
//! partial config file only has to name what it changes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sgkv_core::{BincodeFormat, EnvelopeFormat, WireFormat};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level benchmark configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BenchConfig {
    #[serde(default)]
    pub workload: WorkloadConfig,
    #[serde(default)]
    pub protocol: ProtocolConfig,
}

/// Shape of the PUT/GET workload the harness drives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkloadConfig {
    /// Number of PUT-then-GET rounds to run.
    #[serde(default = "default_rounds")]
    pub rounds: u64,
    /// Number of distinct keys cycled through.
    #[serde(default = "default_key_count")]
    pub key_count: usize,
    /// Length of each stored value in bytes.
    #[serde(default = "default_value_len")]
    pub value_len: usize,
    /// Probe a never-stored key every this many rounds, starting with the
    /// first. `0` disables miss probes.
    #[serde(default = "default_miss_every")]
    pub miss_every: u64,
}

/// Which wire format both roles speak.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProtocolConfig {
    #[serde(default)]
    pub format: FormatChoice,
}

/// Named wire formats the harness can run over.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FormatChoice {
    Envelope,
    Bincode,
}

impl FormatChoice {
    /// Instantiates the chosen format.
    pub fn build(&self) -> Arc<dyn WireFormat> {
        match self {
            FormatChoice::Envelope => Arc::new(EnvelopeFormat),
            FormatChoice::Bincode => Arc::new(BincodeFormat),
        }
    }
}

impl std::fmt::Display for FormatChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatChoice::Envelope => write!(f, "envelope"),
            FormatChoice::Bincode => write!(f, "bincode"),
        }
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_rounds() -> u64 {
    1000
}
fn default_key_count() -> usize {
    64
}
fn default_value_len() -> usize {
    1024
}
fn default_miss_every() -> u64 {
    16
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            workload: WorkloadConfig::default(),
            protocol: ProtocolConfig::default(),
        }
    }
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            key_count: default_key_count(),
            value_len: default_value_len(),
            miss_every: default_miss_every(),
        }
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            format: FormatChoice::default(),
        }
    }
}

impl Default for FormatChoice {
    fn default() -> Self {
        FormatChoice::Envelope
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Loads a [`BenchConfig`] from `path`, returning `BenchConfig::default()`
/// if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not
/// found", and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<BenchConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let config: BenchConfig = toml::from_str(&content)?;
            Ok(config)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BenchConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Unique temp directory per test, without relying on external crates.
    fn unique_temp_dir() -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!("sgkv_bench_test_{}_{n}", std::process::id()))
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_default_workload_is_a_small_smoke_test() {
        let config = BenchConfig::default();

        assert_eq!(config.workload.rounds, 1000);
        assert_eq!(config.workload.key_count, 64);
        assert_eq!(config.workload.value_len, 1024);
        assert_eq!(config.workload.miss_every, 16);
    }

    #[test]
    fn test_default_format_is_the_envelope_codec() {
        let config = BenchConfig::default();
        assert_eq!(config.protocol.format, FormatChoice::Envelope);
        assert_eq!(config.protocol.format.build().name(), "envelope");
    }

    // ── TOML round-trip ───────────────────────────────────────────────────────

    #[test]
    fn test_config_serializes_and_deserializes_round_trip() {
        // Arrange
        let mut config = BenchConfig::default();
        config.workload.rounds = 5000;
        config.protocol.format = FormatChoice::Bincode;

        // Act
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let restored: BenchConfig = toml::from_str(&toml_str).expect("deserialize");

        // Assert
        assert_eq!(config, restored);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: BenchConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(config, BenchConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides_only_named_fields() {
        // Arrange
        let toml_str = r#"
[workload]
rounds = 42

[protocol]
format = "bincode"
"#;

        // Act
        let config: BenchConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(config.workload.rounds, 42);
        assert_eq!(config.protocol.format, FormatChoice::Bincode);
        // Unspecified fields keep their defaults
        assert_eq!(config.workload.key_count, 64);
        assert_eq!(config.workload.value_len, 1024);
    }

    #[test]
    fn test_unknown_format_name_is_rejected() {
        let toml_str = r#"
[protocol]
format = "carrier-pigeon"
"#;
        let result: Result<BenchConfig, toml::de::Error> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_toml_returns_parse_error() {
        let result = toml::from_str::<BenchConfig>("[[[ not valid toml");
        assert!(result.is_err());
    }

    // ── load_config ───────────────────────────────────────────────────────────

    #[test]
    fn test_load_config_returns_default_when_file_absent() {
        let path = unique_temp_dir().join("never-created.toml");

        let config = load_config(&path).expect("absent file is not an error");

        assert_eq!(config, BenchConfig::default());
    }

    #[test]
    fn test_load_config_reads_a_written_file() {
        // Arrange
        let dir = unique_temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bench.toml");
        std::fs::write(&path, "[workload]\nrounds = 7\n").unwrap();

        // Act
        let config = load_config(&path).expect("load");

        // Assert
        assert_eq!(config.workload.rounds, 7);
        assert_eq!(config.workload.key_count, 64);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_surfaces_malformed_toml() {
        // Arrange
        let dir = unique_temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.toml");
        std::fs::write(&path, "rounds = = 7").unwrap();

        // Act
        let result = load_config(&path);

        // Assert
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_format_choice_builds_the_matching_format() {
        assert_eq!(FormatChoice::Envelope.build().name(), "envelope");
        assert_eq!(FormatChoice::Bincode.build().name(), "bincode");
    }

    #[test]
    fn test_format_choice_displays_its_toml_spelling() {
        assert_eq!(FormatChoice::Envelope.to_string(), "envelope");
        assert_eq!(FormatChoice::Bincode.to_string(), "bincode");
    }
}
