//! Benchmark run configuration

use std::path::PathBuf;

/// Storage backend under measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Embedded single-file key-value store
    Redb,
    /// PostgreSQL over a pooled network connection
    Postgres,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Redb => write!(f, "redb"),
            Backend::Postgres => write!(f, "postgres"),
        }
    }
}

/// Configuration for a benchmark run
///
/// Constructed once at startup and immutable thereafter. There is no CLI or
/// environment surface; the defaults are the run parameters.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Wipe prior backend state during setup
    pub clear: bool,
    /// Backing file for the embedded store
    pub kv_path: PathBuf,
    /// Connection descriptor for the relational store
    /// (`host=... port=... user=... password=... dbname=... sslmode=...`)
    pub postgres_conn: String,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            clear: true,
            kv_path: std::env::temp_dir().join("store-bench").join("kv.redb"),
            postgres_conn:
                "host=localhost port=5432 user=bench password=bench dbname=benchmarks \
                 sslmode=disable"
                    .to_string(),
        }
    }
}

impl BenchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same run parameters but reattach to existing state instead of wiping it
    pub fn keep() -> Self {
        Self {
            clear: false,
            ..Default::default()
        }
    }
}
