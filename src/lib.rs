//! Single-key throughput benchmarks
//!
//! Compares raw write/read throughput of an embedded key-value store (redb)
//! against PostgreSQL reached over a pooled network connection. The crate
//! only provides backend setup and the per-key operations; criterion bench
//! targets under `benches/` drive them sequentially and across workers.

pub mod config;
pub mod stores;
pub mod workload;
