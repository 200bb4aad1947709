//! Benchmark utilities for Rusty Bus.
//!
//! This crate provides benchmarking infrastructure for the event bus:
//!
//! - **Microbenchmarks**: Individual bus operations (fire, flush, fire_immediate, sink)
//! - **Scenario benchmarks**: Frame-loop workloads with many producers and registration churn
//! - **Flush timing**: Per-flush latency statistics across a simulated loop
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p rusty_bench
//!
//! # Run specific benchmark group
//! cargo bench -p rusty_bench -- flush
//! ```
//!
//! Results are written to `target/criterion/` with HTML reports for visualization.

pub mod events;
pub mod flush_timer;
pub mod scenarios;
