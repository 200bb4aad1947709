//! Realistic workload scenarios for benchmarking.
//!
//! Each scenario sets up a bus with listeners, then runs one "frame" of work per update. They are
//! driven by `benches/bus_scenarios.rs` across every bus configuration.

pub mod churn;
pub mod frame_loop;

pub use churn::{Churn, ChurnConfig};
pub use frame_loop::{FrameLoop, FrameLoopConfig};

use rusty_bus::Stats;

/// Trait for benchmark scenarios.
pub trait Scenario {
    /// Name of the scenario for reporting.
    fn name(&self) -> &'static str;

    /// Description of what this scenario tests.
    fn description(&self) -> &'static str;

    /// Number of events produced per update.
    fn event_count(&self) -> usize;

    /// Register listeners and prepare any state.
    fn setup(&mut self);

    /// Run one frame and return the bus statistics it produced.
    fn update(&mut self) -> Stats;

    /// Drop listeners and discard anything still queued.
    fn teardown(&mut self);
}
