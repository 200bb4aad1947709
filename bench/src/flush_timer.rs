//! Flush timing utilities for measuring dispatch latency in a loop.
//!
//! Criterion reports throughput; these helpers record the latency of each individual flush so a
//! scenario can report tail behavior (p95/p99) as seen by the thread driving the loop.

use std::time::{Duration, Instant};

use rusty_bus::Stats;

/// Statistics collected from flush timing measurements.
#[derive(Debug, Clone)]
pub struct FlushStats {
    /// Number of flushes measured.
    pub flush_count: usize,
    /// Events dispatched across all flushes.
    pub event_count: usize,
    /// Total time spent flushing.
    pub total_duration: Duration,
    /// Sorted flush times for percentile calculations.
    sorted_times: Vec<Duration>,
}

impl FlushStats {
    /// Create flush stats from recorded flush times and the number of events they dispatched.
    pub fn from_times(times: Vec<Duration>, event_count: usize) -> Self {
        let flush_count = times.len();
        let total_duration: Duration = times.iter().sum();

        let mut sorted_times = times;
        sorted_times.sort();

        Self {
            flush_count,
            event_count,
            total_duration,
            sorted_times,
        }
    }

    /// Average flush time.
    pub fn average(&self) -> Duration {
        if self.flush_count == 0 {
            Duration::ZERO
        } else {
            self.total_duration / self.flush_count as u32
        }
    }

    /// Get a specific percentile (0-100).
    pub fn percentile(&self, p: usize) -> Duration {
        if self.sorted_times.is_empty() {
            return Duration::ZERO;
        }
        let p = p.min(100);
        let index = (self.sorted_times.len() * p / 100).min(self.sorted_times.len() - 1);
        self.sorted_times[index]
    }

    pub fn p95(&self) -> Duration {
        self.percentile(95)
    }

    pub fn p99(&self) -> Duration {
        self.percentile(99)
    }

    /// Dispatched events per second of flushing.
    pub fn events_per_second(&self) -> f64 {
        if self.total_duration.is_zero() {
            0.0
        } else {
            self.event_count as f64 / self.total_duration.as_secs_f64()
        }
    }
}

impl std::fmt::Display for FlushStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} flushes, {} events, avg: {:.3}ms, p95: {:.3}ms, p99: {:.3}ms ({:.0} events/s)",
            self.flush_count,
            self.event_count,
            self.average().as_secs_f64() * 1000.0,
            self.p95().as_secs_f64() * 1000.0,
            self.p99().as_secs_f64() * 1000.0,
            self.events_per_second(),
        )
    }
}

/// Run `frame_count` frames, timing the flush that ends each frame.
///
/// `produce` runs untimed at the start of each frame (receives the frame number); `flush` is
/// timed and returns the bus [`Stats`] for that flush.
pub fn measure_flushes<P, F>(frame_count: usize, mut produce: P, mut flush: F) -> FlushStats
where
    P: FnMut(usize),
    F: FnMut() -> Stats,
{
    let mut times = Vec::with_capacity(frame_count);
    let mut events = 0;

    for frame in 0..frame_count {
        produce(frame);

        let start = Instant::now();
        let stats = flush();
        times.push(start.elapsed());

        events += stats.events;
    }

    FlushStats::from_times(times, events)
}
