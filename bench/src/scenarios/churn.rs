//! Registration churn scenario.
//!
//! Short-lived listeners are registered and removed by worker threads while the driver delivers
//! events with `fire_immediate`. Stresses contention between sinks and dispatch on the registry,
//! which is where the global and sharded lock scopes differ.

use std::sync::Arc;
use std::thread;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rusty_bus::{Bus, Config, Stats};

use super::Scenario;
use crate::events::{NAMES, Tally, random_event};

/// Configuration for the churn scenario.
#[derive(Debug, Clone)]
pub struct ChurnConfig {
    /// Threads registering and removing listeners.
    pub workers: usize,
    /// Register/remove pairs each worker performs per frame.
    pub churn_per_worker: usize,
    /// Events delivered immediately by the driver per frame.
    pub events: usize,
    /// Listeners that stay registered for the whole run, per name.
    pub resident_per_name: usize,
    /// Bus configuration under test.
    pub bus: Config,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for ChurnConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            churn_per_worker: 100,
            events: 500,
            resident_per_name: 2,
            bus: Config::default(),
            seed: 42,
        }
    }
}

pub struct Churn {
    config: ChurnConfig,
    bus: Bus,
    resident: Vec<Arc<Tally>>,
    rng: ChaCha8Rng,
}

impl Churn {
    pub fn new(config: ChurnConfig) -> Self {
        let bus = Bus::with_config(config.bus);
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            bus,
            resident: Vec::new(),
            rng,
        }
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Deliveries observed by the resident listeners.
    pub fn resident_calls(&self) -> usize {
        self.resident.iter().map(|l| l.calls()).sum()
    }
}

impl Scenario for Churn {
    fn name(&self) -> &'static str {
        "churn"
    }

    fn description(&self) -> &'static str {
        "Listeners added and removed concurrently with immediate delivery"
    }

    fn event_count(&self) -> usize {
        self.config.events
    }

    fn setup(&mut self) {
        for name in NAMES {
            let mut sink = self.bus.sink(name);
            for _ in 0..self.config.resident_per_name {
                let tally = Arc::new(Tally::default());
                sink.add(&tally);
                self.resident.push(tally);
            }
        }
    }

    fn update(&mut self) -> Stats {
        let bus = &self.bus;
        let churn = self.config.churn_per_worker;
        let frame_seed: u64 = self.rng.r#gen();

        thread::scope(|scope| {
            for worker in 0..self.config.workers {
                scope.spawn(move || {
                    let mut rng = ChaCha8Rng::seed_from_u64(frame_seed.wrapping_add(worker as u64));
                    for _ in 0..churn {
                        let name = NAMES[rng.gen_range(0..NAMES.len())];
                        let tally = Arc::new(Tally::default());
                        bus.sink(name).add(&tally);
                        let removed = bus.sink(name).remove(&tally);
                        debug_assert!(removed.is_ok());
                    }
                });
            }

            let mut total = Stats::default();
            for _ in 0..self.config.events {
                let event = random_event(&mut self.rng);
                total += bus.fire_immediate(&*event);
            }
            total
        })
    }

    fn teardown(&mut self) {
        self.resident.clear();
    }
}
