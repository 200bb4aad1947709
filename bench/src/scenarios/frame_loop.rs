//! Frame loop scenario.
//!
//! Several producer threads fire a random mix of events, then the loop driver flushes once.
//! This is the shape of a game frame: input, physics and gameplay publish, and dispatch happens
//! at a single point at the end of the frame.

use std::sync::Arc;
use std::thread;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rusty_bus::{Bus, Config, Stats};

use super::Scenario;
use crate::events::{NAMES, Tally, random_event};

/// Configuration for the frame loop scenario.
#[derive(Debug, Clone)]
pub struct FrameLoopConfig {
    /// Number of producer threads per frame.
    pub producers: usize,
    /// Events each producer fires per frame.
    pub events_per_producer: usize,
    /// Listeners registered for each event name.
    pub listeners_per_name: usize,
    /// Bus configuration under test.
    pub bus: Config,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self {
            producers: 4,
            events_per_producer: 250,
            listeners_per_name: 4,
            bus: Config::default(),
            seed: 42,
        }
    }
}

pub struct FrameLoop {
    config: FrameLoopConfig,
    bus: Bus,
    listeners: Vec<Arc<Tally>>,
    frame: u64,
}

impl FrameLoop {
    pub fn new(config: FrameLoopConfig) -> Self {
        let bus = Bus::with_config(config.bus);
        Self {
            config,
            bus,
            listeners: Vec::new(),
            frame: 0,
        }
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Total deliveries observed by all listeners so far.
    pub fn calls(&self) -> usize {
        self.listeners.iter().map(|l| l.calls()).sum()
    }
}

impl Scenario for FrameLoop {
    fn name(&self) -> &'static str {
        "frame_loop"
    }

    fn description(&self) -> &'static str {
        "Producer threads fire mixed events; one flush per frame"
    }

    fn event_count(&self) -> usize {
        self.config.producers * self.config.events_per_producer
    }

    fn setup(&mut self) {
        for name in NAMES {
            let mut sink = self.bus.sink(name);
            for _ in 0..self.config.listeners_per_name {
                let tally = Arc::new(Tally::default());
                sink.add(&tally);
                self.listeners.push(tally);
            }
        }
    }

    fn update(&mut self) -> Stats {
        let bus = &self.bus;
        let events = self.config.events_per_producer;
        let frame_seed = self.config.seed.wrapping_add(self.frame * 1_000);

        thread::scope(|scope| {
            for producer in 0..self.config.producers {
                scope.spawn(move || {
                    let mut rng = ChaCha8Rng::seed_from_u64(frame_seed + producer as u64);
                    for _ in 0..events {
                        bus.fire_boxed(random_event(&mut rng));
                    }
                });
            }
        });

        self.frame += 1;
        self.bus.flush()
    }

    fn teardown(&mut self) {
        self.listeners.clear();
        self.bus.flush();
    }
}

#[cfg(test)]
mod tests {
    use rusty_bus::{Dispatch, LockScope};

    use super::*;

    fn small() -> FrameLoopConfig {
        FrameLoopConfig {
            producers: 2,
            events_per_producer: 50,
            listeners_per_name: 2,
            ..Default::default()
        }
    }

    #[test]
    fn every_event_reaches_every_listener_for_its_name() {
        let mut scenario = FrameLoop::new(small());
        scenario.setup();

        let stats = scenario.update();

        assert_eq!(stats.events, 100);
        assert_eq!(stats.delivered, 200);
        assert_eq!(stats.dropped, 0);
        assert_eq!(scenario.calls(), 200);
    }

    #[test]
    fn sharded_locked_config_delivers_the_same() {
        let config = FrameLoopConfig {
            bus: Config::default()
                .with_lock_scope(LockScope::Sharded)
                .with_dispatch(Dispatch::Locked),
            ..small()
        };
        let mut scenario = FrameLoop::new(config);
        scenario.setup();

        let stats = scenario.update();

        assert_eq!(stats.delivered, 200);
    }

    #[test]
    fn teardown_prunes_listeners() {
        let mut scenario = FrameLoop::new(small());
        scenario.setup();
        scenario.teardown();

        let stats = scenario.update();

        assert_eq!(stats.delivered, 0);
        assert_eq!(stats.dropped, 100);
        assert_eq!(scenario.bus().listener_count(NAMES[0]), 0);
    }
}
