//! Event and listener types used across benchmarks.
//!
//! The events are small, `Copy` payloads of the kind a game loop publishes many times per frame.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use rand::Rng;
use rusty_bus::{Event, Listener};

/// Every event name produced by [`random_event`].
pub const NAMES: [&str; 3] = [Input::NAME, Damage::NAME, Collision::NAME];

/// A key press.
#[derive(Clone, Copy, Debug, Default)]
pub struct Input {
    pub key: u32,
}

impl Input {
    pub const NAME: &'static str = "input";
}

impl Event for Input {
    fn name(&self) -> &str {
        Self::NAME
    }
}

/// Damage dealt to an entity.
#[derive(Clone, Copy, Debug, Default)]
pub struct Damage {
    pub target: u32,
    pub amount: i64,
}

impl Damage {
    pub const NAME: &'static str = "damage";
}

impl Event for Damage {
    fn name(&self) -> &str {
        Self::NAME
    }
}

/// Two entities touching.
#[derive(Clone, Copy, Debug, Default)]
pub struct Collision {
    pub a: u32,
    pub b: u32,
}

impl Collision {
    pub const NAME: &'static str = "collision";
}

impl Event for Collision {
    fn name(&self) -> &str {
        Self::NAME
    }
}

/// Create one event with a uniformly random name and payload.
pub fn random_event(rng: &mut impl Rng) -> Box<dyn Event> {
    match rng.gen_range(0..NAMES.len()) {
        0 => Box::new(Input {
            key: rng.gen_range(0..128),
        }),
        1 => Box::new(Damage {
            target: rng.gen_range(0..1_000),
            amount: rng.gen_range(1..100),
        }),
        _ => Box::new(Collision {
            a: rng.gen_range(0..1_000),
            b: rng.gen_range(0..1_000),
        }),
    }
}

/// Listener counting deliveries and summing [`Damage`] amounts.
#[derive(Debug, Default)]
pub struct Tally {
    calls: AtomicUsize,
    damage: AtomicI64,
}

impl Tally {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn damage(&self) -> i64 {
        self.damage.load(Ordering::Relaxed)
    }
}

impl Listener for Tally {
    fn on_event(&self, event: &dyn Event) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Some(damage) = event.downcast_ref::<Damage>() {
            self.damage.fetch_add(damage.amount, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn random_events_use_known_names() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..100 {
            let event = random_event(&mut rng);
            assert!(NAMES.contains(&event.name()));
        }
    }

    #[test]
    fn tally_sums_damage_only() {
        let tally = Tally::default();

        tally.on_event(&Damage {
            target: 1,
            amount: 5,
        });
        tally.on_event(&Input { key: 3 });
        tally.on_event(&Damage {
            target: 2,
            amount: 3,
        });

        assert_eq!(tally.calls(), 3);
        assert_eq!(tally.damage(), 8);
    }
}
