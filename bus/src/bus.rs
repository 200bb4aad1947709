//! The event bus.
//!
//! [`Bus`] ties the listener [registry](crate::registry) and the pending [queue](crate::queue)
//! together and offers two delivery paths:
//!
//! - **Deferred**: [`fire()`](Bus::fire) enqueues and returns; [`flush()`](Bus::flush), called by
//!   whoever drives the application loop, dispatches everything queued so far.
//! - **Immediate**: [`fire_immediate()`](Bus::fire_immediate) dispatches on the calling thread
//!   before returning.
//!
//! # Ordering
//!
//! Within one flush events are dispatched in the order they were queued, and for each event
//! listeners run in registration order. Nothing is guaranteed across event names, between the
//! immediate and deferred paths, or between registration changes and a dispatch already in
//! flight: membership is read when an event is dispatched, not when it is fired.
//!
//! # Example
//!
//! ```rust,ignore
//! let bus = Bus::new();
//! let total = Arc::new(listener::typed(|e: &Payload<i64>| { /* ... */ }));
//!
//! bus.sink("score").add(&total);
//!
//! bus.fire(Payload::new("score", 5i64));
//! bus.fire(Payload::new("score", 3i64));
//! bus.flush();
//! ```

use std::{
    any::Any,
    fmt,
    ops::AddAssign,
    panic::{self, AssertUnwindSafe},
    sync::{Mutex, TryLockError},
};

use crate::{
    config::{Config, Dispatch, Failure},
    event::Event,
    listener::Listener,
    queue::Queue,
    registry::{Listeners, Registry, Sink},
};

/// Counters describing one `flush` or `fire_immediate` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Events dispatched.
    pub events: usize,
    /// Listener invocations that returned normally.
    pub delivered: usize,
    /// Events that found no live listener.
    pub dropped: usize,
    /// Listener invocations that panicked (only counted under [`Failure::Isolate`]).
    pub failed: usize,
    /// Registrations of dropped listeners removed during dispatch.
    pub pruned: usize,
}

impl AddAssign for Stats {
    fn add_assign(&mut self, other: Stats) {
        self.events += other.events;
        self.delivered += other.delivered;
        self.dropped += other.dropped;
        self.failed += other.failed;
        self.pruned += other.pruned;
    }
}

/// In-process publish/subscribe hub.
///
/// `Bus` is `Send + Sync`; share it by reference, in an `Arc`, or use the process-wide instance
/// returned by [`global()`](crate::global).
pub struct Bus {
    config: Config,
    registry: Registry,
    queue: Queue,
    flushing: Mutex<()>,
}

impl Bus {
    /// Create a bus with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        log::debug!("event bus created with {config:?}");
        Self {
            config,
            registry: Registry::new(config.lock_scope),
            queue: Queue::with_capacity(config.queue_capacity),
            flushing: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Acquire exclusive access to the listeners of `name`.
    ///
    /// Blocks until the registry lock is free. Keep the returned [`Sink`] short-lived and never
    /// fire, flush or open another sink on the same thread while holding it.
    pub fn sink(&self, name: &str) -> Sink<'_> {
        self.registry.sink(name)
    }

    /// Queue `event` for the next [`flush()`](Self::flush).
    pub fn fire<E: Event>(&self, event: E) {
        self.fire_boxed(Box::new(event));
    }

    /// Queue an already boxed event for the next [`flush()`](Self::flush).
    pub fn fire_boxed(&self, event: Box<dyn Event>) {
        log::trace!("queued event '{}'", event.name());
        self.queue.push(event);
    }

    /// Dispatch `event` to its listeners on the calling thread before returning.
    ///
    /// The event is borrowed; the caller keeps ownership.
    pub fn fire_immediate(&self, event: &dyn Event) -> Stats {
        let mut stats = Stats {
            events: 1,
            ..Stats::default()
        };
        self.dispatch(event, &mut stats);
        stats
    }

    /// Dispatch every queued event, in queue order, then drop it.
    ///
    /// Events fired while the flush runs (including from listeners) are left for the next flush.
    /// Only one flush runs at a time: a call that finds another flush in progress returns
    /// immediately with empty [`Stats`].
    pub fn flush(&self) -> Stats {
        let _flushing = match self.flushing.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                log::warn!("flush already in progress, skipping");
                return Stats::default();
            }
        };

        let mut stats = Stats::default();
        for event in self.queue.take() {
            stats.events += 1;
            self.dispatch(&*event, &mut stats);
        }

        if stats.events > 0 {
            log::trace!("flushed {stats:?}");
        }
        stats
    }

    /// Number of events waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of live listeners registered for `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.registry.listener_count(name)
    }

    /// Every event name a sink was ever opened for, sorted.
    ///
    /// Names are never forgotten: a name stays listed after its last listener is removed, and
    /// opening a sink only to `remove` from it also adds the name.
    pub fn names(&self) -> Vec<String> {
        self.registry.names()
    }

    fn dispatch(&self, event: &dyn Event, stats: &mut Stats) {
        let name = event.name();
        let invoked = match self.config.dispatch {
            Dispatch::Snapshot => {
                let snapshot = self.registry.with_listeners(name, Listeners::live);
                snapshot.map(|(live, pruned)| {
                    record_pruned(name, pruned, stats);
                    for listener in &live {
                        self.invoke(listener.as_ref(), event, stats);
                    }
                    live.len()
                })
            }
            Dispatch::Locked => self.registry.with_listeners(name, |listeners| {
                let (live, pruned) = listeners.live();
                record_pruned(name, pruned, stats);
                for listener in &live {
                    self.invoke(listener.as_ref(), event, stats);
                }
                live.len()
            }),
        };

        if invoked.unwrap_or(0) == 0 {
            stats.dropped += 1;
            log::debug!("no listeners for '{name}', event dropped");
        }
    }

    fn invoke(&self, listener: &dyn Listener, event: &dyn Event, stats: &mut Stats) {
        match self.config.failure {
            Failure::Propagate => listener.on_event(event),
            Failure::Isolate => {
                let result = panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(event)));
                if let Err(panic) = result {
                    stats.failed += 1;
                    log::error!(
                        "listener for '{}' panicked: {}",
                        event.name(),
                        panic_message(panic.as_ref())
                    );
                    return;
                }
            }
        }
        stats.delivered += 1;
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("config", &self.config)
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

fn record_pruned(name: &str, pruned: usize, stats: &mut Stats) {
    if pruned > 0 {
        stats.pruned += pruned;
        log::debug!("pruned {pruned} dropped listener(s) for '{name}'");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}
