//! Bus configuration.
//!
//! A [`Bus`](crate::Bus) needs no configuration to work; [`Config::default()`] reproduces the
//! classic behavior of a single registry lock. The knobs here trade that simplicity for
//! concurrency or change how listener failures are treated.
//!
//! ```rust,ignore
//! let bus = Bus::with_config(
//!     Config::default()
//!         .with_lock_scope(LockScope::Sharded)
//!         .with_failure(Failure::Propagate),
//! );
//! ```

/// How the listener registry is locked.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LockScope {
    /// One lock guards every event name. At most one [`Sink`](crate::Sink) is alive per bus, and
    /// registrations for unrelated names serialize against each other.
    #[default]
    Global,

    /// Names live in a sharded concurrent map. Sinks for names in different shards can be held
    /// at the same time; a sink still excludes everything else in its shard.
    Sharded,
}

/// How listeners are invoked relative to the registry lock.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Copy the listener list under the lock, release it, then invoke callbacks. Listeners may
    /// register, remove or fire on the same bus from inside a callback.
    #[default]
    Snapshot,

    /// Invoke callbacks while the registry lock is held. A slow listener stalls every concurrent
    /// `sink()` caller, and a listener must not touch the registry of the same bus.
    Locked,
}

/// What happens when a listener panics during dispatch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Catch the panic, log it, count it in [`Stats::failed`](crate::Stats::failed) and continue
    /// with the next listener.
    #[default]
    Isolate,

    /// Let the panic unwind out of `flush` / `fire_immediate`. Events still waiting in the batch
    /// being flushed are dropped.
    Propagate,
}

/// Configuration for a [`Bus`](crate::Bus).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Registry locking strategy.
    pub lock_scope: LockScope,

    /// Listener invocation strategy.
    pub dispatch: Dispatch,

    /// Listener panic policy.
    pub failure: Failure,

    /// Initial capacity of the pending queue. This is an allocation hint; the queue is unbounded.
    pub queue_capacity: usize,
}

impl Config {
    /// Default initial queue capacity.
    pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

    pub fn with_lock_scope(mut self, lock_scope: LockScope) -> Self {
        self.lock_scope = lock_scope;
        self
    }

    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn with_failure(mut self, failure: Failure) -> Self {
        self.failure = failure;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_scope: LockScope::default(),
            dispatch: Dispatch::default(),
            failure: Failure::default(),
            queue_capacity: Self::DEFAULT_QUEUE_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_global_snapshot_isolate() {
        let config = Config::default();

        assert_eq!(config.lock_scope, LockScope::Global);
        assert_eq!(config.dispatch, Dispatch::Snapshot);
        assert_eq!(config.failure, Failure::Isolate);
        assert_eq!(config.queue_capacity, Config::DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn builders_override_fields() {
        let config = Config::default()
            .with_lock_scope(LockScope::Sharded)
            .with_dispatch(Dispatch::Locked)
            .with_failure(Failure::Propagate)
            .with_queue_capacity(8);

        assert_eq!(config.lock_scope, LockScope::Sharded);
        assert_eq!(config.dispatch, Dispatch::Locked);
        assert_eq!(config.failure, Failure::Propagate);
        assert_eq!(config.queue_capacity, 8);
    }
}
