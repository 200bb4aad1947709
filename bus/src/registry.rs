//! Listener registry and scoped sinks.
//!
//! The registry maps event names to the ordered list of listeners registered for them. All
//! mutation goes through a [`Sink`], an exclusive accessor for one name that holds the registry
//! lock for as long as it lives:
//!
//! ```rust,ignore
//! let counter = Arc::new(Counter::default());
//!
//! bus.sink("input").add(&counter);
//! // ...
//! bus.sink("input").remove(&counter)?;
//! ```
//!
//! # Locking
//!
//! With [`LockScope::Global`] one mutex guards every name, so at most one sink exists per bus at
//! any instant. With [`LockScope::Sharded`] names live in a `DashMap`; a sink then holds the write
//! lock of its name's shard only.
//!
//! Either way a sink must not be held while firing or flushing on the same thread: dispatch takes
//! the same lock. Create the sink, register, and let it drop within one statement or a short
//! block.
//!
//! # Listener lifetime
//!
//! The registry stores [`Weak`] references. A listener that is dropped without being removed is
//! never invoked again; its entry is pruned the next time its name is dispatched.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard, Weak},
};

use dashmap::{DashMap, mapref::one::RefMut};

use crate::{
    config::LockScope,
    error::Error,
    listener::{ErasedListener, Listener},
    util::{address, lock},
};

/// Ordered listener references for a single event name.
#[derive(Default)]
pub(crate) struct Listeners {
    entries: Vec<Weak<dyn Listener>>,
}

impl Listeners {
    fn push(&mut self, listener: Weak<dyn Listener>) {
        self.entries.push(listener);
    }

    fn position(&self, target: *const ()) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| address(entry.as_ptr()) == target)
    }

    /// Number of references whose listener is still alive.
    fn live_len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }

    /// Upgrade every live listener in registration order, pruning dead entries.
    ///
    /// Returns the live listeners and the number of entries pruned.
    pub(crate) fn live(&mut self) -> (Vec<Arc<dyn Listener>>, usize) {
        let before = self.entries.len();
        let mut live = Vec::with_capacity(before);
        self.entries.retain(|entry| match entry.upgrade() {
            Some(listener) => {
                live.push(listener);
                true
            }
            None => false,
        });
        (live, before - self.entries.len())
    }
}

/// Name → listeners mapping behind the registry lock.
pub(crate) enum Registry {
    Global(Mutex<HashMap<Arc<str>, Listeners>>),
    Sharded(DashMap<Arc<str>, Listeners>),
}

impl Registry {
    pub(crate) fn new(scope: LockScope) -> Self {
        match scope {
            LockScope::Global => Registry::Global(Mutex::new(HashMap::new())),
            LockScope::Sharded => Registry::Sharded(DashMap::new()),
        }
    }

    /// Acquire exclusive access to the listeners of `name`, creating an empty list if needed.
    ///
    /// Blocks until the lock guarding `name` is free.
    pub(crate) fn sink(&self, name: &str) -> Sink<'_> {
        let name: Arc<str> = Arc::from(name);
        let guard = match self {
            Registry::Global(map) => {
                let mut map = lock(map);
                map.entry(name.clone()).or_default();
                Guard::Global(map)
            }
            Registry::Sharded(map) => Guard::Sharded(map.entry(name.clone()).or_default()),
        };
        Sink { name, guard }
    }

    /// Run `f` on the listeners of `name` while holding the registry lock.
    ///
    /// Returns `None` without calling `f` if nothing was ever registered under `name`.
    pub(crate) fn with_listeners<R>(
        &self,
        name: &str,
        f: impl FnOnce(&mut Listeners) -> R,
    ) -> Option<R> {
        match self {
            Registry::Global(map) => lock(map).get_mut(name).map(f),
            Registry::Sharded(map) => map.get_mut(name).map(|mut entry| f(entry.value_mut())),
        }
    }

    /// Number of live listeners registered for `name`.
    pub(crate) fn listener_count(&self, name: &str) -> usize {
        match self {
            Registry::Global(map) => lock(map).get(name).map_or(0, Listeners::live_len),
            Registry::Sharded(map) => map.get(name).map_or(0, |entry| entry.live_len()),
        }
    }

    /// Every name a sink was ever opened for, sorted.
    pub(crate) fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = match self {
            Registry::Global(map) => lock(map).keys().map(|name| name.to_string()).collect(),
            Registry::Sharded(map) => map.iter().map(|entry| entry.key().to_string()).collect(),
        };
        names.sort_unstable();
        names
    }
}

enum Guard<'a> {
    Global(MutexGuard<'a, HashMap<Arc<str>, Listeners>>),
    Sharded(RefMut<'a, Arc<str>, Listeners>),
}

/// Exclusive, scoped access to the listeners of one event name.
///
/// Obtained from [`Bus::sink()`](crate::Bus::sink). The registry lock is acquired when the sink
/// is created and released exactly once when it is dropped, whether the scope ends normally, by
/// early return, or by unwinding.
pub struct Sink<'a> {
    name: Arc<str>,
    guard: Guard<'a>,
}

impl Sink<'_> {
    /// The event name this sink is bound to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register `listener` at the end of the list.
    ///
    /// No uniqueness check is made: a listener added twice is invoked twice per event. Both
    /// concrete listeners and `Arc<dyn Listener>` are accepted.
    pub fn add<L: ErasedListener + ?Sized>(&mut self, listener: &Arc<L>) {
        let weak = L::downgrade(listener);
        self.listeners_mut().push(weak);
    }

    /// Remove the first registration of `listener`, compared by identity.
    ///
    /// Returns [`Error::ListenerNotFound`] and leaves the list unchanged if `listener` is not
    /// registered under this name.
    pub fn remove<L: Listener + ?Sized>(&mut self, listener: &Arc<L>) -> Result<(), Error> {
        let target = address(Arc::as_ptr(listener));
        let listeners = self.listeners_mut();
        match listeners.position(target) {
            Some(index) => {
                listeners.entries.remove(index);
                Ok(())
            }
            None => {
                log::warn!("remove of unregistered listener for '{}'", self.name);
                Err(Error::ListenerNotFound {
                    name: self.name.to_string(),
                })
            }
        }
    }

    /// Returns `true` if `listener` is registered under this name.
    pub fn contains<L: Listener + ?Sized>(&self, listener: &Arc<L>) -> bool {
        let target = address(Arc::as_ptr(listener));
        self.listeners()
            .is_some_and(|listeners| listeners.position(target).is_some())
    }

    /// Number of live listeners registered under this name.
    pub fn len(&self) -> usize {
        self.listeners().map_or(0, Listeners::live_len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every listener registered under this name, returning how many references were
    /// dropped.
    pub fn clear(&mut self) -> usize {
        let listeners = self.listeners_mut();
        let removed = listeners.entries.len();
        listeners.entries.clear();
        removed
    }

    fn listeners(&self) -> Option<&Listeners> {
        match &self.guard {
            Guard::Global(map) => map.get(&*self.name),
            Guard::Sharded(entry) => Some(entry.value()),
        }
    }

    fn listeners_mut(&mut self) -> &mut Listeners {
        match &mut self.guard {
            Guard::Global(map) => map.entry(self.name.clone()).or_default(),
            Guard::Sharded(entry) => entry.value_mut(),
        }
    }
}

impl fmt::Debug for Sink<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("name", &self.name)
            .field("len", &self.len())
            .finish()
    }
}
