//! In-process publish/subscribe bus.
//!
//! Producers create named [`Event`]s and hand them to a [`Bus`]. Listeners register per event
//! name through a scoped [`Sink`] and are invoked either immediately on the firing thread
//! ([`Bus::fire_immediate`]) or in batches when the loop driver calls [`Bus::flush`].
//!
//! ```text
//!  producers                       Bus                              listeners
//!  ─────────                ┌─────────────────┐
//!  fire(e) ───────push─────►│ Queue           │
//!                           │ (event lock)    │── flush ──┐
//!                           └─────────────────┘           ▼
//!  fire_immediate(&e) ─────────────────────────────► dispatch ──► on_event(&e) ...
//!                           ┌─────────────────┐           ▲
//!  sink(name).add(&l) ─────►│ Registry        │── lookup ─┘
//!                           │ (listener lock) │
//!                           └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::{Arc, atomic::{AtomicI64, Ordering}};
//! use rusty_bus::{Bus, Payload, listener};
//!
//! let bus = Bus::new();
//! let total = Arc::new(AtomicI64::new(0));
//! let sum = {
//!     let total = total.clone();
//!     Arc::new(listener::typed(move |e: &Payload<i64>| {
//!         total.fetch_add(*e.value(), Ordering::Relaxed);
//!     }))
//! };
//!
//! bus.sink("t").add(&sum);
//! bus.fire(Payload::new("t", 5i64));
//! bus.fire(Payload::new("t", 3i64));
//! bus.flush();
//!
//! assert_eq!(total.load(Ordering::Relaxed), 8);
//! ```

use std::sync::OnceLock;

pub mod bus;
pub mod config;
pub mod error;
pub mod event;
pub mod listener;
pub(crate) mod queue;
pub mod registry;
pub(crate) mod util;

pub use bus::{Bus, Stats};
pub use config::{Config, Dispatch, Failure, LockScope};
pub use error::Error;
pub use event::{Event, Payload};
pub use listener::Listener;
pub use registry::Sink;

static GLOBAL: OnceLock<Bus> = OnceLock::new();

/// The process-wide bus, created with the default configuration on first use.
///
/// The bus is never dropped. Events still queued when the process exits are neither delivered
/// nor dropped, so their `Drop` impls never run; call `global().flush()` during shutdown to
/// drain them.
pub fn global() -> &'static Bus {
    GLOBAL.get_or_init(Bus::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_returns_one_instance() {
        assert!(std::ptr::eq(global(), global()));
        assert_eq!(*global().config(), Config::default());
    }

    #[test]
    fn flushing_global_drains_its_queue() {
        global().fire(Payload::new("global_shutdown", ()));
        assert!(global().pending() >= 1);

        global().flush();

        assert_eq!(global().pending(), 0);
    }
}
