//! Listener contract and adapters.
//!
//! A [`Listener`] handles events for the names it is registered under. Closures taking
//! `&dyn Event` are listeners out of the box. Two adapters cover the common typed cases:
//!
//! - [`typed()`] calls a closure only for events of one concrete type.
//! - [`forward()`] clones events of one concrete type into a channel, for consumers that would
//!   rather pull than be called back.
//!
//! Listeners take `&self`: the bus may invoke a listener from any thread, so state that changes
//! on delivery needs interior mutability (atomics, a mutex, a channel).

use std::{
    any::type_name,
    fmt,
    marker::PhantomData,
    sync::{
        Arc, Weak,
        atomic::{AtomicUsize, Ordering},
    },
};

use crossbeam::channel::{Receiver, Sender, unbounded};

use crate::event::Event;

/// Handles events delivered by a [`Bus`](crate::Bus).
pub trait Listener: Send + Sync + 'static {
    fn on_event(&self, event: &dyn Event);
}

impl<F> Listener for F
where
    F: Fn(&dyn Event) + Send + Sync + 'static,
{
    #[inline]
    fn on_event(&self, event: &dyn Event) {
        self(event)
    }
}

/// A listener that can be registered through an `Arc`, whether concrete or already erased to
/// `Arc<dyn Listener>`.
pub trait ErasedListener: Send + Sync + 'static {
    /// Weak, type-erased handle to `this`, as stored by the registry.
    fn downgrade(this: &Arc<Self>) -> Weak<dyn Listener>;
}

impl<L: Listener> ErasedListener for L {
    fn downgrade(this: &Arc<Self>) -> Weak<dyn Listener> {
        let weak: Weak<L> = Arc::downgrade(this);
        weak
    }
}

impl ErasedListener for dyn Listener {
    fn downgrade(this: &Arc<Self>) -> Weak<dyn Listener> {
        Arc::downgrade(this)
    }
}

/// Listener that invokes a handler for events whose concrete type is `E`.
///
/// Events of any other type are ignored and counted, see [`Typed::mismatched()`].
pub struct Typed<E, F> {
    handler: F,
    mismatched: AtomicUsize,
    _event: PhantomData<fn(&E)>,
}

/// Wrap `handler` so it only sees events of type `E`.
///
/// ```rust,ignore
/// let scores = Arc::new(listener::typed(|e: &Payload<i32>| total.fetch_add(*e.value(), Relaxed)));
/// bus.sink("score").add(&scores);
/// ```
pub fn typed<E, F>(handler: F) -> Typed<E, F>
where
    E: Event,
    F: Fn(&E) + Send + Sync + 'static,
{
    Typed {
        handler,
        mismatched: AtomicUsize::new(0),
        _event: PhantomData,
    }
}

impl<E, F> Typed<E, F> {
    /// Number of delivered events that were not of type `E`.
    pub fn mismatched(&self) -> usize {
        self.mismatched.load(Ordering::Relaxed)
    }
}

impl<E, F> Listener for Typed<E, F>
where
    E: Event,
    F: Fn(&E) + Send + Sync + 'static,
{
    fn on_event(&self, event: &dyn Event) {
        match event.downcast_ref::<E>() {
            Some(event) => (self.handler)(event),
            None => {
                self.mismatched.fetch_add(1, Ordering::Relaxed);
                log::debug!(
                    "listener for {} ignored event '{}' of another type",
                    type_name::<E>(),
                    event.name()
                );
            }
        }
    }
}

impl<E, F> fmt::Debug for Typed<E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Typed")
            .field("event", &type_name::<E>())
            .field("mismatched", &self.mismatched())
            .finish()
    }
}

/// Listener that clones events of type `E` into an unbounded channel.
#[derive(Debug)]
pub struct Forward<E> {
    sender: Sender<E>,
}

/// Create a forwarding listener and the receiving end of its channel.
///
/// The receiver sees events in delivery order. Once it is dropped, delivered events are
/// discarded.
pub fn forward<E: Event + Clone>() -> (Forward<E>, Receiver<E>) {
    let (sender, receiver) = unbounded();
    (Forward { sender }, receiver)
}

impl<E: Event + Clone> Listener for Forward<E> {
    fn on_event(&self, event: &dyn Event) {
        let Some(event) = event.downcast_ref::<E>() else {
            return;
        };
        if self.sender.send(event.clone()).is_err() {
            log::debug!(
                "forward receiver for '{}' disconnected, event discarded",
                event.name()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, atomic::AtomicI64};

    use crate::event::Payload;

    use super::*;

    #[test]
    fn closure_is_a_listener() {
        // Given
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let listener = move |event: &dyn Event| {
            assert_eq!(event.name(), "ping");
            counter.fetch_add(1, Ordering::Relaxed);
        };

        // When
        listener.on_event(&Payload::new("ping", ()));

        // Then
        assert_eq!(seen.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn typed_calls_handler_for_matching_type() {
        let total = Arc::new(AtomicI64::new(0));
        let sum = total.clone();
        let listener = typed(move |event: &Payload<i64>| {
            sum.fetch_add(*event.value(), Ordering::Relaxed);
        });

        listener.on_event(&Payload::new("t", 5i64));
        listener.on_event(&Payload::new("t", 3i64));

        assert_eq!(total.load(Ordering::Relaxed), 8);
        assert_eq!(listener.mismatched(), 0);
    }

    #[test]
    fn typed_counts_mismatched_types() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let listener = typed(move |_: &Payload<i64>| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        listener.on_event(&Payload::new("t", "text"));
        listener.on_event(&Payload::new("t", 1u8));

        assert_eq!(listener.mismatched(), 2);
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn forward_sends_clones_in_order() {
        let (listener, receiver) = forward::<Payload<u32>>();

        listener.on_event(&Payload::new("t", 1u32));
        listener.on_event(&Payload::new("t", "ignored"));
        listener.on_event(&Payload::new("t", 2u32));

        let values: Vec<u32> = receiver.try_iter().map(Payload::into_value).collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn forward_tolerates_dropped_receiver() {
        let (listener, receiver) = forward::<Payload<u32>>();
        drop(receiver);

        listener.on_event(&Payload::new("t", 1u32));
    }
}
