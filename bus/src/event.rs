//! Event contract.
//!
//! An event is anything with a name. The name selects which listeners see it; the concrete type
//! carries the payload. Listeners receive events as `&dyn Event` and recover the payload with a
//! checked downcast:
//!
//! ```rust,ignore
//! #[derive(Debug)]
//! struct Damage { amount: u32 }
//!
//! impl Event for Damage {
//!     fn name(&self) -> &str { "damage" }
//! }
//!
//! fn on_event(event: &dyn Event) {
//!     if let Some(damage) = event.downcast_ref::<Damage>() {
//!         println!("took {}", damage.amount);
//!     }
//! }
//! ```
//!
//! For events that are just a name and a value, [`Payload`] saves the boilerplate.

use std::{any::Any, fmt};

/// Access to `&dyn Any` for any `'static` type.
///
/// This is blanket-implemented and exists so that `dyn Event` can be downcast.
pub trait AsAny {
    /// Returns a reference to self as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A named event.
///
/// Events must be:
/// - `'static`: No borrowed data
/// - `Send + Sync`: Queued events cross threads and are read by listeners on any thread
/// - `Debug`: For diagnostics and logging
pub trait Event: AsAny + Send + Sync + fmt::Debug + 'static {
    /// The name listeners register for.
    fn name(&self) -> &str;
}

impl dyn Event {
    /// Returns `true` if the event's concrete type is `E`.
    #[inline]
    pub fn is<E: Event>(&self) -> bool {
        self.as_any().is::<E>()
    }

    /// Returns the event as `E` if that is its concrete type.
    #[inline]
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }
}

/// An event made of a name and a typed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload<T> {
    name: String,
    value: T,
}

impl<T> Payload<T> {
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T: fmt::Debug + Send + Sync + 'static> Event for Payload<T> {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Resized {
        width: u32,
    }

    impl Event for Resized {
        fn name(&self) -> &str {
            "resized"
        }
    }

    #[test]
    fn payload_exposes_name_and_value() {
        let event = Payload::new("score", 12);

        assert_eq!(event.name(), "score");
        assert_eq!(*event.value(), 12);
        assert_eq!(event.into_value(), 12);
    }

    #[test]
    fn downcast_matches_concrete_type() {
        let event: &dyn Event = &Resized { width: 640 };

        assert!(event.is::<Resized>());
        assert_eq!(event.downcast_ref::<Resized>().map(|e| e.width), Some(640));
    }

    #[test]
    fn downcast_rejects_other_types() {
        let event: &dyn Event = &Payload::new("resized", 640u32);

        assert!(!event.is::<Resized>());
        assert!(event.downcast_ref::<Resized>().is_none());
        assert!(event.downcast_ref::<Payload<i32>>().is_none());
        assert_eq!(event.downcast_ref::<Payload<u32>>().map(|e| *e.value()), Some(640));
    }

    #[test]
    fn boxed_event_downcasts_through_deref() {
        let event: Box<dyn Event> = Box::new(Resized { width: 1 });

        assert!((*event).is::<Resized>());
        assert_eq!(event.name(), "resized");
    }
}
