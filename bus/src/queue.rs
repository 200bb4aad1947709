//! Pending event queue.
//!
//! An unbounded FIFO of owned events guarded by its own lock, separate from the registry lock.
//! Producers append with [`push()`](Queue::push); the flusher swaps out the whole batch with
//! [`take()`](Queue::take) and dispatches it after the lock is released, so producers never wait
//! on listener execution.
//!
//! ```text
//! fire ──push──┐
//! fire ──push──┼──► Queue ──take──► flush ──► listeners
//! fire ──push──┘      ▲
//!                     └── events fired during a flush wait for the next one
//! ```

use std::sync::Mutex;

use crate::{event::Event, util::lock};

pub(crate) struct Queue {
    events: Mutex<Vec<Box<dyn Event>>>,
    capacity: usize,
}

impl Queue {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append an event at the tail. Queue order is the order in which callers acquire the lock.
    pub(crate) fn push(&self, event: Box<dyn Event>) {
        lock(&self.events).push(event);
    }

    /// Remove and return every pending event in FIFO order.
    pub(crate) fn take(&self) -> Vec<Box<dyn Event>> {
        let fresh = Vec::with_capacity(self.capacity);
        std::mem::replace(&mut *lock(&self.events), fresh)
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.events).len()
    }
}

impl Drop for Queue {
    fn drop(&mut self) {
        let events = self
            .events
            .get_mut()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if !events.is_empty() {
            log::debug!("discarding {} undelivered events", events.len());
        }
    }
}
