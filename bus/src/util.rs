use std::sync::{Mutex, MutexGuard, PoisonError};

/// Acquire a mutex, recovering the guard if a previous holder panicked.
///
/// Every critical section in the bus leaves its data structurally valid, so poisoning carries no
/// information worth failing on.
#[inline]
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Address of the value behind a (possibly fat) pointer, used for identity comparison.
#[inline]
pub(crate) fn address<T: ?Sized>(ptr: *const T) -> *const () {
    ptr as *const ()
}
