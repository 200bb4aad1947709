//! Errors reported by the bus.
//!
//! Most bus operations cannot fail: firing never fails, flushing an empty queue is a no-op and
//! dispatching to a name without listeners simply drops the event. The conditions that remain are
//! caller mistakes that the bus reports instead of silently ignoring.

use thiserror::Error;

/// Errors produced by registry operations.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A listener was removed from a name it was never registered for (or was already removed).
    ///
    /// The listener collection is left untouched.
    #[error("listener is not registered for event '{name}'")]
    ListenerNotFound {
        /// The event name the sink was bound to.
        name: String,
    },
}

impl Error {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::ListenerNotFound { .. } => "listener_not_found",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listener_not_found_display_includes_name() {
        let err = Error::ListenerNotFound {
            name: "input".into(),
        };

        assert_eq!(err.to_string(), "listener is not registered for event 'input'");
        assert_eq!(err.as_label(), "listener_not_found");
    }
}
