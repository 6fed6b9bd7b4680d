//! Trace hooks for the parser. With the `tracing` feature enabled, the
//! predictor, scanner and completer emit real `tracing` spans and events for
//! whatever subscriber the caller has installed; without it the stand-in
//! macros below expand to nothing, so a default build parses with no
//! observable side effects.

#[cfg(feature = "tracing")]
pub(crate) use tracing::{event, span, Level};

/// What `span!` yields when the `tracing` feature is off: an inert value with
/// the one method the parser calls on a span.
#[cfg(not(feature = "tracing"))]
pub(crate) struct Disabled;

#[cfg(not(feature = "tracing"))]
impl Disabled {
    pub(crate) fn entered(self) -> Self {
        self
    }
}

#[cfg(not(feature = "tracing"))]
macro_rules! span {
    ($($swallowed:tt)*) => {
        crate::tracing::Disabled
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! event {
    ($($swallowed:tt)*) => {
        ()
    };
}

#[cfg(not(feature = "tracing"))]
pub(crate) use {event, span};
