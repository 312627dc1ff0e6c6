use std::time::{Duration, Instant};

/// Quiet period between the last keystroke and the search it triggers.
pub(crate) const SEARCH_DEBOUNCE: Duration = Duration::from_millis(200);

/// A single cancellable delayed action. Scheduling replaces whatever was
/// pending, so only the most recent payload can ever fire.
pub(crate) struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

struct Pending<T> {
    due: Instant,
    payload: T,
}

impl<T> Debouncer<T> {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Arm the timer for `payload`, dropping any earlier payload unfired.
    pub(crate) fn schedule(&mut self, payload: T, now: Instant) {
        self.pending = Some(Pending {
            due: now + self.delay,
            payload,
        });
    }

    pub(crate) fn cancel(&mut self) {
        self.pending = None;
    }

    /// When the pending action becomes due, if any.
    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.due)
    }

    /// Hand out the payload once its quiet period has elapsed.
    pub(crate) fn take_due(&mut self, now: Instant) -> Option<T> {
        if self.pending.as_ref().is_some_and(|pending| pending.due <= now) {
            self.pending.take().map(|pending| pending.payload)
        } else {
            None
        }
    }
}
