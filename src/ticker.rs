use crate::clock::Millis;
use std::time::Duration;

/// Poll interval of the terminal event loop in milliseconds
pub const DEFAULT_POLL_MS: u64 = 250;

/// Get the event loop poll duration
pub fn poll_duration() -> Duration {
    Duration::from_millis(DEFAULT_POLL_MS)
}

/// A cancellable periodic callback slot.
///
/// The owner calls [`Interval::fire`] whenever it gets control; the interval
/// reports whether its period has elapsed. A callback that comes back late
/// fires once and is rescheduled from `now`, so a starved loop never bursts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    period_ms: Millis,
    next_due: Option<Millis>,
}

impl Interval {
    pub fn new(period_ms: Millis) -> Self {
        Self {
            period_ms: period_ms.max(1),
            next_due: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Arm the interval if it isn't already (first fire at `now + period`)
    pub fn arm(&mut self, now: Millis) {
        if self.next_due.is_none() {
            self.next_due = Some(now.saturating_add(self.period_ms));
        }
    }

    /// Re-arm from `now`, dropping any pending deadline
    pub fn rearm(&mut self, now: Millis) {
        self.next_due = Some(now.saturating_add(self.period_ms));
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// Arm or cancel to match a governing condition
    pub fn set_armed(&mut self, armed: bool, now: Millis) {
        if armed {
            self.arm(now);
        } else {
            self.cancel();
        }
    }

    /// Returns true if the interval is due, rescheduling it from `now`
    pub fn fire(&mut self, now: Millis) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now.saturating_add(self.period_ms));
                true
            }
            _ => false,
        }
    }
}
