use chrono::{DateTime, Local, NaiveDate, TimeZone};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Wall-clock milliseconds since the Unix epoch
pub type Millis = i64;

/// Source of wall-clock time for the engine
pub trait Clock {
    /// Current wall-clock time in milliseconds
    fn now_ms(&self) -> Millis;

    /// Local date-time for a timestamp
    fn local_time(&self, ts: Millis) -> DateTime<Local> {
        Local
            .timestamp_millis_opt(ts)
            .single()
            .unwrap_or_else(Local::now)
    }

    /// Local calendar date for a timestamp (used for the daily reset)
    fn local_date(&self, ts: Millis) -> NaiveDate {
        self.local_time(ts).date_naive()
    }
}

/// Real clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        Local::now().timestamp_millis()
    }
}

/// Hand-driven clock. Clones share the same time, so a test can keep one
/// handle and give another to the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start)),
        }
    }

    pub fn set(&self, ts: Millis) {
        self.now.store(ts, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: Millis) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.load(Ordering::SeqCst)
    }
}
