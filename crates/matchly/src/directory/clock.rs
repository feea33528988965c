use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of creation timestamps (epoch milliseconds).
pub trait Clock: Debug + Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Wall clock whose readings strictly increase within one process, so records
/// created in the same millisecond still order by creation.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicI64,
}

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }
}

/// Deterministic clock for tests and demos: starts at `start`, advances by `step`.
#[derive(Debug)]
pub struct SteppingClock {
    next: AtomicI64,
    step: i64,
}

impl SteppingClock {
    pub fn new(start: i64, step: i64) -> Self {
        Self {
            next: AtomicI64::new(start),
            step,
        }
    }

    pub fn fixed(at: i64) -> Self {
        Self::new(at, 0)
    }
}

impl Clock for SteppingClock {
    fn now_millis(&self) -> i64 {
        self.next.fetch_add(self.step, Ordering::AcqRel)
    }
}
