use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::{CodeError, Timestamp};

/// Wall-clock source for code generation and scheduling. A trait so the
/// refresh scheduler can run against a scripted clock in tests.
pub trait Clock {
    fn now(&self) -> Result<Timestamp, CodeError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<Timestamp, CodeError> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|_| CodeError::ClockUnavailable)
    }
}

#[test]
fn system_clock_is_readable() {
    // 2023-01-01, well before any run of this test suite
    assert!(SystemClock.now().unwrap() > 1_672_531_200);
}
