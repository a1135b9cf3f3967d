//! Promotion Cleanup

use jiff::{SignedDuration, Timestamp};
use serde::Serialize;

/// Default retention, in days, for expired promotions.
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Default number of promotions handled per cleanup step.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Cleanup settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupSettings {
    /// Days an expired promotion is kept after its end date
    pub days: u32,

    /// Promotions handled per step
    pub batch_size: usize,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self {
            days: DEFAULT_RETENTION_DAYS,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl CleanupSettings {
    /// Expired promotions that ended before the returned instant may be removed.
    pub fn retention_cutoff(&self, now: Timestamp) -> Timestamp {
        let retention = SignedDuration::from_hours(i64::from(self.days) * 24);

        now.checked_sub(retention).unwrap_or(Timestamp::MIN)
    }
}

/// Outcome of one cleanup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Promotions moved to the expired status
    pub marked: usize,

    /// Expired promotions removed
    pub removed: usize,
}
