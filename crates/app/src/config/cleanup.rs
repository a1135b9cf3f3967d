//! Cleanup Config

use clap::Args;
use estamp::cleanup::{CleanupSettings, DEFAULT_BATCH_SIZE, DEFAULT_RETENTION_DAYS};

/// Cleanup settings.
#[derive(Debug, Args)]
pub struct CleanupConfig {
    /// Days an expired promotion is kept after its end date
    #[arg(long, env = "CLEANUP_DAYS", default_value_t = DEFAULT_RETENTION_DAYS)]
    pub cleanup_days: u32,

    /// Promotions handled per cleanup step
    #[arg(long, env = "CLEANUP_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub cleanup_batch_size: usize,
}

impl CleanupConfig {
    /// Build cleanup settings from this configuration.
    pub fn settings(&self) -> CleanupSettings {
        CleanupSettings {
            days: self.cleanup_days,
            batch_size: self.cleanup_batch_size,
        }
    }
}
