//! Application configuration

use clap::Args;

use crate::config::{
    cleanup::CleanupConfig, db::DatabaseConfig, evaluation::EvaluationConfig,
    logging::LoggingConfig,
};

pub mod cleanup;
pub mod db;
pub mod evaluation;
pub mod logging;

/// Estamp application configuration
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Promotion evaluation settings.
    #[command(flatten)]
    pub evaluation: EvaluationConfig,

    /// Promotion cleanup settings.
    #[command(flatten)]
    pub cleanup: CleanupConfig,
}
