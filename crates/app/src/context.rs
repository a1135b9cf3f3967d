//! App Context

use std::sync::Arc;

use sqlx::migrate::MigrateError;
use thiserror::Error;

use crate::{
    config::AppConfig,
    database::{self, Db},
    domain::{
        cleanup::{CleanupService, PromotionCleanupJob},
        eligibility::{EligibilityService, PromotionEvaluator},
        promotions::{PgPromotionsService, PromotionsService},
        quotas::{AccountQuotaService, PgAccountQuotaService},
        redemptions::{RedemptionConsumer, RedemptionsService},
        rewards::{PgRewardsService, RewardsService},
        tiers::{PgTiersService, TiersService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrate(#[source] MigrateError),
}

/// Services wired once and shared by every command.
#[derive(Clone)]
pub struct AppContext {
    pub promotions: Arc<dyn PromotionsService>,
    pub rewards: Arc<dyn RewardsService>,
    pub tiers: Arc<dyn TiersService>,
    pub quotas: Arc<dyn AccountQuotaService>,
    pub eligibility: Arc<dyn EligibilityService>,
    pub redemptions: Arc<dyn RedemptionsService>,
    pub cleanup: Arc<dyn CleanupService>,
}

impl AppContext {
    /// Connect to the database and build every service from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let pool = database::connect(&config.database.database_url)
            .await
            .map_err(AppInitError::Database)?;

        let db = Db::new(pool).with_statement_timeout(config.database.statement_timeout_ms);

        Ok(Self::from_db(db, config))
    }

    /// Connect, apply pending migrations, then build the services.
    ///
    /// # Errors
    ///
    /// Returns an error when connecting or migrating fails.
    pub async fn migrated(config: &AppConfig) -> Result<Self, AppInitError> {
        let pool = database::connect(&config.database.database_url)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migrate)?;

        let db = Db::new(pool).with_statement_timeout(config.database.statement_timeout_ms);

        Ok(Self::from_db(db, config))
    }

    fn from_db(db: Db, config: &AppConfig) -> Self {
        let promotions: Arc<dyn PromotionsService> = Arc::new(PgPromotionsService::new(db.clone()));
        let tiers: Arc<dyn TiersService> = Arc::new(PgTiersService::new(db.clone()));
        let quotas: Arc<dyn AccountQuotaService> =
            Arc::new(PgAccountQuotaService::new(db.clone()));

        Self {
            rewards: Arc::new(PgRewardsService::new(db)),
            eligibility: Arc::new(PromotionEvaluator::new(
                Arc::clone(&quotas),
                Arc::clone(&promotions),
                config.evaluation.settings(),
            )),
            redemptions: Arc::new(RedemptionConsumer::new(
                Arc::clone(&promotions),
                Arc::clone(&tiers),
            )),
            cleanup: Arc::new(PromotionCleanupJob::new(
                Arc::clone(&promotions),
                config.cleanup.settings(),
            )),
            promotions,
            tiers,
            quotas,
        }
    }
}
