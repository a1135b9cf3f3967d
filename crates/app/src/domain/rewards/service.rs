//! Rewards service.

use async_trait::async_trait;
use estamp::{
    accounts::AccountId,
    promotions::PromotionUuid,
    rewards::{Reward, RewardType, RewardUuid},
};
use mockall::automock;
use tracing::{debug, info};

use crate::{
    database::Db,
    domain::rewards::{errors::RewardsServiceError, repository::PgRewardsRepository},
};

#[derive(Debug, Clone)]
pub struct PgRewardsService {
    db: Db,
    repository: PgRewardsRepository,
}

impl PgRewardsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgRewardsRepository::new(),
        }
    }
}

#[async_trait]
impl RewardsService for PgRewardsService {
    #[tracing::instrument(
        name = "rewards.service.list_for_promotion",
        skip(self),
        fields(promotion_uuid = %promotion),
        err
    )]
    async fn list_for_promotion(
        &self,
        promotion: PromotionUuid,
    ) -> Result<Vec<Reward>, RewardsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rewards = self
            .repository
            .list_for_promotions(&mut tx, &[promotion])
            .await?;

        tx.commit().await?;

        Ok(rewards)
    }

    #[tracing::instrument(
        name = "rewards.service.list_by_type",
        skip(self),
        fields(reward_type = %reward_type),
        err
    )]
    async fn list_by_type(
        &self,
        reward_type: &RewardType,
    ) -> Result<Vec<Reward>, RewardsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rewards = self.repository.list_by_type(&mut tx, reward_type).await?;

        tx.commit().await?;

        Ok(rewards)
    }

    #[tracing::instrument(
        name = "rewards.service.list_by_account",
        skip(self),
        fields(account_id = %account_id),
        err
    )]
    async fn list_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<Reward>, RewardsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rewards = self.repository.list_by_account(&mut tx, account_id).await?;

        tx.commit().await?;

        Ok(rewards)
    }

    #[tracing::instrument(
        name = "rewards.service.get_by_promotion_and_type",
        skip(self),
        fields(promotion_uuid = %promotion, reward_type = %reward_type),
        err
    )]
    async fn get_by_promotion_and_type(
        &self,
        promotion: PromotionUuid,
        reward_type: &RewardType,
    ) -> Result<Option<Reward>, RewardsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let reward = self
            .repository
            .get_by_promotion_and_type(&mut tx, promotion, reward_type)
            .await?;

        tx.commit().await?;

        if reward.is_none() {
            debug!("no reward of this type");
        }

        Ok(reward)
    }

    #[tracing::instrument(
        name = "rewards.service.save_reward",
        skip(self, reward),
        fields(reward_uuid = %reward.uuid, promotion_uuid = %reward.promotion),
        err
    )]
    async fn save_reward(&self, reward: Reward) -> Result<Reward, RewardsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let saved = self.repository.save(&mut tx, &reward).await?;

        tx.commit().await?;

        info!(reward_uuid = %saved.uuid, "saved reward");

        Ok(saved)
    }

    #[tracing::instrument(
        name = "rewards.service.remove_reward",
        skip(self),
        fields(reward_uuid = %reward),
        err
    )]
    async fn remove_reward(&self, reward: RewardUuid) -> Result<bool, RewardsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rows_affected = self.repository.delete(&mut tx, reward).await?;

        tx.commit().await?;

        Ok(rows_affected > 0)
    }
}

#[automock]
#[async_trait]
pub trait RewardsService: Send + Sync {
    /// Rewards granted by a promotion.
    async fn list_for_promotion(
        &self,
        promotion: PromotionUuid,
    ) -> Result<Vec<Reward>, RewardsServiceError>;

    /// Rewards of a given type.
    async fn list_by_type(
        &self,
        reward_type: &RewardType,
    ) -> Result<Vec<Reward>, RewardsServiceError>;

    /// Rewards crediting a member account.
    async fn list_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<Reward>, RewardsServiceError>;

    /// First reward of a given type granted by a promotion.
    async fn get_by_promotion_and_type(
        &self,
        promotion: PromotionUuid,
        reward_type: &RewardType,
    ) -> Result<Option<Reward>, RewardsServiceError>;

    /// Insert or update a reward.
    async fn save_reward(&self, reward: Reward) -> Result<Reward, RewardsServiceError>;

    /// Remove a reward. Returns `false` when it did not exist.
    async fn remove_reward(&self, reward: RewardUuid) -> Result<bool, RewardsServiceError>;
}

#[cfg(test)]
mod tests {
    use estamp::promotions::{NewPromotion, PromotionStatus};
    use testresult::TestResult;

    use crate::{domain::promotions::PromotionsService, test::TestContext};

    use super::*;

    fn stamp_reward(promotion: PromotionUuid, account: &str, value: u32) -> Reward {
        Reward {
            uuid: RewardUuid::new(),
            promotion,
            kind: RewardType::IncreaseMemberAccount,
            account_id: Some(AccountId::from(account)),
            value: Some(value),
        }
    }

    async fn create_promotion(ctx: &TestContext) -> TestResult<PromotionUuid> {
        let promotion = ctx
            .promotions
            .create_promotion(NewPromotion {
                status: Some(PromotionStatus::Draft),
                ..NewPromotion::default()
            })
            .await?;

        Ok(promotion.uuid)
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn save_reward_then_list_for_promotion() -> TestResult {
        let ctx = TestContext::new().await;
        let promotion = create_promotion(&ctx).await?;

        let saved = ctx
            .rewards
            .save_reward(stamp_reward(promotion, "ACCT_1", 2))
            .await?;

        let rewards = ctx.rewards.list_for_promotion(promotion).await?;

        assert_eq!(rewards, vec![saved]);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn save_reward_updates_existing_reward() -> TestResult {
        let ctx = TestContext::new().await;
        let promotion = create_promotion(&ctx).await?;

        let mut reward = ctx
            .rewards
            .save_reward(stamp_reward(promotion, "ACCT_1", 2))
            .await?;

        reward.value = Some(5);

        let updated = ctx.rewards.save_reward(reward.clone()).await?;

        assert_eq!(updated.value, Some(5));
        assert_eq!(ctx.rewards.list_for_promotion(promotion).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn save_reward_for_unknown_promotion_is_invalid_reference() {
        let ctx = TestContext::new().await;

        let result = ctx
            .rewards
            .save_reward(stamp_reward(PromotionUuid::new(), "ACCT_1", 1))
            .await;

        assert!(
            matches!(result, Err(RewardsServiceError::InvalidReference)),
            "expected InvalidReference, got {result:?}"
        );
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn list_by_account_and_type_filter_rewards() -> TestResult {
        let ctx = TestContext::new().await;
        let promotion = create_promotion(&ctx).await?;

        ctx.rewards
            .save_reward(stamp_reward(promotion, "ACCT_1", 1))
            .await?;

        ctx.rewards
            .save_reward(Reward {
                uuid: RewardUuid::new(),
                promotion,
                kind: RewardType::Other("points".to_string()),
                account_id: None,
                value: Some(50),
            })
            .await?;

        let by_account = ctx
            .rewards
            .list_by_account(&AccountId::from("ACCT_1"))
            .await?;

        let points = ctx
            .rewards
            .list_by_type(&RewardType::Other("points".to_string()))
            .await?;

        let first_stamp = ctx
            .rewards
            .get_by_promotion_and_type(promotion, &RewardType::IncreaseMemberAccount)
            .await?;

        assert_eq!(by_account.len(), 1);
        assert_eq!(points.len(), 1);
        assert!(first_stamp.is_some(), "expected an e-stamp reward");

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn remove_reward_reports_whether_it_existed() -> TestResult {
        let ctx = TestContext::new().await;
        let promotion = create_promotion(&ctx).await?;

        let reward = ctx
            .rewards
            .save_reward(stamp_reward(promotion, "ACCT_1", 1))
            .await?;

        assert!(ctx.rewards.remove_reward(reward.uuid).await?);
        assert!(!ctx.rewards.remove_reward(reward.uuid).await?);

        Ok(())
    }
}
