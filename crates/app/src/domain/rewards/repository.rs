//! Rewards Repository

use estamp::{
    accounts::AccountId,
    promotions::PromotionUuid,
    rewards::{Reward, RewardType, RewardUuid},
};
use sqlx::{Postgres, Transaction, query, query_as};
use uuid::Uuid;

use crate::domain::{columns::encode_optional_u32, rewards::records::RewardRecord};

const LIST_REWARDS_FOR_PROMOTIONS_SQL: &str = include_str!("sql/list_rewards_for_promotions.sql");
const LIST_REWARDS_BY_TYPE_SQL: &str = include_str!("sql/list_rewards_by_type.sql");
const LIST_REWARDS_BY_ACCOUNT_SQL: &str = include_str!("sql/list_rewards_by_account.sql");
const GET_REWARD_BY_PROMOTION_AND_TYPE_SQL: &str =
    include_str!("sql/get_reward_by_promotion_and_type.sql");
const SAVE_REWARD_SQL: &str = include_str!("sql/save_reward.sql");
const DELETE_REWARD_SQL: &str = include_str!("sql/delete_reward.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgRewardsRepository;

impl PgRewardsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_for_promotions(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promotions: &[PromotionUuid],
    ) -> Result<Vec<Reward>, sqlx::Error> {
        if promotions.is_empty() {
            return Ok(Vec::new());
        }

        let uuids: Vec<Uuid> = promotions.iter().map(|p| p.into_uuid()).collect();

        let records = query_as::<Postgres, RewardRecord>(LIST_REWARDS_FOR_PROMOTIONS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await?;

        Ok(records.into_iter().map(Reward::from).collect())
    }

    pub(crate) async fn list_by_type(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reward_type: &RewardType,
    ) -> Result<Vec<Reward>, sqlx::Error> {
        let records = query_as::<Postgres, RewardRecord>(LIST_REWARDS_BY_TYPE_SQL)
            .bind(reward_type.as_str())
            .fetch_all(&mut **tx)
            .await?;

        Ok(records.into_iter().map(Reward::from).collect())
    }

    pub(crate) async fn list_by_account(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account_id: &AccountId,
    ) -> Result<Vec<Reward>, sqlx::Error> {
        let records = query_as::<Postgres, RewardRecord>(LIST_REWARDS_BY_ACCOUNT_SQL)
            .bind(account_id.as_str())
            .fetch_all(&mut **tx)
            .await?;

        Ok(records.into_iter().map(Reward::from).collect())
    }

    pub(crate) async fn get_by_promotion_and_type(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promotion: PromotionUuid,
        reward_type: &RewardType,
    ) -> Result<Option<Reward>, sqlx::Error> {
        let record = query_as::<Postgres, RewardRecord>(GET_REWARD_BY_PROMOTION_AND_TYPE_SQL)
            .bind(promotion.into_uuid())
            .bind(reward_type.as_str())
            .fetch_optional(&mut **tx)
            .await?;

        Ok(record.map(Reward::from))
    }

    pub(crate) async fn save(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reward: &Reward,
    ) -> Result<Reward, sqlx::Error> {
        let value = encode_optional_u32(reward.value, "reward_value")?;

        let record = query_as::<Postgres, RewardRecord>(SAVE_REWARD_SQL)
            .bind(reward.uuid.into_uuid())
            .bind(reward.promotion.into_uuid())
            .bind(reward.kind.as_str())
            .bind(reward.account_id.as_ref().map(AccountId::as_str))
            .bind(value)
            .fetch_one(&mut **tx)
            .await?;

        Ok(Reward::from(record))
    }

    pub(crate) async fn delete(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reward: RewardUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_REWARD_SQL)
            .bind(reward.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}
