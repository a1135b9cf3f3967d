//! Promotion Validation

use jiff::Timestamp;
use thiserror::Error;

use crate::promotions::{Promotion, PromotionStatus};

/// Rejection raised before a promotion is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// End date is not strictly after the start date.
    #[error("end date must be after start date (start: {start}, end: {end})")]
    EndNotAfterStart {
        /// Start date
        start: Timestamp,
        /// End date
        end: Timestamp,
    },

    /// Per-user redemption limit is zero.
    #[error("max redemptions per user must be positive")]
    PerUserLimitNotPositive,

    /// Total redemption limit is zero.
    #[error("total redemption limit must be positive")]
    TotalLimitNotPositive,

    /// Per-user limit is larger than the total limit.
    #[error("max redemptions per user ({per_user}) cannot exceed total redemption limit ({total})")]
    PerUserLimitExceedsTotal {
        /// Per-user limit
        per_user: u32,
        /// Total limit
        total: u32,
    },

    /// Activation requires both dates.
    #[error("promotion cannot be active without both start and end dates")]
    ActiveWithoutDates,

    /// Activation requires a tag.
    #[error("promotion cannot be active without a tag")]
    ActiveWithoutTag,
}

impl Promotion {
    /// Check the promotion's date window, redemption limits and, for
    /// promotions that already exist, the requirements of its status.
    ///
    /// # Errors
    ///
    /// Returns the first rule the promotion breaks.
    pub fn validate(&self, is_new: bool) -> Result<(), ValidationError> {
        self.validate_date_range()?;
        self.validate_redemption_limits()?;

        if !is_new {
            self.validate_status()?;
        }

        Ok(())
    }

    fn validate_date_range(&self) -> Result<(), ValidationError> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date)
            && end <= start
        {
            return Err(ValidationError::EndNotAfterStart { start, end });
        }

        Ok(())
    }

    fn validate_redemption_limits(&self) -> Result<(), ValidationError> {
        let limits = self.limits;

        if limits.per_user == Some(0) {
            return Err(ValidationError::PerUserLimitNotPositive);
        }

        if limits.total == Some(0) {
            return Err(ValidationError::TotalLimitNotPositive);
        }

        if let (Some(per_user), Some(total)) = (limits.per_user, limits.total)
            && per_user > total
        {
            return Err(ValidationError::PerUserLimitExceedsTotal { per_user, total });
        }

        Ok(())
    }

    fn validate_status(&self) -> Result<(), ValidationError> {
        if self.status != PromotionStatus::Active {
            return Ok(());
        }

        if self.start_date.is_none() || self.end_date.is_none() {
            return Err(ValidationError::ActiveWithoutDates);
        }

        if self.tag.is_none() {
            return Err(ValidationError::ActiveWithoutTag);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::promotions::{DisplayType, NewPromotion, PromotionTag, RedemptionLimits};

    use super::*;

    fn dated(start: &str, end: &str) -> Result<Promotion, jiff::Error> {
        Ok(NewPromotion {
            start_date: Some(start.parse()?),
            end_date: Some(end.parse()?),
            ..NewPromotion::default()
        }
        .prepare())
    }

    fn estamp_tag() -> PromotionTag {
        PromotionTag {
            code: "coffee".to_string(),
            display_type: DisplayType::EStamp,
        }
    }

    #[test]
    fn end_date_equal_to_start_is_rejected() -> TestResult {
        let promotion = dated("2026-01-01T00:00:00Z", "2026-01-01T00:00:00Z")?;

        assert!(
            matches!(
                promotion.validate(true),
                Err(ValidationError::EndNotAfterStart { .. })
            ),
            "expected EndNotAfterStart"
        );

        Ok(())
    }

    #[test]
    fn zero_limits_are_rejected() -> TestResult {
        let mut promotion = dated("2026-01-01T00:00:00Z", "2026-02-01T00:00:00Z")?;

        promotion.limits = RedemptionLimits {
            per_user: Some(0),
            total: None,
        };

        assert_eq!(
            promotion.validate(true),
            Err(ValidationError::PerUserLimitNotPositive)
        );

        promotion.limits = RedemptionLimits {
            per_user: None,
            total: Some(0),
        };

        assert_eq!(
            promotion.validate(true),
            Err(ValidationError::TotalLimitNotPositive)
        );

        Ok(())
    }

    #[test]
    fn per_user_limit_cannot_exceed_total() -> TestResult {
        let mut promotion = dated("2026-01-01T00:00:00Z", "2026-02-01T00:00:00Z")?;

        promotion.limits = RedemptionLimits {
            per_user: Some(5),
            total: Some(3),
        };

        assert_eq!(
            promotion.validate(true),
            Err(ValidationError::PerUserLimitExceedsTotal {
                per_user: 5,
                total: 3
            })
        );

        Ok(())
    }

    #[test]
    fn activation_rules_only_apply_to_existing_promotions() {
        let promotion = NewPromotion {
            status: Some(PromotionStatus::Active),
            ..NewPromotion::default()
        }
        .prepare();

        assert_eq!(promotion.validate(true), Ok(()));
        assert_eq!(
            promotion.validate(false),
            Err(ValidationError::ActiveWithoutDates)
        );
    }

    #[test]
    fn active_promotion_requires_tag() -> TestResult {
        let mut promotion = dated("2026-01-01T00:00:00Z", "2026-02-01T00:00:00Z")?;
        promotion.status = PromotionStatus::Active;

        assert_eq!(
            promotion.validate(false),
            Err(ValidationError::ActiveWithoutTag)
        );

        promotion.tag = Some(estamp_tag());

        assert_eq!(promotion.validate(false), Ok(()));

        Ok(())
    }
}
