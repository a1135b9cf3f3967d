//! Promotions

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    accounts::AccountId,
    rewards::Reward,
    uuids::TypedUuid,
};

pub mod validation;

pub use validation::ValidationError;

/// Stored code for [`DisplayType::EStamp`].
pub const ESTAMP_DISPLAY_TYPE: &str = "estamp";

/// Priority given to promotions that do not declare one.
pub const DEFAULT_PRIORITY: i32 = 0;

/// Promotion UUID
pub type PromotionUuid = TypedUuid<Promotion>;

/// Promotion lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionStatus {
    /// Being edited; never evaluated.
    #[default]
    Draft,

    /// Live, subject to its date window and suspension flag.
    Active,

    /// Switched off by an administrator.
    Inactive,

    /// End date has passed.
    Expired,
}

impl PromotionStatus {
    /// Return the stored code for this status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Expired => "expired",
        }
    }
}

impl Display for PromotionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored status code is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown promotion status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for PromotionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "expired" => Ok(Self::Expired),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// Tag display type, selecting which promotions take part in e-stamp evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum DisplayType {
    /// E-stamp eligible
    EStamp,

    /// Any other presentation
    Other(String),
}

impl DisplayType {
    /// Parse a stored display type code.
    pub fn from_code(code: &str) -> Self {
        if code == ESTAMP_DISPLAY_TYPE {
            Self::EStamp
        } else {
            Self::Other(code.to_owned())
        }
    }

    /// Return the stored code for this display type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::EStamp => ESTAMP_DISPLAY_TYPE,
            Self::Other(code) => code,
        }
    }
}

impl From<String> for DisplayType {
    fn from(value: String) -> Self {
        Self::from_code(&value)
    }
}

/// Promotion Tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct PromotionTag {
    /// Unique tag code
    pub code: String,

    /// Display classification
    pub display_type: DisplayType,
}

/// Redemption limits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedemptionLimits {
    /// Maximum redemptions by a single customer
    pub per_user: Option<u32>,

    /// Maximum redemptions across all customers
    pub total: Option<u32>,
}

/// Promotion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    /// Promotion identifier
    pub uuid: PromotionUuid,

    /// Lifecycle status
    pub status: PromotionStatus,

    /// Temporarily withdrawn without changing status
    pub suspended: bool,

    /// Inclusive start of the promotion window
    pub start_date: Option<Timestamp>,

    /// Exclusive end of the promotion window
    pub end_date: Option<Timestamp>,

    /// Higher priorities are listed first
    pub priority: i32,

    /// Redemption limits
    pub limits: RedemptionLimits,

    /// Classification tag
    pub tag: Option<PromotionTag>,

    /// Code of the digital coupon customers redeem for this promotion
    pub coupon_code: Option<String>,

    /// Rewards granted on redemption
    pub rewards: Vec<Reward>,
}

impl Promotion {
    /// Whether the promotion is live at `now`: active, not suspended, and
    /// `start_date <= now < end_date`. Promotions missing either date are never
    /// live.
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        if self.status != PromotionStatus::Active || self.suspended {
            return false;
        }

        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start <= now && now < end,
            _ => false,
        }
    }

    /// Whether the end date has passed at `now`.
    pub fn has_ended_at(&self, now: Timestamp) -> bool {
        self.end_date.is_some_and(|end| end < now)
    }

    /// Whether the promotion grants any rewards.
    pub fn has_rewards(&self) -> bool {
        !self.rewards.is_empty()
    }

    /// Iterate the accounts stamped by this promotion's e-stamp rewards.
    pub fn stamp_accounts(&self) -> impl Iterator<Item = &AccountId> {
        self.rewards.iter().filter_map(Reward::stamp_account)
    }
}

/// New Promotion
///
/// Optional fields are filled by [`NewPromotion::prepare`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPromotion {
    /// Identifier; generated when omitted
    pub uuid: Option<PromotionUuid>,

    /// Initial status; [`PromotionStatus::Draft`] when omitted
    pub status: Option<PromotionStatus>,

    /// Suspension flag; `false` when omitted
    pub suspended: Option<bool>,

    /// Priority; [`DEFAULT_PRIORITY`] when omitted
    pub priority: Option<i32>,

    /// Inclusive start of the promotion window
    pub start_date: Option<Timestamp>,

    /// Exclusive end of the promotion window
    pub end_date: Option<Timestamp>,

    /// Redemption limits
    pub limits: RedemptionLimits,

    /// Classification tag
    pub tag: Option<PromotionTag>,

    /// Digital coupon code
    pub coupon_code: Option<String>,
}

impl NewPromotion {
    /// Fill defaults and produce a promotion without rewards.
    pub fn prepare(self) -> Promotion {
        Promotion {
            uuid: self.uuid.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            suspended: self.suspended.unwrap_or(false),
            start_date: self.start_date,
            end_date: self.end_date,
            priority: self.priority.unwrap_or(DEFAULT_PRIORITY),
            limits: self.limits,
            tag: self.tag,
            coupon_code: self.coupon_code,
            rewards: Vec::new(),
        }
    }
}
