//! Presentation
//!
//! Output shapes for the CLI: JSON documents for machines and tables for
//! people. `remainingQuota` only exists here; aggregation never computes it.

use std::io;

use estamp::{
    accounts::AccountId,
    cleanup::CleanupReport,
    promotions::Promotion,
    quotas::{AccountQuotas, AggregatedQuota, RawQuotaRow},
    tiers::StampTier,
};
use serde::Serialize;
use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PresentationError {
    #[error("failed to encode output")]
    Json(#[from] serde_json::Error),

    #[error("failed to write output")]
    Io(#[from] io::Error),
}

/// Output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Bordered table.
    #[default]
    Table,

    /// Pretty-printed JSON.
    Json,
}

/// Quota usage of one account as shown to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaSummary {
    pub account_id: AccountId,
    pub siebel_acct_id: String,
    pub threshold: u32,
    pub ordered_amt: u32,
    pub remaining_quota: u32,
}

impl From<&AggregatedQuota> for QuotaSummary {
    fn from(quota: &AggregatedQuota) -> Self {
        Self {
            account_id: quota.account_id.clone(),
            siebel_acct_id: quota.siebel_acct_id.clone(),
            threshold: quota.threshold,
            ordered_amt: quota.ordered_amt,
            remaining_quota: quota.remaining_quota(),
        }
    }
}

pub fn quota_summaries(quotas: &AccountQuotas) -> Vec<QuotaSummary> {
    quotas.iter().map(QuotaSummary::from).collect()
}

/// An eligible promotion as shown to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionSummary {
    pub uuid: String,
    pub priority: i32,
    pub tag_code: Option<String>,
    pub coupon_code: Option<String>,
    pub max_redemption_per_user: Option<u32>,
    pub stamp_accounts: Vec<AccountId>,
}

impl From<&Promotion> for PromotionSummary {
    fn from(promotion: &Promotion) -> Self {
        Self {
            uuid: promotion.uuid.to_string(),
            priority: promotion.priority,
            tag_code: promotion.tag.as_ref().map(|tag| tag.code.clone()),
            coupon_code: promotion.coupon_code.clone(),
            max_redemption_per_user: promotion.limits.per_user,
            stamp_accounts: promotion.stamp_accounts().cloned().collect(),
        }
    }
}

/// Write `value` as pretty JSON followed by a newline.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn write_json<T: Serialize + ?Sized>(
    mut out: impl io::Write,
    value: &T,
) -> Result<(), PresentationError> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;

    Ok(())
}

/// Write a rendered table followed by a newline.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_table(mut out: impl io::Write, table: &Table) -> Result<(), PresentationError> {
    writeln!(out, "{table}")?;

    Ok(())
}

fn finish(builder: Builder, numeric: Columns<std::ops::Range<usize>>) -> Table {
    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(numeric, Alignment::right());

    table
}

pub fn quota_table(summaries: &[QuotaSummary]) -> Table {
    let mut builder = Builder::default();

    builder.push_record(["Account", "Siebel Account", "Threshold", "Ordered", "Remaining"]);

    for summary in summaries {
        builder.push_record([
            summary.account_id.to_string(),
            summary.siebel_acct_id.clone(),
            summary.threshold.to_string(),
            summary.ordered_amt.to_string(),
            summary.remaining_quota.to_string(),
        ]);
    }

    finish(builder, Columns::new(2..5))
}

pub fn raw_quota_table(rows: &[RawQuotaRow]) -> Table {
    let mut builder = Builder::default();

    builder.push_record(["Account", "Siebel Account", "Threshold", "Redeemer"]);

    for row in rows {
        builder.push_record([
            row.account_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            row.siebel_acct_id.clone().unwrap_or_default(),
            row.threshold.map(|t| t.to_string()).unwrap_or_default(),
            row.redeemer.map(|r| r.to_string()).unwrap_or_default(),
        ]);
    }

    finish(builder, Columns::new(2..3))
}

pub fn promotion_table(summaries: &[PromotionSummary]) -> Table {
    let mut builder = Builder::default();

    builder.push_record(["Promotion", "Priority", "Tag", "Coupon", "Per User", "Accounts"]);

    for summary in summaries {
        let accounts: Vec<&str> = summary
            .stamp_accounts
            .iter()
            .map(AccountId::as_str)
            .collect();

        builder.push_record([
            summary.uuid.clone(),
            summary.priority.to_string(),
            summary.tag_code.clone().unwrap_or_default(),
            summary.coupon_code.clone().unwrap_or_default(),
            summary
                .max_redemption_per_user
                .map(|limit| limit.to_string())
                .unwrap_or_default(),
            accounts.join(", "),
        ]);
    }

    finish(builder, Columns::new(1..2))
}

pub fn tier_table(tiers: &[StampTier]) -> Table {
    let mut builder = Builder::default();

    builder.push_record(["Account", "Siebel Account", "Threshold", "Level", "Stamps", "Max"]);

    for tier in tiers {
        builder.push_record([
            tier.account_id().to_string(),
            tier.siebel_acct_id().to_string(),
            tier.threshold().to_string(),
            tier.level().to_string(),
            tier.current_count().to_string(),
            tier.max_count().to_string(),
        ]);
    }

    finish(builder, Columns::new(2..6))
}

pub fn cleanup_table(report: &CleanupReport) -> Table {
    let mut builder = Builder::default();

    builder.push_record(["Marked Expired", "Removed"]);
    builder.push_record([report.marked.to_string(), report.removed.to_string()]);

    finish(builder, Columns::new(0..2))
}
