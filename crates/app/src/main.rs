//! Estamp Application CLI

use std::{io, process};

use clap::{Args, Parser, Subcommand};
use estamp::{
    accounts::AccountId,
    identity::{CatalogVersionUuid, CustomerUuid, RedemptionUuid},
    promotions::PromotionUuid,
    tiers::StampTier,
};
use estamp_app::{
    config::AppConfig,
    context::AppContext,
    domain::redemptions::data::{RedemptionEvent, RedemptionOutcome},
    logging::init_subscriber,
    presentation::{
        OutputFormat, PresentationError, PromotionSummary, cleanup_table, promotion_table,
        quota_summaries, quota_table, raw_quota_table, tier_table, write_json, write_table,
    },
};
use jiff::Timestamp;
use serde_json::json;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "estamp-app", about = "E-stamp quota and promotion eligibility CLI", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: AppConfig,

    /// Output format (table, json)
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show a customer's per-account quota usage.
    Quotas(QuotaArgs),

    /// List the promotions a customer is eligible for.
    Eligible(EvaluationArgs),

    /// Inspect or change e-stamp tiers.
    Tier(TierCommand),

    /// Apply a coupon redemption to e-stamp tiers.
    Redeem(RedeemArgs),

    /// Expire ended promotions and remove old expired ones.
    Cleanup(CleanupArgs),

    /// Apply pending database migrations.
    Migrate,
}

#[derive(Debug, Args)]
struct EvaluationArgs {
    /// Customer UUID
    #[arg(long)]
    customer: CustomerUuid,

    /// Product catalog version UUID
    #[arg(long)]
    catalog_version: CatalogVersionUuid,

    /// Evaluation instant (RFC 3339); defaults to now
    #[arg(long)]
    at: Option<Timestamp>,
}

#[derive(Debug, Args)]
struct QuotaArgs {
    #[command(flatten)]
    evaluation: EvaluationArgs,

    /// Print the raw reader rows instead of aggregated quotas
    #[arg(long)]
    raw: bool,
}

#[derive(Debug, Args)]
struct TierCommand {
    #[command(subcommand)]
    command: TierSubcommand,
}

#[derive(Debug, Subcommand)]
enum TierSubcommand {
    /// Show one account's tier.
    Show { account_id: String },

    /// Add stamps to an account's tier, capped at its maximum.
    Increment {
        account_id: String,

        #[arg(long, default_value_t = 1)]
        amount: u32,
    },

    /// Clear an account's stamp count.
    Reset { account_id: String },

    /// List tiers that can still collect stamps.
    Open,
}

#[derive(Debug, Args)]
struct RedeemArgs {
    /// Redemption UUID; replays with the same UUID are ignored
    #[arg(long)]
    redemption: RedemptionUuid,

    /// Redeemed promotion UUID
    #[arg(long)]
    promotion: PromotionUuid,

    /// Redeeming customer UUID
    #[arg(long)]
    customer: CustomerUuid,
}

#[derive(Debug, Args)]
struct CleanupArgs {
    /// Run as if at this instant (RFC 3339); defaults to now
    #[arg(long)]
    at: Option<Timestamp>,
}

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = init_subscriber(&cli.config.logging) {
        eprintln!("failed to initialise logging: {error}");
        process::exit(1);
    }

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    if matches!(cli.command, Commands::Migrate) {
        AppContext::migrated(&cli.config)
            .await
            .map_err(|error| format!("failed to migrate database: {error}"))?;

        info!("database migrations applied");

        return Ok(());
    }

    let ctx = AppContext::from_config(&cli.config)
        .await
        .map_err(|error| format!("failed to initialise application: {error}"))?;

    let format = cli.format;

    match cli.command {
        Commands::Quotas(args) => show_quotas(&ctx, args, format).await,
        Commands::Eligible(args) => show_eligible(&ctx, args, format).await,
        Commands::Tier(TierCommand { command }) => tier(&ctx, command, format).await,
        Commands::Redeem(args) => redeem(&ctx, args, format).await,
        Commands::Cleanup(args) => cleanup(&ctx, args, format).await,
        Commands::Migrate => Ok(()),
    }
}

async fn show_quotas(ctx: &AppContext, args: QuotaArgs, format: OutputFormat) -> Result<(), String> {
    let EvaluationArgs {
        customer,
        catalog_version,
        at,
    } = args.evaluation;

    let as_of = at.unwrap_or_else(Timestamp::now);

    if args.raw {
        let rows = ctx
            .quotas
            .fetch_raw_quota(customer, catalog_version, as_of)
            .await
            .map_err(|error| format!("failed to read quotas: {error}"))?;

        return match format {
            OutputFormat::Json => write_json(io::stdout().lock(), &rows),
            OutputFormat::Table => write_table(io::stdout().lock(), &raw_quota_table(&rows)),
        }
        .map_err(output_error);
    }

    let quotas = ctx
        .quotas
        .get_account_quotas(customer, catalog_version, as_of)
        .await
        .map_err(|error| format!("failed to read quotas: {error}"))?;

    let summaries = quota_summaries(&quotas);

    match format {
        OutputFormat::Json => write_json(io::stdout().lock(), &summaries),
        OutputFormat::Table => write_table(io::stdout().lock(), &quota_table(&summaries)),
    }
    .map_err(output_error)
}

async fn show_eligible(
    ctx: &AppContext,
    args: EvaluationArgs,
    format: OutputFormat,
) -> Result<(), String> {
    let promotions = ctx
        .eligibility
        .evaluate_eligible(
            args.customer,
            args.catalog_version,
            args.at.unwrap_or_else(Timestamp::now),
        )
        .await
        .map_err(|error| format!("failed to evaluate promotions: {error}"))?;

    let summaries: Vec<PromotionSummary> = promotions.iter().map(PromotionSummary::from).collect();

    match format {
        OutputFormat::Json => write_json(io::stdout().lock(), &summaries),
        OutputFormat::Table => write_table(io::stdout().lock(), &promotion_table(&summaries)),
    }
    .map_err(output_error)
}

async fn tier(ctx: &AppContext, command: TierSubcommand, format: OutputFormat) -> Result<(), String> {
    let tiers: Vec<StampTier> = match command {
        TierSubcommand::Show { account_id } => ctx
            .tiers
            .get_tier(&AccountId::from(account_id))
            .await
            .map(|tier| tier.into_iter().collect::<Vec<_>>()),
        TierSubcommand::Increment { account_id, amount } => ctx
            .tiers
            .increment_stamp_count(&AccountId::from(account_id), amount)
            .await
            .map(|tier| tier.into_iter().collect::<Vec<_>>()),
        TierSubcommand::Reset { account_id } => ctx
            .tiers
            .reset_stamp_count(&AccountId::from(account_id))
            .await
            .map(|tier| tier.into_iter().collect::<Vec<_>>()),
        TierSubcommand::Open => ctx.tiers.list_open().await,
    }
    .map_err(|error| format!("tier operation failed: {error}"))?;

    match format {
        OutputFormat::Json => write_json(io::stdout().lock(), &tiers),
        OutputFormat::Table => write_table(io::stdout().lock(), &tier_table(&tiers)),
    }
    .map_err(output_error)
}

async fn redeem(ctx: &AppContext, args: RedeemArgs, format: OutputFormat) -> Result<(), String> {
    let event = RedemptionEvent {
        redemption: args.redemption,
        promotion: args.promotion,
        customer: args.customer,
    };

    let outcome = ctx
        .redemptions
        .on_redemption(&event)
        .await
        .map_err(|error| format!("failed to apply redemption: {error}"))?;

    let (status, tiers, missing) = match outcome {
        RedemptionOutcome::Skipped => ("skipped", Vec::new(), Vec::new()),
        RedemptionOutcome::Duplicate => ("duplicate", Vec::new(), Vec::new()),
        RedemptionOutcome::Applied {
            incremented,
            missing,
        } => ("applied", incremented, missing),
    };

    match format {
        OutputFormat::Json => write_json(
            io::stdout().lock(),
            &json!({ "status": status, "incremented": tiers, "missing": missing }),
        ),
        OutputFormat::Table => write_table(io::stdout().lock(), &tier_table(&tiers)),
    }
    .map_err(output_error)?;

    info!(status, missing = missing.len(), "redemption handled");

    Ok(())
}

async fn cleanup(ctx: &AppContext, args: CleanupArgs, format: OutputFormat) -> Result<(), String> {
    let report = ctx
        .cleanup
        .run(args.at.unwrap_or_else(Timestamp::now))
        .await
        .map_err(|error| format!("promotion cleanup failed: {error}"))?;

    match format {
        OutputFormat::Json => write_json(io::stdout().lock(), &report),
        OutputFormat::Table => write_table(io::stdout().lock(), &cleanup_table(&report)),
    }
    .map_err(output_error)
}

fn output_error(error: PresentationError) -> String {
    format!("failed to write output: {error}")
}
