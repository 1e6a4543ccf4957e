use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use p2y_core::sync::{SyncOutcome, fetch_and_map, run_sync};
use p2y_pluggy::PluggyClient;
use p2y_ynab::YnabClient;

mod config;

use config::{Config, PluggyAuthConfig};

#[derive(Parser, Debug)]
#[command(name = "pluggy2ynab", version, about = "Sync recent bank transactions from Pluggy into a YNAB budget")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch recent transactions and submit them as a batch to YNAB
    Sync {
        /// Override the LOOKBACK_DAYS window (default: 1)
        #[arg(long)]
        lookback_days: Option<i64>,

        /// Map and print entries without submitting anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List Pluggy accounts for PLUGGY_ITEM_ID (to find the account id)
    Accounts,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Sync { lookback_days, dry_run } => {
            let mut config = Config::from_env()?;
            if let Some(days) = lookback_days {
                anyhow::ensure!(days >= 1, "--lookback-days must be at least 1");
                config.lookback_days = days;
            }
            sync(&config, dry_run).await?;
        }

        Command::Accounts => {
            accounts().await?;
        }
    }

    Ok(())
}

async fn sync(config: &Config, dry_run: bool) -> Result<()> {
    let source = PluggyClient::new(&config.pluggy_client_id, &config.pluggy_client_secret)?;
    let sync_config = config.sync_config();

    println!("Started syncing (last {} day(s)).", config.lookback_days);

    if dry_run {
        let batch = fetch_and_map(&source, &sync_config, Utc::now()).await?;
        println!(
            "Found {} transactions ({} skipped, unmapped type).",
            batch.fetched, batch.skipped_unmapped
        );
        for entry in &batch.entries {
            println!(
                "{}  {:>12} milliunits  {:<9}  {}",
                entry.date,
                entry.amount_milliunits,
                if entry.category_id.is_some() { "credit" } else { "debit" },
                entry.payee_name
            );
        }
        println!("Dry run; nothing submitted.");
        return Ok(());
    }

    let sink = YnabClient::new(&config.ynab_token)?;
    let report = run_sync(&source, &sink, &sync_config, Utc::now())
        .await
        .context("sync run failed")?;

    println!(
        "Found {} transactions ({} skipped, unmapped type).",
        report.fetched, report.skipped_unmapped
    );

    match report.outcome {
        SyncOutcome::Submitted { created, duplicates } => {
            println!("Created {created} transaction(s) in YNAB ({duplicates} duplicate(s) ignored).");
        }
        SyncOutcome::NothingToSubmit => {
            println!("Nothing to submit.");
        }
        // Reported, not fatal: the run still exits cleanly.
        SyncOutcome::SubmitFailed { message } => {
            println!("Could not add transactions to YNAB. Error: {message}");
        }
    }

    println!("Done!");
    Ok(())
}

async fn accounts() -> Result<()> {
    let auth = PluggyAuthConfig::from_env()?;
    let client = PluggyClient::new(&auth.client_id, &auth.client_secret)?;

    let accounts = client.accounts(&auth.item_id).await?;
    if accounts.is_empty() {
        println!("No accounts found for item {}.", auth.item_id);
        return Ok(());
    }

    for account in accounts {
        println!(
            "{}  {:<10}  {}  (balance: {}, currency: {})",
            account.id,
            account.kind.as_deref().unwrap_or("-"),
            account.name,
            account
                .balance
                .map(|b| b.to_string())
                .unwrap_or_else(|| "-".to_string()),
            account.currency_code.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}
