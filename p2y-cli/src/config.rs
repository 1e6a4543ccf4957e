use anyhow::{Context, Result, anyhow};
use chrono::Duration;

use p2y_core::mapper::MapperConfig;
use p2y_core::sync::SyncConfig;

/// Everything the sync needs, read once from the environment at startup
/// and passed down explicitly. Every identifier is required; a missing
/// variable is a fatal startup error naming the variable.
#[derive(Debug, Clone)]
pub struct Config {
    pub pluggy_client_id: String,
    pub pluggy_client_secret: String,
    pub ynab_token: String,
    pub ynab_budget_id: String,
    /// Source bank account at the aggregator
    pub pluggy_account_id: String,
    /// Target account in the budget
    pub ynab_account_id: String,
    pub ready_to_assign_category_id: String,
    pub lookback_days: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            get(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("missing required environment variable {key}"))
        };

        let lookback_days = match get("LOOKBACK_DAYS") {
            None => 1,
            Some(v) => {
                let days: i64 = v
                    .trim()
                    .parse()
                    .with_context(|| format!("LOOKBACK_DAYS must be a whole number of days, got '{v}'"))?;
                if days < 1 {
                    return Err(anyhow!("LOOKBACK_DAYS must be at least 1, got {days}"));
                }
                days
            }
        };

        Ok(Self {
            pluggy_client_id: required("PLUGGY_CLIENT_ID")?,
            pluggy_client_secret: required("PLUGGY_CLIENT_SECRET")?,
            ynab_token: required("YNAB_TOKEN")?,
            ynab_budget_id: required("YNAB_BUDGET_ID")?,
            pluggy_account_id: required("PLUGGY_ACCOUNT_ID")?,
            ynab_account_id: required("YNAB_ACCOUNT_ID")?,
            ready_to_assign_category_id: required("READY_TO_ASSIGN_CATEGORY_ID")?,
            lookback_days,
        })
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            source_account_id: self.pluggy_account_id.clone(),
            budget_id: self.ynab_budget_id.clone(),
            lookback: Duration::days(self.lookback_days),
            page_size: SyncConfig::DEFAULT_PAGE_SIZE,
            mapper: MapperConfig::new(
                self.ynab_account_id.clone(),
                self.ready_to_assign_category_id.clone(),
            ),
        }
    }
}

/// The subset needed for `pluggy2ynab accounts`, so account discovery works
/// before the full sync config exists.
#[derive(Debug, Clone)]
pub struct PluggyAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub item_id: String,
}

impl PluggyAuthConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            get(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("missing required environment variable {key}"))
        };
        Ok(Self {
            client_id: required("PLUGGY_CLIENT_ID")?,
            client_secret: required("PLUGGY_CLIENT_SECRET")?,
            item_id: required("PLUGGY_ITEM_ID")?,
        })
    }
}
