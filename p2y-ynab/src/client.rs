use anyhow::{Context, Result, bail};
use std::time::Duration;
use tracing::debug;

use p2y_core::sync::{EntrySink, SubmitReceipt};
use p2y_core::types::LedgerEntry;

use crate::models::{SaveTransaction, SaveTransactionsResponse, SaveTransactionsWrapper};

pub const DEFAULT_BASE_URL: &str = "https://api.ynab.com/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// YNAB client holding the personal-access token for bearer auth.
pub struct YnabClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl YnabClient {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, token)
    }

    pub fn with_base_url(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building ynab http client")?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            token: token.into(),
        })
    }
}

impl EntrySink for YnabClient {
    /// One batch create per call. Entries whose `import_id` was already
    /// seen come back in `duplicate_import_ids` instead of being created.
    async fn submit(&self, budget_id: &str, entries: &[LedgerEntry]) -> Result<SubmitReceipt> {
        let body = SaveTransactionsWrapper {
            transactions: entries.iter().map(SaveTransaction::from).collect(),
        };

        let resp = self
            .http
            .post(format!("{}/budgets/{budget_id}/transactions", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .context("ynab create-transactions request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("ynab error: {status} {txt}");
        }

        let out: SaveTransactionsResponse =
            resp.json().await.context("parse ynab response")?;
        debug!(
            "ynab accepted batch: {} created, {} duplicates",
            out.data.transaction_ids.len(),
            out.data.duplicate_import_ids.len()
        );

        Ok(SubmitReceipt {
            created: out.data.transaction_ids.len(),
            duplicate_import_ids: out.data.duplicate_import_ids,
        })
    }
}
