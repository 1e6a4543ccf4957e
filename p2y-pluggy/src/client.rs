use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

use p2y_core::sync::{TransactionPage, TransactionSource};
use p2y_core::window::FetchWindow;

use crate::models::{AccountsResponse, PluggyAccount, TransactionsResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.pluggy.ai";

/// Requests time out individually so a hung aggregator surfaces as a
/// reportable error instead of stalling the run.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Pluggy client. The client-id/secret pair is exchanged for an API key on
/// first use and the key is reused for the rest of the run.
pub struct PluggyClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    api_key: OnceCell<String>,
}

impl PluggyClient {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, client_id, client_secret)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building pluggy http client")?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_key: OnceCell::new(),
        })
    }

    async fn api_key(&self) -> Result<&str> {
        let key = self
            .api_key
            .get_or_try_init(|| self.authenticate())
            .await?;
        Ok(key.as_str())
    }

    async fn authenticate(&self) -> Result<String> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct AuthRequest<'a> {
            client_id: &'a str,
            client_secret: &'a str,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct AuthResponse {
            api_key: String,
        }

        let resp = self
            .http
            .post(format!("{}/auth", self.base_url))
            .json(&AuthRequest {
                client_id: &self.client_id,
                client_secret: &self.client_secret,
            })
            .send()
            .await
            .context("pluggy auth request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("pluggy auth error: {status} {txt}");
        }

        let out: AuthResponse = resp.json().await.context("parse pluggy auth response")?;
        debug!("pluggy api key obtained");
        Ok(out.api_key)
    }

    /// List accounts for a connected item. Used to discover the account id
    /// for configuration.
    pub async fn accounts(&self, item_id: &str) -> Result<Vec<PluggyAccount>> {
        let key = self.api_key().await?;

        let resp = self
            .http
            .get(format!("{}/accounts", self.base_url))
            .header("X-API-KEY", key)
            .query(&[("itemId", item_id)])
            .send()
            .await
            .context("pluggy accounts request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("pluggy accounts error: {status} {txt}");
        }

        let out: AccountsResponse = resp.json().await.context("parse pluggy accounts response")?;
        Ok(out.results)
    }
}

impl TransactionSource for PluggyClient {
    async fn fetch_page(
        &self,
        account_id: &str,
        window: &FetchWindow,
        page: u32,
        page_size: u32,
    ) -> Result<TransactionPage> {
        let key = self.api_key().await?;

        let from = window.from.date_naive().to_string();
        let to = window.to.date_naive().to_string();
        let page_str = page.to_string();
        let page_size_str = page_size.to_string();

        let resp = self
            .http
            .get(format!("{}/transactions", self.base_url))
            .header("X-API-KEY", key)
            .query(&[
                ("accountId", account_id),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("page", page_str.as_str()),
                ("pageSize", page_size_str.as_str()),
            ])
            .send()
            .await
            .context("pluggy transactions request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("pluggy transactions error: {status} {txt}");
        }

        let out: TransactionsResponse = resp
            .json()
            .await
            .context("parse pluggy transactions response")?;

        Ok(TransactionPage {
            total: out.total,
            results: out.results.into_iter().map(|t| t.into_source()).collect(),
        })
    }
}
