//! Pluggy wire models and their conversion into the bank-agnostic
//! `SourceTransaction`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use p2y_core::types::{SourceTransaction, TransactionKind, TransactionStatus};

/// One transaction as Pluggy returns it. `type` values we don't know stay
/// as raw strings; `status` likewise is converted leniently so one odd row
/// never fails a whole page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluggyTransaction {
    pub id: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub status: Option<String>,
}

impl PluggyTransaction {
    pub fn into_source(self) -> SourceTransaction {
        let status = match self.status.as_deref() {
            Some("POSTED") => Some(TransactionStatus::Posted),
            Some("PENDING") => Some(TransactionStatus::Pending),
            _ => None,
        };
        SourceTransaction {
            id: self.id,
            date: self.date,
            description: self.description.unwrap_or_default(),
            amount: self.amount,
            kind: self.kind,
            status,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsResponse {
    pub total: u64,
    pub results: Vec<PluggyTransaction>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluggyAccount {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub number: Option<String>,
    pub balance: Option<Decimal>,
    pub currency_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsResponse {
    pub results: Vec<PluggyAccount>,
}
