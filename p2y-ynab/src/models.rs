//! YNAB v1 wire models (snake_case field names match the API directly).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use p2y_core::types::{ClearedStatus, LedgerEntry};

/// Body of one transaction in a create-transactions call. Amount is in
/// milliunits; `import_id` drives YNAB's server-side dedup.
#[derive(Debug, Clone, Serialize)]
pub struct SaveTransaction {
    pub account_id: String,
    pub date: NaiveDate,
    pub amount: i64,
    pub payee_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub cleared: ClearedStatus,
    pub import_id: String,
}

impl From<&LedgerEntry> for SaveTransaction {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            account_id: entry.account_id.clone(),
            date: entry.date,
            amount: entry.amount_milliunits,
            payee_name: entry.payee_name.clone(),
            category_id: entry.category_id.clone(),
            cleared: entry.cleared,
            import_id: entry.import_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveTransactionsWrapper {
    pub transactions: Vec<SaveTransaction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveTransactionsResponse {
    pub data: SaveTransactionsData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveTransactionsData {
    #[serde(default)]
    pub transaction_ids: Vec<String>,
    #[serde(default)]
    pub duplicate_import_ids: Vec<String>,
}
