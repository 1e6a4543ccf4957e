use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transaction type as reported by the aggregator. Values outside
/// DEBIT/CREDIT are kept verbatim so callers can log what they skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Debit,
    Credit,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Posted,
    Pending,
}

/// Normalized output of the aggregation service (bank-agnostic)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceTransaction {
    /// Opaque identifier, stable across repeated fetches of the same event
    pub id: String,
    pub date: DateTime<Utc>,
    /// Free-text, locale-specific; empty when the aggregator omits it
    pub description: String,
    /// Signed, in major currency units. Debits are negative.
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub status: Option<TransactionStatus>,
}

/// Cleared flag in the budgeting ledger's wire vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearedStatus {
    Cleared,
    Uncleared,
}

impl ClearedStatus {
    /// POSTED clears the entry; PENDING or an absent status leaves it uncleared.
    pub fn from_source_status(status: Option<TransactionStatus>) -> Self {
        match status {
            Some(TransactionStatus::Posted) => ClearedStatus::Cleared,
            _ => ClearedStatus::Uncleared,
        }
    }
}

/// One entry ready for submission to the budgeting ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub account_id: String,
    pub date: NaiveDate,
    /// Ledger minor units: major units x 1000
    pub amount_milliunits: i64,
    pub payee_name: String,
    /// Set only for credits (ready-to-assign); debits stay uncategorized
    pub category_id: Option<String>,
    pub cleared: ClearedStatus,
    /// Idempotency key honored by the ledger; the source transaction id
    pub import_id: String,
}

impl LedgerEntry {
    pub fn is_outflow(&self) -> bool {
        self.amount_milliunits < 0
    }

    pub fn is_inflow(&self) -> bool {
        self.amount_milliunits > 0
    }
}
