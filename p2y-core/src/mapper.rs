//! Maps one aggregator transaction onto one ledger entry: sign-preserving
//! milliunit conversion, payee normalization, cleared derivation, and the
//! import-id idempotency key.

use anyhow::{Result, anyhow};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::normalize::normalize_payee;
use crate::types::{ClearedStatus, LedgerEntry, SourceTransaction, TransactionKind};

/// Prefixes the bank puts in front of debit descriptions.
pub const DEBIT_PREFIXES: &[&str] = &["Compra no débito|", "Transferência enviada|"];

/// Prefixes for credit descriptions. Both casings have been observed on
/// the wire.
pub const CREDIT_PREFIXES: &[&str] = &["Transferência Recebida|", "Transferência recebida|"];

/// Fixed per-run mapping parameters.
#[derive(Debug, Clone)]
pub struct MapperConfig {
    /// Target ledger account every entry is written to
    pub account_id: String,
    /// Category assigned to credits (unallocated incoming funds)
    pub ready_to_assign_category_id: String,
    pub debit_prefixes: Vec<String>,
    pub credit_prefixes: Vec<String>,
}

impl MapperConfig {
    pub fn new(account_id: impl Into<String>, ready_to_assign_category_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            ready_to_assign_category_id: ready_to_assign_category_id.into(),
            debit_prefixes: DEBIT_PREFIXES.iter().map(|s| s.to_string()).collect(),
            credit_prefixes: CREDIT_PREFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Map a DEBIT or CREDIT transaction to a ledger entry. Returns `Ok(None)`
/// for any other transaction kind; the caller decides how to report the skip.
pub fn map_transaction(txn: &SourceTransaction, config: &MapperConfig) -> Result<Option<LedgerEntry>> {
    let (prefixes, category_id) = match &txn.kind {
        TransactionKind::Debit => (&config.debit_prefixes, None),
        TransactionKind::Credit => (
            &config.credit_prefixes,
            Some(config.ready_to_assign_category_id.clone()),
        ),
        TransactionKind::Other(_) => return Ok(None),
    };

    Ok(Some(LedgerEntry {
        account_id: config.account_id.clone(),
        date: txn.date.date_naive(),
        amount_milliunits: to_milliunits(txn.amount)?,
        payee_name: normalize_payee(&txn.description, prefixes),
        category_id,
        cleared: ClearedStatus::from_source_status(txn.status),
        import_id: txn.id.clone(),
    }))
}

/// Major units to milliunits, rounded half-to-even at the milliunit
/// boundary. Fixed policy; see DESIGN.md.
fn to_milliunits(amount: Decimal) -> Result<i64> {
    (amount * Decimal::ONE_THOUSAND)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .to_i64()
        .ok_or_else(|| anyhow!("amount out of milliunit range: {amount}"))
}
