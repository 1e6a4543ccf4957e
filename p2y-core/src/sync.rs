//! Sync orchestration: windowed fetch across all pages, per-transaction
//! mapping, and a single batch submission per run.
//!
//! The two external systems are reached only through the capability traits
//! below, so the whole pipeline runs against fakes in tests.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::mapper::{MapperConfig, map_transaction};
use crate::types::{LedgerEntry, SourceTransaction, TransactionKind};
use crate::window::FetchWindow;

/// One page of aggregator results. `total` counts all transactions in the
/// window, not just this page.
#[derive(Debug, Clone)]
pub struct TransactionPage {
    pub total: u64,
    pub results: Vec<SourceTransaction>,
}

/// Read side: the aggregation service.
pub trait TransactionSource {
    async fn fetch_page(
        &self,
        account_id: &str,
        window: &FetchWindow,
        page: u32,
        page_size: u32,
    ) -> Result<TransactionPage>;
}

/// What the ledger reported back for one batch submission.
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    pub created: usize,
    /// Import ids the ledger had already seen and silently dropped
    pub duplicate_import_ids: Vec<String>,
}

/// Write side: the budgeting ledger.
pub trait EntrySink {
    async fn submit(&self, budget_id: &str, entries: &[LedgerEntry]) -> Result<SubmitReceipt>;
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub source_account_id: String,
    pub budget_id: String,
    pub lookback: Duration,
    pub page_size: u32,
    pub mapper: MapperConfig,
}

impl SyncConfig {
    pub const DEFAULT_PAGE_SIZE: u32 = 100;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Submitted { created: usize, duplicates: usize },
    NothingToSubmit,
    /// Submission failed but the run completed; the process must not crash
    /// on a ledger rejection.
    SubmitFailed { message: String },
}

#[derive(Debug, Clone)]
pub struct SyncReport {
    pub fetched: usize,
    pub skipped_unmapped: usize,
    pub entries: Vec<LedgerEntry>,
    pub outcome: SyncOutcome,
}

/// Fetched transactions mapped to ledger entries, submission not attempted.
#[derive(Debug, Clone)]
pub struct MappedBatch {
    pub fetched: usize,
    pub skipped_unmapped: usize,
    pub entries: Vec<LedgerEntry>,
}

/// Fetch every page in the window and map DEBIT/CREDIT transactions to
/// entries, preserving source order. Transactions of any other kind are
/// logged and counted, never submitted. Fetch errors abort the run.
pub async fn fetch_and_map<S: TransactionSource>(
    source: &S,
    config: &SyncConfig,
    now: DateTime<Utc>,
) -> Result<MappedBatch> {
    let window = FetchWindow::ending_at(now, config.lookback);

    let mut transactions: Vec<SourceTransaction> = Vec::new();
    let mut page = 1u32;
    loop {
        let batch = source
            .fetch_page(&config.source_account_id, &window, page, config.page_size)
            .await
            .with_context(|| format!("fetching transactions page {page}"))?;
        debug!(
            "fetched page {page}: {} of {} transactions",
            batch.results.len(),
            batch.total
        );

        // An empty page ends the loop even if `total` claims otherwise.
        if batch.results.is_empty() {
            break;
        }
        let total = batch.total as usize;
        transactions.extend(batch.results);
        if transactions.len() >= total {
            break;
        }
        page += 1;
    }

    let mut entries = Vec::new();
    let mut skipped = 0usize;
    for txn in &transactions {
        match map_transaction(txn, &config.mapper)? {
            Some(entry) => entries.push(entry),
            None => {
                if let TransactionKind::Other(raw) = &txn.kind {
                    warn!("skipping transaction {} with unrecognized type {raw:?}", txn.id);
                }
                skipped += 1;
            }
        }
    }

    Ok(MappedBatch {
        fetched: transactions.len(),
        skipped_unmapped: skipped,
        entries,
    })
}

/// One full sync run: fetch, map, and submit the batch in a single call.
/// An empty batch skips submission; a submission error is reported in the
/// outcome rather than propagated. At most one submission per run.
pub async fn run_sync<S, K>(
    source: &S,
    sink: &K,
    config: &SyncConfig,
    now: DateTime<Utc>,
) -> Result<SyncReport>
where
    S: TransactionSource,
    K: EntrySink,
{
    let batch = fetch_and_map(source, config, now).await?;

    let outcome = if batch.entries.is_empty() {
        SyncOutcome::NothingToSubmit
    } else {
        match sink.submit(&config.budget_id, &batch.entries).await {
            Ok(receipt) => SyncOutcome::Submitted {
                created: receipt.created,
                duplicates: receipt.duplicate_import_ids.len(),
            },
            Err(err) => {
                warn!("submission failed: {err:#}");
                SyncOutcome::SubmitFailed {
                    message: format!("{err:#}"),
                }
            }
        }
    };

    Ok(SyncReport {
        fetched: batch.fetched,
        skipped_unmapped: batch.skipped_unmapped,
        entries: batch.entries,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TransactionStatus, TransactionKind};
    use anyhow::bail;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn txn(id: &str, kind: TransactionKind, amount: Decimal) -> SourceTransaction {
        SourceTransaction {
            id: id.to_string(),
            date: Utc.with_ymd_and_hms(2026, 8, 20, 9, 0, 0).unwrap(),
            description: format!("payee for {id}"),
            amount,
            kind,
            status: Some(TransactionStatus::Posted),
        }
    }

    fn config() -> SyncConfig {
        SyncConfig {
            source_account_id: "bank-acct".to_string(),
            budget_id: "budget-1".to_string(),
            lookback: Duration::days(1),
            page_size: SyncConfig::DEFAULT_PAGE_SIZE,
            mapper: MapperConfig::new("ynab-acct", "ready-to-assign"),
        }
    }

    /// Serves pre-built pages by page number; total is the sum of all pages.
    struct FakeSource {
        pages: Vec<Vec<SourceTransaction>>,
    }

    impl TransactionSource for FakeSource {
        async fn fetch_page(
            &self,
            _account_id: &str,
            _window: &FetchWindow,
            page: u32,
            _page_size: u32,
        ) -> Result<TransactionPage> {
            let total = self.pages.iter().map(|p| p.len() as u64).sum();
            let results = self
                .pages
                .get(page as usize - 1)
                .cloned()
                .unwrap_or_default();
            Ok(TransactionPage { total, results })
        }
    }

    /// Records every submitted batch and deduplicates by import id the way
    /// the real ledger does across runs.
    struct FakeSink {
        calls: Mutex<Vec<Vec<LedgerEntry>>>,
        seen_import_ids: Mutex<HashSet<String>>,
        fail: bool,
    }

    impl FakeSink {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                seen_import_ids: Mutex::new(HashSet::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self { fail: true, ..Self::new() }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl EntrySink for FakeSink {
        async fn submit(&self, _budget_id: &str, entries: &[LedgerEntry]) -> Result<SubmitReceipt> {
            if self.fail {
                bail!("ledger rejected the batch");
            }
            self.calls.lock().unwrap().push(entries.to_vec());

            let mut seen = self.seen_import_ids.lock().unwrap();
            let mut created = 0;
            let mut duplicates = Vec::new();
            for entry in entries {
                if seen.insert(entry.import_id.clone()) {
                    created += 1;
                } else {
                    duplicates.push(entry.import_id.clone());
                }
            }
            Ok(SubmitReceipt {
                created,
                duplicate_import_ids: duplicates,
            })
        }
    }

    #[tokio::test]
    async fn test_maps_debit_and_credit_skips_unknown() {
        let source = FakeSource {
            pages: vec![vec![
                txn("t1", TransactionKind::Debit, dec!(-45.90)),
                txn("t2", TransactionKind::Credit, dec!(100.00)),
                txn("t3", TransactionKind::Other("FEE".to_string()), dec!(-2.00)),
            ]],
        };
        let sink = FakeSink::new();

        let report = run_sync(&source, &sink, &config(), Utc::now()).await.unwrap();

        assert_eq!(report.fetched, 3);
        assert_eq!(report.skipped_unmapped, 1);
        assert_eq!(report.entries.len(), 2);
        // source order preserved
        assert_eq!(report.entries[0].import_id, "t1");
        assert_eq!(report.entries[1].import_id, "t2");
        assert_eq!(
            report.outcome,
            SyncOutcome::Submitted { created: 2, duplicates: 0 }
        );
        assert_eq!(sink.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_fetch_skips_submission() {
        let source = FakeSource { pages: vec![] };
        let sink = FakeSink::new();

        let report = run_sync(&source, &sink, &config(), Utc::now()).await.unwrap();

        assert_eq!(report.fetched, 0);
        assert_eq!(report.outcome, SyncOutcome::NothingToSubmit);
        assert_eq!(sink.call_count(), 0, "submit must not be called");
    }

    #[tokio::test]
    async fn test_only_unknown_types_skips_submission() {
        let source = FakeSource {
            pages: vec![vec![txn("t1", TransactionKind::Other("X".to_string()), dec!(1))]],
        };
        let sink = FakeSink::new();

        let report = run_sync(&source, &sink, &config(), Utc::now()).await.unwrap();

        assert_eq!(report.skipped_unmapped, 1);
        assert_eq!(report.outcome, SyncOutcome::NothingToSubmit);
        assert_eq!(sink.call_count(), 0);
    }

    #[tokio::test]
    async fn test_submission_failure_is_reported_not_fatal() {
        let source = FakeSource {
            pages: vec![vec![txn("t1", TransactionKind::Debit, dec!(-1.00))]],
        };
        let sink = FakeSink::failing();

        let report = run_sync(&source, &sink, &config(), Utc::now()).await.unwrap();

        match report.outcome {
            SyncOutcome::SubmitFailed { ref message } => {
                assert!(message.contains("ledger rejected"), "got: {message}");
            }
            ref other => panic!("expected SubmitFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pagination_is_exhaustive_and_ordered() {
        let mut pages = Vec::new();
        let mut id = 0;
        for _ in 0..3 {
            let page: Vec<_> = (0..100)
                .map(|_| {
                    id += 1;
                    txn(&format!("t{id:03}"), TransactionKind::Debit, dec!(-1.00))
                })
                .collect();
            pages.push(page);
        }
        // trailing short page
        id += 1;
        pages.push(vec![txn(&format!("t{id:03}"), TransactionKind::Debit, dec!(-1.00))]);

        let source = FakeSource { pages };
        let sink = FakeSink::new();

        let report = run_sync(&source, &sink, &config(), Utc::now()).await.unwrap();

        assert_eq!(report.fetched, 301);
        assert_eq!(report.entries.len(), 301);
        assert_eq!(report.entries[0].import_id, "t001");
        assert_eq!(report.entries[300].import_id, "t301");
    }

    #[tokio::test]
    async fn test_repeat_run_is_idempotent_via_import_ids() {
        let source = FakeSource {
            pages: vec![vec![
                txn("t1", TransactionKind::Debit, dec!(-45.90)),
                txn("t2", TransactionKind::Credit, dec!(100.00)),
            ]],
        };
        let sink = FakeSink::new();
        let cfg = config();

        let first = run_sync(&source, &sink, &cfg, Utc::now()).await.unwrap();
        let second = run_sync(&source, &sink, &cfg, Utc::now()).await.unwrap();

        let first_ids: Vec<_> = first.entries.iter().map(|e| &e.import_id).collect();
        let second_ids: Vec<_> = second.entries.iter().map(|e| &e.import_id).collect();
        assert_eq!(first_ids, second_ids);

        assert_eq!(
            first.outcome,
            SyncOutcome::Submitted { created: 2, duplicates: 0 }
        );
        // the ledger treats the second batch as a per-entry no-op
        assert_eq!(
            second.outcome,
            SyncOutcome::Submitted { created: 0, duplicates: 2 }
        );
    }
}
