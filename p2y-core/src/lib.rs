//! p2y-core: domain types and the bank-to-budget sync pipeline
//! (fetch window, payee normalization, transaction mapping, orchestration).

pub mod mapper;
pub mod normalize;
pub mod sync;
pub mod types;
pub mod window;

pub use mapper::{MapperConfig, map_transaction};
pub use normalize::normalize_payee;
pub use sync::{
    EntrySink, MappedBatch, SubmitReceipt, SyncConfig, SyncOutcome, SyncReport,
    TransactionPage, TransactionSource, fetch_and_map, run_sync,
};
pub use types::{
    ClearedStatus, LedgerEntry, SourceTransaction, TransactionKind, TransactionStatus,
};
pub use window::FetchWindow;
