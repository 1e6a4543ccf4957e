//! p2y-ynab: YNAB v1 API client for batch transaction creation with
//! import-id deduplication.

pub mod client;
pub mod models;

pub use client::YnabClient;
pub use models::SaveTransaction;
