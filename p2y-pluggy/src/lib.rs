//! p2y-pluggy: Pluggy aggregation-API client (API-key auth, paginated
//! transaction fetch, account listing).

pub mod client;
pub mod models;

pub use client::PluggyClient;
pub use models::{PluggyAccount, PluggyTransaction};
