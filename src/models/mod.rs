//! Wire types for the tax-reporting backend.
//!
//! Everything here mirrors the backend's JSON (camelCase field names,
//! Mongo-style `_id` keys) and deserializes leniently: optional fields
//! default rather than fail, since the backend omits what it has not
//! computed yet.

pub mod dashboard;
pub mod report;
pub mod transaction;
pub mod user;
pub mod wallet;

pub use dashboard::{DashboardData, RecentTransaction, TaxSummary};
pub use report::{Report, ReportOptions, ReportRequest};
pub use transaction::{Pagination, Transaction, TransactionQuery, TransactionsPage, WalletRef};
pub use user::{
    ApiSettings, NotificationSettings, ProfileUpdate, TaxSettings, UserProfile, UserSettings,
};
pub use wallet::Wallet;
