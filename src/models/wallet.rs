use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked XRP Ledger wallet.
/// Balances and sync timestamps are computed server-side; the client only
/// submits the address and display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub user: Option<String>,
    pub name: String,
    pub address: String,
    #[serde(rename = "isActive", default)]
    pub is_active: bool,
    #[serde(default)]
    pub balance: f64,
    #[serde(rename = "balanceUSD", default)]
    pub balance_usd: f64,
    #[serde(rename = "lastSynced", default)]
    pub last_synced: Option<DateTime<Utc>>,
}

impl Wallet {
    /// Short label for list output: name, falling back to the address.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.address
        } else {
            &self.name
        }
    }
}
