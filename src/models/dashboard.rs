use serde::{Deserialize, Serialize};

/// The aggregate view behind GET /dashboard: counts, portfolio value,
/// recent activity, and the running tax position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardData {
    #[serde(rename = "walletCount", default)]
    pub wallet_count: u32,
    #[serde(rename = "transactionCount", default)]
    pub transaction_count: u64,
    #[serde(rename = "balanceUSD", default)]
    pub balance_usd: f64,
    #[serde(rename = "recentTransactions", default)]
    pub recent_transactions: Vec<RecentTransaction>,
    #[serde(rename = "taxSummary")]
    pub tax_summary: TaxSummary,
}

/// Trimmed transaction rows for the dashboard activity list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentTransaction {
    pub id: String,
    pub date: String,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub amount: f64,
    pub currency: String,
    #[serde(rename = "usdValue", default)]
    pub usd_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxSummary {
    #[serde(rename = "totalIncome", default)]
    pub total_income: f64,
    #[serde(rename = "totalCapitalGains", default)]
    pub total_capital_gains: f64,
    #[serde(rename = "totalShortTermGains", default)]
    pub total_short_term_gains: f64,
    #[serde(rename = "totalLongTermGains", default)]
    pub total_long_term_gains: f64,
}
