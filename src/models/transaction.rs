use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The wallet field of a transaction: either a bare id or an embedded
/// summary, depending on whether the backend populated the reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WalletRef {
    Id(String),
    Summary {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        address: Option<String>,
    },
}

impl WalletRef {
    pub fn id(&self) -> &str {
        match self {
            WalletRef::Id(id) => id,
            WalletRef::Summary { id, .. } => id,
        }
    }

    /// Display name when the backend embedded one.
    pub fn name(&self) -> Option<&str> {
        match self {
            WalletRef::Id(_) => None,
            WalletRef::Summary { name, .. } => name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub user: Option<String>,
    pub wallet: WalletRef,
    #[serde(rename = "txHash")]
    pub tx_hash: String,
    #[serde(rename = "txType")]
    pub tx_type: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(rename = "fromAddress", default)]
    pub from_address: Option<String>,
    #[serde(rename = "toAddress", default)]
    pub to_address: Option<String>,
    pub amount: f64,
    pub currency: String,
    #[serde(rename = "feeAmount", default)]
    pub fee_amount: f64,
    #[serde(rename = "feeCurrency", default)]
    pub fee_currency: Option<String>,
    #[serde(rename = "baseCurrencyAmount", default)]
    pub base_currency_amount: f64,
    #[serde(rename = "baseCurrencyRate", default)]
    pub base_currency_rate: f64,
    #[serde(rename = "baseCurrency", default)]
    pub base_currency: Option<String>,
    #[serde(rename = "isImported", default)]
    pub is_imported: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

/// One page of GET /transactions.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionsPage {
    pub transactions: Vec<Transaction>,
    pub pagination: Pagination,
}

/// Query parameters for GET /transactions. Unset fields are omitted from
/// the query string; the backend applies its own defaults.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransactionQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet: Option<String>,
    #[serde(rename = "txType", skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "startDate", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "endDate", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transaction_with_wallet_id() {
        let json = r#"{
            "_id": "t1",
            "wallet": "64a0",
            "txHash": "A3F1",
            "txType": "Payment",
            "timestamp": "2025-10-01T08:00:00Z",
            "amount": 25.0,
            "currency": "XRP"
        }"#;
        let tx: Transaction = serde_json::from_str(json).expect("transaction should parse");
        assert_eq!(tx.wallet.id(), "64a0");
        assert!(tx.wallet.name().is_none());
        assert_eq!(tx.amount, 25.0);
        assert!(!tx.is_imported);
    }

    #[test]
    fn test_parse_transaction_with_embedded_wallet() {
        let json = r#"{
            "_id": "t2",
            "wallet": {"_id": "64a0", "name": "Cold storage", "address": "rXa"},
            "txHash": "B4E2",
            "txType": "TrustSet",
            "timestamp": "2025-10-02T09:30:00Z",
            "amount": 0.0,
            "currency": "XRP",
            "feeAmount": 0.000012,
            "isImported": true
        }"#;
        let tx: Transaction = serde_json::from_str(json).expect("transaction should parse");
        assert_eq!(tx.wallet.name(), Some("Cold storage"));
        assert!(tx.is_imported);
    }

    #[test]
    fn test_parse_transactions_page() {
        let json = r#"{
            "transactions": [],
            "pagination": {"page": 1, "limit": 25, "total": 0, "pages": 0}
        }"#;
        let page: TransactionsPage = serde_json::from_str(json).expect("page should parse");
        assert!(page.transactions.is_empty());
        assert_eq!(page.pagination.limit, 25);
    }

    #[test]
    fn test_query_serializes_only_set_fields() {
        let query = TransactionQuery {
            page: Some(2),
            tx_type: Some("Payment".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&query).expect("query should serialize");
        assert_eq!(json, serde_json::json!({"page": 2, "txType": "Payment"}));
    }
}
