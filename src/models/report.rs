use serde::{Deserialize, Serialize};

/// The choices offered for report generation, as published by the backend.
/// Accounting methods and form names are opaque strings chosen server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOptions {
    #[serde(default)]
    pub years: Vec<i32>,
    #[serde(default)]
    pub formats: Vec<String>,
    #[serde(rename = "accountingMethods", default)]
    pub accounting_methods: Vec<String>,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub forms: Vec<String>,
}

/// Body of POST /reports/generate.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRequest {
    pub year: i32,
    pub format: String,
    #[serde(rename = "accountingMethod")]
    pub accounting_method: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Report {
    pub id: String,
    pub name: String,
    pub year: i32,
    #[serde(rename = "type")]
    pub report_type: String,
    #[serde(rename = "accountingMethod")]
    pub accounting_method: String,
    #[serde(rename = "dateGenerated")]
    pub date_generated: String,
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
}
