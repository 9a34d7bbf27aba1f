use serde::{Deserialize, Serialize};

/// The authenticated user's identity as returned by the auth endpoints.
///
/// Owned by the session: nothing outside login/register/restore/logout
/// replaces the copy held there. Profile edits go straight to the backend
/// and are re-fetched, never written back into the session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Partial profile update for PUT /auth/profile.
/// Only the fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.country.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    pub tax: TaxSettings,
    pub notifications: NotificationSettings,
    pub api: ApiSettings,
}

/// Tax preferences. The accounting method is an opaque backend string
/// (FIFO, LIFO, HIFO, ACB); the client never interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxSettings {
    #[serde(rename = "defaultMethod")]
    pub default_method: String,
    #[serde(rename = "fiscalYearEnd")]
    pub fiscal_year_end: String,
    pub currency: String,
    #[serde(rename = "includeFees", default)]
    pub include_fees: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(rename = "emailNotifications", default)]
    pub email_notifications: bool,
    #[serde(rename = "transactionAlerts", default)]
    pub transaction_alerts: bool,
    #[serde(rename = "priceAlerts", default)]
    pub price_alerts: bool,
    #[serde(rename = "marketingSummaries", default)]
    pub marketing_summaries: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(rename = "apiEnabled", default)]
    pub api_enabled: bool,
    #[serde(rename = "apiKey", default)]
    pub api_key: String,
    #[serde(rename = "allowedOrigins", default)]
    pub allowed_origins: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_profile() {
        let json = r#"{"_id":"64f1","name":"Ada","email":"ada@example.com","country":"US"}"#;
        let user: UserProfile = serde_json::from_str(json).expect("profile should parse");
        assert_eq!(user.id, "64f1");
        assert_eq!(user.name, "Ada");
        assert_eq!(user.country.as_deref(), Some("US"));
    }

    #[test]
    fn test_parse_user_profile_without_country() {
        let json = r#"{"_id":"64f1","name":"Ada","email":"ada@example.com"}"#;
        let user: UserProfile = serde_json::from_str(json).expect("profile should parse");
        assert!(user.country.is_none());
    }

    #[test]
    fn test_parse_user_profile_accepts_plain_id_key() {
        let json = r#"{"id":"1","name":"A","email":"a@x.com"}"#;
        let user: UserProfile = serde_json::from_str(json).expect("profile should parse");
        assert_eq!(user.id, "1");
    }

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            name: Some("Ada L.".to_string()),
            country: None,
        };
        let json = serde_json::to_string(&update).expect("update should serialize");
        assert_eq!(json, r#"{"name":"Ada L."}"#);
    }
}
