//! HTTP client for the tax-reporting backend.
//!
//! One `ApiClient` centralizes every outbound call: it attaches the bearer
//! token read from the persisted session store, maps error statuses to
//! `ApiError`, and clears the session on 401 before the caller sees the
//! failure. Redirect/re-login decisions belong to the caller, not here.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::SessionStore;
use crate::models::{
    DashboardData, ProfileUpdate, Report, ReportOptions, ReportRequest, Transaction,
    TransactionQuery, TransactionsPage, UserProfile, UserSettings, Wallet,
};

use super::error::backend_message;
use super::ApiError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Fallback messages when a rejected credential exchange carries no
/// structured error payload.
const LOGIN_FALLBACK: &str = "Failed to login";
const REGISTER_FALLBACK: &str = "Failed to register";

/// Successful credential exchange: the identity and the bearer token that
/// goes with it.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
}

/// API client. Clone is cheap - reqwest::Client shares its connection pool
/// and the store handle is a path.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    store: SessionStore,
}

impl ApiClient {
    pub fn new(base_url: &str, store: SessionStore) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Outbound step: attach the current token, read fresh from persisted
    /// storage so a record written or cleared elsewhere is honored. Never
    /// fails the request - with no token it goes out unauthenticated.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.store.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Inbound step: pass successes through; on 401 clear the persisted
    /// session before returning, so a caller catching any error can rely on
    /// the session already being gone if that was the cause.
    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            self.clear_session();
            return Err(ApiError::SessionExpired);
        }
        Err(ApiError::from_status(status, &body))
    }

    fn clear_session(&self) {
        match self.store.clear() {
            Ok(()) => debug!("Cleared persisted session after 401"),
            Err(e) => warn!(error = %e, "Failed to clear session after 401"),
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = self.authorize(request).send().await?;
        self.check(response).await
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::UnexpectedResponse(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.http.get(self.url(path))).await?;
        Self::parse(response).await
    }

    async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self
            .send(self.http.get(self.url(path)).query(query))
            .await?;
        Self::parse(response).await
    }

    async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send(self.http.post(self.url(path)).json(body)).await?;
        Self::parse(response).await
    }

    async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send(self.http.put(self.url(path)).json(body)).await?;
        Self::parse(response).await
    }

    /// Credential exchange for login/register. Failures become
    /// `Credential` with the backend's message (or a fixed fallback); a 401
    /// still runs the session-clearing step first, so stale credentials do
    /// not survive a rejected exchange.
    async fn exchange(
        &self,
        path: &str,
        body: &serde_json::Value,
        fallback: &str,
    ) -> Result<AuthResponse, ApiError> {
        let response = self
            .authorize(self.http.post(self.url(path)).json(body))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Self::parse(response).await;
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            self.clear_session();
        }
        Err(ApiError::Credential(
            backend_message(&body).unwrap_or_else(|| fallback.to_string()),
        ))
    }

    // ===== Auth =====

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.exchange(
            "/auth/login",
            &serde_json::json!({ "email": email, "password": password }),
            LOGIN_FALLBACK,
        )
        .await
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        country: &str,
    ) -> Result<AuthResponse, ApiError> {
        self.exchange(
            "/auth/register",
            &serde_json::json!({
                "name": name,
                "email": email,
                "password": password,
                "country": country,
            }),
            REGISTER_FALLBACK,
        )
        .await
    }

    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.get("/auth/profile").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        self.put("/auth/profile", update).await
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({
            "currentPassword": current_password,
            "newPassword": new_password,
        });
        self.send(self.http.put(self.url("/auth/change-password")).json(&body))
            .await?;
        Ok(())
    }

    // ===== Settings =====

    pub async fn settings(&self) -> Result<UserSettings, ApiError> {
        self.get("/auth/settings").await
    }

    pub async fn update_settings(&self, settings: &UserSettings) -> Result<UserSettings, ApiError> {
        self.put("/auth/settings", settings).await
    }

    pub async fn generate_api_key(&self) -> Result<String, ApiError> {
        let response = self
            .send(self.http.post(self.url("/auth/settings/api-key")))
            .await?;
        let key: ApiKeyResponse = Self::parse(response).await?;
        Ok(key.api_key)
    }

    // ===== Wallets =====

    pub async fn wallets(&self) -> Result<Vec<Wallet>, ApiError> {
        self.get("/wallets").await
    }

    pub async fn add_wallet(&self, address: &str, name: &str) -> Result<Wallet, ApiError> {
        let body = serde_json::json!({ "address": address, "name": name });
        self.post("/wallets", &body).await
    }

    pub async fn sync_wallet(&self, wallet_id: &str) -> Result<Wallet, ApiError> {
        let response = self
            .send(
                self.http
                    .post(self.url(&format!("/wallets/{}/sync", wallet_id))),
            )
            .await?;
        Self::parse(response).await
    }

    // ===== Transactions =====

    pub async fn transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<TransactionsPage, ApiError> {
        self.get_with_query("/transactions", query).await
    }

    pub async fn transaction(&self, id: &str) -> Result<Transaction, ApiError> {
        self.get(&format!("/transactions/{}", id)).await
    }

    // ===== Reports =====

    pub async fn report_options(&self) -> Result<ReportOptions, ApiError> {
        self.get("/reports/options").await
    }

    pub async fn generate_report(&self, request: &ReportRequest) -> Result<Report, ApiError> {
        self.post("/reports/generate", request).await
    }

    // ===== Dashboard =====

    pub async fn dashboard(&self) -> Result<DashboardData, ApiError> {
        self.get("/dashboard").await
    }
}

// Internal wire types for parsing

#[derive(Debug, Deserialize)]
struct ApiKeyResponse {
    #[serde(rename = "apiKey")]
    api_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().to_path_buf());
        let client = ApiClient::new("http://localhost:3001/api/", store).expect("client");
        assert_eq!(client.url("/wallets"), "http://localhost:3001/api/wallets");
    }

    #[test]
    fn test_parse_auth_response() {
        let json = r#"{
            "user": {"_id": "1", "name": "A", "email": "a@x.com"},
            "token": "abc"
        }"#;
        let auth: AuthResponse = serde_json::from_str(json).expect("auth should parse");
        assert_eq!(auth.token, "abc");
        assert_eq!(auth.user.email, "a@x.com");
    }

    #[test]
    fn test_parse_api_key_response() {
        let key: ApiKeyResponse =
            serde_json::from_str(r#"{"apiKey":"xk_live_1"}"#).expect("key should parse");
        assert_eq!(key.api_key, "xk_live_1");
    }
}
