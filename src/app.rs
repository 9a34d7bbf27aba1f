//! Application shell: wires config, session, client, and cache together
//! and implements one handler per CLI command.
//!
//! This layer owns the reaction to an expired session. The gateway client
//! only clears the persisted record and returns `SessionExpired`; deciding
//! what the user sees next happens here - and the login/register commands
//! never show the "log in again" hint, since the user is already there.

use std::io::{self, Write};

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{CredentialStore, Session, SessionStore};
use crate::cache::CacheManager;
use crate::config::Config;
use crate::models::{
    DashboardData, ProfileUpdate, ReportRequest, Transaction, TransactionQuery, UserSettings,
    Wallet,
};
use crate::utils::format::{format_date, format_usd, format_xrp, short_id, truncate};
use crate::validate;

/// Maximum concurrent wallet sync requests.
/// Syncs are independent server-side jobs; 4 keeps the backend comfortable.
const MAX_CONCURRENT_SYNCS: usize = 4;

pub struct App {
    config: Config,
    session: Session,
    client: ApiClient,
    cache: CacheManager,
}

impl App {
    /// Build the shell and restore the persisted session. Restore runs
    /// exactly once, here, before any command executes.
    pub fn new() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        let store = SessionStore::new(config.data_dir()?);
        let client = ApiClient::new(&config.api_url(), store.clone())?;
        let cache = CacheManager::new(config.cache_dir()?)?;
        let mut session = Session::new(store);
        session.restore()?;
        Ok(Self {
            config,
            session,
            client,
            cache,
        })
    }

    /// Map a command failure. On `SessionExpired` the persisted record is
    /// already gone; drop the in-memory state too and point at `login`.
    fn auth_failed(&mut self, err: ApiError) -> anyhow::Error {
        if matches!(err, ApiError::SessionExpired) {
            self.session.expire();
            anyhow::anyhow!("Session expired. Run `xrptax login` to sign in again.")
        } else {
            err.into()
        }
    }

    // ===== Auth commands =====

    pub async fn login(&mut self, email: Option<String>, remember: bool) -> Result<()> {
        let email = match email {
            Some(email) => email,
            None => prompt("Email", self.config.last_email.as_deref())?,
        };
        validate::email(&email)?;

        let password = match CredentialStore::get_password(&email) {
            Ok(saved) => {
                info!("Using remembered password from keychain");
                saved
            }
            Err(_) => prompt_password("Password")?,
        };

        self.session.login(&self.client, &email, &password).await?;

        self.config.last_email = Some(email.clone());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
        if remember {
            if let Err(e) = CredentialStore::store(&email, &password) {
                warn!(error = %e, "Failed to remember password");
            }
        }

        if let Some(user) = self.session.user() {
            println!("Logged in as {} <{}>", user.name, user.email);
        }
        Ok(())
    }

    pub async fn register(
        &mut self,
        name: Option<String>,
        email: Option<String>,
        country: String,
    ) -> Result<()> {
        let name = match name {
            Some(name) => name,
            None => prompt("Name", None)?,
        };
        let email = match email {
            Some(email) => email,
            None => prompt("Email", None)?,
        };
        validate::email(&email)?;

        let password = prompt_password("Password")?;
        validate::password(&password)?;
        let confirmation = prompt_password("Confirm password")?;
        validate::password_confirmation(&password, &confirmation)?;

        self.session
            .register(&self.client, &name, &email, &password, &country)
            .await?;

        self.config.last_email = Some(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        if let Some(user) = self.session.user() {
            println!("Welcome, {} <{}>", user.name, user.email);
        }
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        self.session.logout()?;
        if let Some(ref email) = self.config.last_email {
            if let Err(e) = CredentialStore::delete(email) {
                warn!(error = %e, "Failed to remove remembered password");
            }
        }
        if let Err(e) = self.cache.clear() {
            warn!(error = %e, "Failed to clear cached responses");
        }
        println!("Logged out.");
        Ok(())
    }

    pub fn whoami(&self) {
        match self.session.user() {
            Some(user) => {
                println!("{} <{}>", user.name, user.email);
                if let Some(ref country) = user.country {
                    println!("Country: {}", country);
                }
            }
            None => println!("Not logged in. Run `xrptax login`."),
        }
    }

    // ===== Dashboard =====

    pub async fn dashboard(&mut self, refresh: bool) -> Result<()> {
        if !refresh {
            if let Some(cached) = self.cache.load_dashboard() {
                if !cached.is_stale() {
                    print_dashboard(&cached.data, Some(&cached.age_display()));
                    return Ok(());
                }
            }
        }
        let result = self.client.dashboard().await;
        let data = result.map_err(|e| self.auth_failed(e))?;
        if let Err(e) = self.cache.save_dashboard(&data) {
            warn!(error = %e, "Failed to cache dashboard");
        }
        print_dashboard(&data, None);
        Ok(())
    }

    // ===== Wallets =====

    pub async fn wallets(&mut self, refresh: bool) -> Result<()> {
        if !refresh {
            if let Some(cached) = self.cache.load_wallets() {
                if !cached.is_stale() {
                    print_wallets(&cached.data, Some(&cached.age_display()));
                    return Ok(());
                }
            }
        }
        let result = self.client.wallets().await;
        let wallets = result.map_err(|e| self.auth_failed(e))?;
        if let Err(e) = self.cache.save_wallets(&wallets) {
            warn!(error = %e, "Failed to cache wallets");
        }
        print_wallets(&wallets, None);
        Ok(())
    }

    pub async fn add_wallet(&mut self, address: String, name: String) -> Result<()> {
        validate::wallet_address(&address)?;
        validate::wallet_name(&name)?;
        let result = self.client.add_wallet(address.trim(), name.trim()).await;
        let wallet = result.map_err(|e| self.auth_failed(e))?;
        println!("Added wallet {} ({})", wallet.label(), wallet.address);
        println!("Run `xrptax wallets sync {}` to import its history.", wallet.label());
        Ok(())
    }

    /// Sync one wallet (matched by id, address, or name) or all of them.
    pub async fn sync_wallets(&mut self, target: Option<String>, all: bool) -> Result<()> {
        let result = self.client.wallets().await;
        let wallets = result.map_err(|e| self.auth_failed(e))?;

        let targets: Vec<Wallet> = if all {
            wallets
        } else {
            let needle = target
                .ok_or_else(|| anyhow::anyhow!("Name a wallet to sync, or pass --all"))?;
            let found = wallets
                .into_iter()
                .find(|w| w.id == needle || w.address == needle || w.name == needle);
            match found {
                Some(wallet) => vec![wallet],
                None => anyhow::bail!("No wallet matches '{}'", needle),
            }
        };
        if targets.is_empty() {
            println!("No wallets to sync.");
            return Ok(());
        }

        println!("Syncing {} wallet(s)...", targets.len());
        let client = self.client.clone();
        let results: Vec<(String, Result<Wallet, ApiError>)> = stream::iter(targets)
            .map(|wallet| {
                let client = client.clone();
                async move {
                    let label = wallet.label().to_string();
                    let result = client.sync_wallet(&wallet.id).await;
                    (label, result)
                }
            })
            .buffer_unordered(MAX_CONCURRENT_SYNCS)
            .collect()
            .await;

        let mut expired = false;
        for (label, result) in results {
            match result {
                Ok(wallet) => println!(
                    "  {} synced: {} XRP ({})",
                    label,
                    format_xrp(wallet.balance),
                    format_usd(wallet.balance_usd)
                ),
                Err(ApiError::SessionExpired) => expired = true,
                Err(e) => println!("  {} failed: {}", label, e),
            }
        }
        if expired {
            return Err(self.auth_failed(ApiError::SessionExpired));
        }
        Ok(())
    }

    // ===== Transactions =====

    pub async fn transactions(&mut self, query: TransactionQuery) -> Result<()> {
        let result = self.client.transactions(&query).await;
        let page = result.map_err(|e| self.auth_failed(e))?;

        if page.transactions.is_empty() {
            println!("No transactions match.");
            return Ok(());
        }
        println!(
            "{:<17} {:<14} {:<12} {:>16} {:>12}",
            "DATE", "HASH", "TYPE", "AMOUNT", "USD"
        );
        for tx in &page.transactions {
            println!(
                "{:<17} {:<14} {:<12} {:>16} {:>12}",
                format_date(&tx.timestamp),
                short_id(&tx.tx_hash),
                truncate(&tx.tx_type, 12),
                format!("{} {}", format_xrp(tx.amount), tx.currency),
                format_usd(tx.base_currency_amount),
            );
        }
        let p = &page.pagination;
        println!("Page {}/{} ({} total)", p.page, p.pages, p.total);
        Ok(())
    }

    pub async fn transaction(&mut self, id: String) -> Result<()> {
        let result = self.client.transaction(&id).await;
        let tx = result.map_err(|e| self.auth_failed(e))?;
        print_transaction(&tx);
        Ok(())
    }

    // ===== Reports =====

    pub async fn report_options(&mut self, refresh: bool) -> Result<()> {
        let options = if refresh {
            None
        } else {
            self.cache.load_report_options().filter(|c| !c.is_stale())
        };
        let options = match options {
            Some(cached) => cached.data,
            None => {
                let result = self.client.report_options().await;
                let fresh = result.map_err(|e| self.auth_failed(e))?;
                if let Err(e) = self.cache.save_report_options(&fresh) {
                    warn!(error = %e, "Failed to cache report options");
                }
                fresh
            }
        };
        println!("Years:      {:?}", options.years);
        println!("Formats:    {}", options.formats.join(", "));
        println!("Methods:    {}", options.accounting_methods.join(", "));
        println!("Countries:  {}", options.countries.join(", "));
        if !options.forms.is_empty() {
            println!("Forms:      {}", options.forms.join(", "));
        }
        Ok(())
    }

    pub async fn generate_report(&mut self, request: ReportRequest) -> Result<()> {
        println!(
            "Generating {} {} report for {}...",
            request.accounting_method, request.format, request.year
        );
        let result = self.client.generate_report(&request).await;
        let report = result.map_err(|e| self.auth_failed(e))?;
        println!("Generated {} ({})", report.name, report.report_type);
        println!("Download: {}", report.download_url);
        Ok(())
    }

    // ===== Settings & profile =====

    pub async fn settings(&mut self) -> Result<()> {
        let result = self.client.settings().await;
        let settings = result.map_err(|e| self.auth_failed(e))?;
        print_settings(&settings);
        Ok(())
    }

    /// Read-modify-write: fetch current settings, apply the requested
    /// changes, and put the whole object back, the way the backend expects.
    pub async fn update_settings(&mut self, changes: SettingsChanges) -> Result<()> {
        if changes.is_empty() {
            anyhow::bail!("Nothing to change; see `xrptax settings set --help`");
        }
        let result = self.client.settings().await;
        let mut settings = result.map_err(|e| self.auth_failed(e))?;
        changes.apply(&mut settings);

        let result = self.client.update_settings(&settings).await;
        let updated = result.map_err(|e| self.auth_failed(e))?;
        println!("Settings updated.");
        print_settings(&updated);
        Ok(())
    }

    pub async fn generate_api_key(&mut self) -> Result<()> {
        let result = self.client.generate_api_key().await;
        let key = result.map_err(|e| self.auth_failed(e))?;
        println!("New API key: {}", key);
        println!("Store it now - it is shown only once.");
        Ok(())
    }

    pub async fn profile(&mut self) -> Result<()> {
        let result = self.client.profile().await;
        let profile = result.map_err(|e| self.auth_failed(e))?;
        println!("{} <{}>", profile.name, profile.email);
        if let Some(ref country) = profile.country {
            println!("Country: {}", country);
        }
        Ok(())
    }

    pub async fn update_profile(&mut self, update: ProfileUpdate) -> Result<()> {
        if update.is_empty() {
            anyhow::bail!("Nothing to update; pass --name or --country");
        }
        let result = self.client.update_profile(&update).await;
        let profile = result.map_err(|e| self.auth_failed(e))?;
        println!("Profile updated: {} <{}>", profile.name, profile.email);
        Ok(())
    }

    pub async fn change_password(&mut self) -> Result<()> {
        let current = prompt_password("Current password")?;
        let new = prompt_password("New password")?;
        validate::password(&new)?;
        let confirmation = prompt_password("Confirm new password")?;
        validate::password_confirmation(&new, &confirmation)?;

        let result = self.client.change_password(&current, &new).await;
        result.map_err(|e| self.auth_failed(e))?;

        // Keep the keychain in step with the backend.
        if let Some(ref email) = self.config.last_email {
            if CredentialStore::has_credentials(email) {
                if let Err(e) = CredentialStore::store(email, &new) {
                    warn!(error = %e, "Failed to update remembered password");
                }
            }
        }
        println!("Password changed.");
        Ok(())
    }
}

/// The settings fields the CLI can change in place.
#[derive(Debug, Default)]
pub struct SettingsChanges {
    pub method: Option<String>,
    pub currency: Option<String>,
    pub include_fees: Option<bool>,
    pub email_notifications: Option<bool>,
    pub transaction_alerts: Option<bool>,
}

impl SettingsChanges {
    pub fn is_empty(&self) -> bool {
        self.method.is_none()
            && self.currency.is_none()
            && self.include_fees.is_none()
            && self.email_notifications.is_none()
            && self.transaction_alerts.is_none()
    }

    fn apply(&self, settings: &mut UserSettings) {
        if let Some(ref method) = self.method {
            settings.tax.default_method = method.clone();
        }
        if let Some(ref currency) = self.currency {
            settings.tax.currency = currency.clone();
        }
        if let Some(include_fees) = self.include_fees {
            settings.tax.include_fees = include_fees;
        }
        if let Some(email) = self.email_notifications {
            settings.notifications.email_notifications = email;
        }
        if let Some(alerts) = self.transaction_alerts {
            settings.notifications.transaction_alerts = alerts;
        }
    }
}

// ===== Prompts =====

fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    let mut stdout = io::stdout();
    match default {
        Some(default) => write!(stdout, "{} [{}]: ", label, default)?,
        None => write!(stdout, "{}: ", label)?,
    }
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let line = line.trim();
    if line.is_empty() {
        if let Some(default) = default {
            return Ok(default.to_string());
        }
        anyhow::bail!("{} is required", label);
    }
    Ok(line.to_string())
}

fn prompt_password(label: &str) -> Result<String> {
    Ok(rpassword::prompt_password(format!("{}: ", label))?)
}

// ===== Output =====

fn print_dashboard(data: &DashboardData, age: Option<&str>) {
    if let Some(age) = age {
        println!("(cached {})", age);
    }
    println!("Wallets:      {}", data.wallet_count);
    println!("Transactions: {}", data.transaction_count);
    println!("Portfolio:    {}", format_usd(data.balance_usd));
    println!();
    println!("Tax summary");
    let tax = &data.tax_summary;
    println!("  Income:           {}", format_usd(tax.total_income));
    println!("  Capital gains:    {}", format_usd(tax.total_capital_gains));
    println!("    short term:     {}", format_usd(tax.total_short_term_gains));
    println!("    long term:      {}", format_usd(tax.total_long_term_gains));
    if !data.recent_transactions.is_empty() {
        println!();
        println!("Recent activity");
        for tx in &data.recent_transactions {
            println!(
                "  {:<12} {:<12} {:>14} {}  {}",
                tx.date,
                truncate(&tx.tx_type, 12),
                format_xrp(tx.amount),
                tx.currency,
                format_usd(tx.usd_value)
            );
        }
    }
}

fn print_wallets(wallets: &[Wallet], age: Option<&str>) {
    if let Some(age) = age {
        println!("(cached {})", age);
    }
    if wallets.is_empty() {
        println!("No wallets yet. Add one with `xrptax wallets add <address> --name <name>`.");
        return;
    }
    println!(
        "{:<20} {:<36} {:>14} {:>12}  {}",
        "NAME", "ADDRESS", "XRP", "USD", "LAST SYNC"
    );
    for wallet in wallets {
        let last_sync = wallet
            .last_synced
            .map(|t| format_date(&t))
            .unwrap_or_else(|| "never".to_string());
        println!(
            "{:<20} {:<36} {:>14} {:>12}  {}",
            truncate(wallet.label(), 20),
            wallet.address,
            format_xrp(wallet.balance),
            format_usd(wallet.balance_usd),
            last_sync
        );
    }
}

fn print_transaction(tx: &Transaction) {
    println!("Transaction {}", tx.id);
    println!("  Hash:       {}", tx.tx_hash);
    println!("  Date:       {}", format_date(&tx.timestamp));
    println!("  Type:       {}", tx.tx_type);
    if let Some(ref category) = tx.category {
        println!("  Category:   {}", category);
    }
    if let Some(ref classification) = tx.classification {
        println!("  Class:      {}", classification);
    }
    match tx.wallet.name() {
        Some(name) => println!("  Wallet:     {} ({})", name, tx.wallet.id()),
        None => println!("  Wallet:     {}", tx.wallet.id()),
    }
    if let Some(ref from) = tx.from_address {
        println!("  From:       {}", from);
    }
    if let Some(ref to) = tx.to_address {
        println!("  To:         {}", to);
    }
    println!("  Amount:     {} {}", format_xrp(tx.amount), tx.currency);
    if tx.fee_amount > 0.0 {
        println!(
            "  Fee:        {} {}",
            format_xrp(tx.fee_amount),
            tx.fee_currency.as_deref().unwrap_or("XRP")
        );
    }
    println!(
        "  Value:      {} ({} rate {:.4})",
        format_usd(tx.base_currency_amount),
        tx.base_currency.as_deref().unwrap_or("USD"),
        tx.base_currency_rate
    );
    if tx.is_imported {
        println!("  Imported:   yes");
    }
    if let Some(ref notes) = tx.notes {
        if !notes.is_empty() {
            println!("  Notes:      {}", notes);
        }
    }
}

fn print_settings(settings: &UserSettings) {
    println!("Tax");
    println!("  Method:           {}", settings.tax.default_method);
    println!("  Fiscal year end:  {}", settings.tax.fiscal_year_end);
    println!("  Currency:         {}", settings.tax.currency);
    println!("  Include fees:     {}", settings.tax.include_fees);
    println!("Notifications");
    println!("  Email:            {}", settings.notifications.email_notifications);
    println!("  Transactions:     {}", settings.notifications.transaction_alerts);
    println!("  Prices:           {}", settings.notifications.price_alerts);
    println!("  Summaries:        {}", settings.notifications.marketing_summaries);
    println!("API access");
    println!("  Enabled:          {}", settings.api.api_enabled);
    if !settings.api.api_key.is_empty() {
        println!("  Key:              {}", short_id(&settings.api.api_key));
    }
    if !settings.api.allowed_origins.is_empty() {
        println!("  Origins:          {}", settings.api.allowed_origins);
    }
}
