use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::{DashboardData, ReportOptions, Wallet};

/// Consider a cached response stale after 15 minutes.
const CACHE_STALE_MINUTES: i64 = 15;

/// A cached backend response with the time it was fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cached<T> {
    pub data: T,
    pub fetched_at: DateTime<Utc>,
}

impl<T> Cached<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            fetched_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.fetched_at).num_minutes()
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }

    /// Human age label for display next to cached output.
    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

/// JSON-file cache for the slow-changing reads the shell displays.
/// A missing or unparseable entry is simply absent. The HTTP client never
/// caches; staleness decisions belong to the calling side.
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Option<Cached<T>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(cache = name, error = %e, "Failed to read cache entry");
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(cached) => Some(cached),
            Err(e) => {
                debug!(cache = name, error = %e, "Discarding unparseable cache entry");
                let _ = std::fs::remove_file(&path);
                None
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = Cached::new(data);
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(self.cache_path(name), contents)
            .with_context(|| format!("Failed to write cache entry: {}", name))?;
        Ok(())
    }

    /// Drop every cached response. Used on logout so one account's data
    /// never shows under another login.
    pub fn clear(&self) -> Result<()> {
        for name in ["dashboard", "wallets", "report_options"] {
            let path = self.cache_path(name);
            if path.exists() {
                std::fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    // ===== Dashboard =====

    pub fn load_dashboard(&self) -> Option<Cached<DashboardData>> {
        self.load("dashboard")
    }

    pub fn save_dashboard(&self, dashboard: &DashboardData) -> Result<()> {
        self.save("dashboard", dashboard)
    }

    // ===== Wallets =====

    pub fn load_wallets(&self) -> Option<Cached<Vec<Wallet>>> {
        self.load("wallets")
    }

    pub fn save_wallets(&self, wallets: &[Wallet]) -> Result<()> {
        self.save("wallets", &wallets)
    }

    // ===== Report options =====

    pub fn load_report_options(&self) -> Option<Cached<ReportOptions>> {
        self.load("report_options")
    }

    pub fn save_report_options(&self, options: &ReportOptions) -> Result<()> {
        self.save("report_options", options)
    }
}
