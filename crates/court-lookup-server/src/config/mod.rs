//! Configuration loading and resolution.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use court_lookup::{
    CourtScraper, CourtSource, Endpoints, LookupService, ScraperConfig, SqliteRecordStore,
};

/// Overrides the query log location.
pub const DB_ENV: &str = "COURT_LOOKUP_DB";

/// Points every court source at one origin (staging mirrors, local mocks).
pub const BASE_URL_ENV: &str = "COURT_LOOKUP_BASE_URL";

/// Resolve the query log path.
///
/// Order: explicit flag, `COURT_LOOKUP_DB`, `./court_data.db` if present,
/// then `~/.court-lookup/court_data.db`.
pub fn resolve_db_path(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Ok(env_path) = std::env::var(DB_ENV) {
        return PathBuf::from(env_path);
    }

    let cwd_db = PathBuf::from("court_data.db");
    if cwd_db.exists() {
        return cwd_db;
    }

    resolve_default_db_path()
}

fn resolve_default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".court-lookup")
        .join("court_data.db")
}

/// Scraper settings, honoring `COURT_LOOKUP_BASE_URL`.
pub fn scraper_config() -> Result<ScraperConfig> {
    let mut config = ScraperConfig::default();
    if let Ok(origin) = std::env::var(BASE_URL_ENV) {
        config.endpoints = Endpoints::single_origin(&origin)
            .with_context(|| format!("invalid {BASE_URL_ENV}"))?;
    }
    Ok(config)
}

/// Open the store, build the scraper, and wire them into a lookup service.
pub fn build_service(db_path: &Path, source: CourtSource) -> Result<LookupService> {
    let store = SqliteRecordStore::open(db_path)
        .with_context(|| format!("failed to open query log at {}", db_path.display()))?;
    let scraper = CourtScraper::new(scraper_config()?).context("failed to build court scraper")?;
    tracing::info!("query log: {}", db_path.display());

    Ok(LookupService::new(Arc::new(scraper), Arc::new(store)).with_source(source))
}
