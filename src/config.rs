//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialized to a TOML table and the user's file is merged on top, so a
//! config file only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! `config.toml` lives in the site directory passed with `--site`:
//!
//! ```text
//! site/
//! ├── config.toml          # Optional, overrides stock defaults
//! └── pages/               # One directory per page slug
//!     ├── jpg-to-png/
//!     │   └── index.html
//!     └── merge-pdf/
//!         └── index.html
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! base_url = "https://convert.example"
//! site_name = "Convert"
//! pages_dir = "pages"
//!
//! [sitemap]
//! last_modified = "2026-10-16"   # omit to use the build date
//!
//! [sitemap.conversions]
//! change_frequency = "weekly"
//! priority = 0.8
//!
//! [[static_pages]]
//! slug = "about"
//! change_frequency = "monthly"
//! priority = 0.5
//!
//! [processing]
//! max_processes = 4              # omit for auto = CPU cores
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::types::{ChangeFrequency, PageSettings, StaticPage};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Scheme and host of the public site, no trailing slash.
    pub base_url: String,
    /// Site name appended to page titles.
    pub site_name: String,
    /// Page directory, relative to the site directory.
    pub pages_dir: String,
    /// Sitemap metadata.
    pub sitemap: SitemapConfig,
    /// Non-conversion pages included in the sitemap.
    pub static_pages: Vec<StaticPage>,
    /// Parallel scaffolding settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://convert.example".to_string(),
            site_name: "Convert".to_string(),
            pages_dir: "pages".to_string(),
            sitemap: SitemapConfig::default(),
            static_pages: default_static_pages(),
            processing: ProcessingConfig::default(),
        }
    }
}

fn default_static_pages() -> Vec<StaticPage> {
    vec![
        StaticPage::with("", ChangeFrequency::Daily, 1.0),
        StaticPage::new("about"),
        StaticPage::new("contact"),
        StaticPage::new("privacy-policy"),
        StaticPage::new("terms"),
        StaticPage::with("blog", ChangeFrequency::Weekly, 0.7),
        StaticPage::with("remove-background", ChangeFrequency::Weekly, 0.7),
        StaticPage::with("url-shortener", ChangeFrequency::Weekly, 0.7),
    ]
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.is_empty() {
            if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
                return Err(ConfigError::Validation(
                    "base_url must start with http:// or https://".into(),
                ));
            }
            if self.base_url.ends_with('/') {
                return Err(ConfigError::Validation(
                    "base_url must not end with '/'".into(),
                ));
            }
        }
        if self.pages_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "pages_dir must not be empty".into(),
            ));
        }
        if let Some(date) = &self.sitemap.last_modified {
            parse_date(date)?;
        }
        validate_priority("sitemap.conversions", self.sitemap.conversions.priority)?;

        let mut seen = HashSet::new();
        for page in &self.static_pages {
            if !is_valid_static_slug(&page.slug) {
                return Err(ConfigError::Validation(format!(
                    "static page slug '{}' must contain only a-z, 0-9 and '-'",
                    page.slug
                )));
            }
            if !seen.insert(page.slug.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "static page '{}' is listed twice",
                    page.slug
                )));
            }
            validate_priority(&format!("static page '{}'", page.slug), page.priority)?;
        }
        Ok(())
    }

    /// The configured sitemap date, or `today` when none is set.
    pub fn last_modified_or(&self, today: NaiveDate) -> Result<NaiveDate, ConfigError> {
        match &self.sitemap.last_modified {
            Some(date) => parse_date(date),
            None => Ok(today),
        }
    }

    /// Absolute page directory for a site rooted at `site_dir`.
    pub fn pages_path(&self, site_dir: &Path) -> PathBuf {
        site_dir.join(&self.pages_dir)
    }
}

fn validate_priority(what: &str, priority: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&priority) {
        return Err(ConfigError::Validation(format!(
            "{what} priority must be between 0.0 and 1.0"
        )));
    }
    let hundredths = priority * 100.0;
    if (hundredths - hundredths.round()).abs() > 1e-6 {
        return Err(ConfigError::Validation(format!(
            "{what} priority {priority} has more than two decimals"
        )));
    }
    Ok(())
}

fn is_valid_static_slug(slug: &str) -> bool {
    slug.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn parse_date(date: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        ConfigError::Validation(format!(
            "sitemap.last_modified '{date}' must be a YYYY-MM-DD date"
        ))
    })
}

/// Sitemap metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SitemapConfig {
    /// `YYYY-MM-DD` stamped on every entry. Absent means the build date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    /// Hints applied to every conversion page.
    pub conversions: PageSettings,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel scaffolding workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Arrays and scalars in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    let config = resolve_config(base, overlay)?;
    tracing::debug!(dir = %dir.display(), base_url = %config.base_url, "loaded site config");
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Conversion Routes Configuration
# ===============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Scheme and host of the public site, without a trailing slash.
# Leave empty to emit root-relative URLs.
base_url = "https://convert.example"

# Appended to every scaffolded page title.
site_name = "Convert"

# Where page directories live, relative to the site directory.
# Each page is <pages_dir>/<slug>/index.html.
pages_dir = "pages"

# ---------------------------------------------------------------------------
# Sitemap
# ---------------------------------------------------------------------------
[sitemap]
# Date stamped on every <lastmod>, as YYYY-MM-DD.
# Omit or comment out to use the build date.
# last_modified = "2026-10-16"

# Hints for every conversion page.
# change_frequency: always, hourly, daily, weekly, monthly, yearly, never
[sitemap.conversions]
change_frequency = "weekly"
priority = 0.8

# ---------------------------------------------------------------------------
# Static pages
# ---------------------------------------------------------------------------
# Non-conversion pages listed in the sitemap. An empty slug is the home page.
# Setting static_pages replaces this whole list.
[[static_pages]]
slug = ""
change_frequency = "daily"
priority = 1.0

[[static_pages]]
slug = "about"
change_frequency = "monthly"
priority = 0.5

[[static_pages]]
slug = "contact"
change_frequency = "monthly"
priority = 0.5

[[static_pages]]
slug = "privacy-policy"
change_frequency = "monthly"
priority = 0.5

[[static_pages]]
slug = "terms"
change_frequency = "monthly"
priority = 0.5

[[static_pages]]
slug = "blog"
change_frequency = "weekly"
priority = 0.7

[[static_pages]]
slug = "remove-background"
change_frequency = "weekly"
priority = 0.7

[[static_pages]]
slug = "url-shortener"
change_frequency = "weekly"
priority = 0.7

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel scaffolding workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
