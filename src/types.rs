//! Shared types used by configuration, route generation and output.
//!
//! These are read from `config.toml` and written into `routes --json`, so
//! their serialized form is part of the tool's interface.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sitemap `<changefreq>` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeFrequency::Always => "always",
            ChangeFrequency::Hourly => "hourly",
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
            ChangeFrequency::Yearly => "yearly",
            ChangeFrequency::Never => "never",
        }
    }
}

impl fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sitemap hints shared by a group of pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageSettings {
    pub change_frequency: ChangeFrequency,
    /// Relative priority, `0.0..=1.0`, at most two decimals.
    pub priority: f64,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            change_frequency: ChangeFrequency::Weekly,
            priority: 0.8,
        }
    }
}

/// A non-conversion page (about, blog, utility tools).
///
/// An empty slug is the site root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticPage {
    pub slug: String,
    #[serde(default = "default_static_frequency")]
    pub change_frequency: ChangeFrequency,
    #[serde(default = "default_static_priority")]
    pub priority: f64,
}

fn default_static_frequency() -> ChangeFrequency {
    ChangeFrequency::Monthly
}

fn default_static_priority() -> f64 {
    0.5
}

impl StaticPage {
    /// A static page with the default monthly / 0.5 hints.
    pub fn new(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            change_frequency: default_static_frequency(),
            priority: default_static_priority(),
        }
    }

    pub fn with(slug: &str, change_frequency: ChangeFrequency, priority: f64) -> Self {
        Self {
            slug: slug.to_string(),
            change_frequency,
            priority,
        }
    }

    pub fn settings(&self) -> PageSettings {
        PageSettings {
            change_frequency: self.change_frequency,
            priority: self.priority,
        }
    }
}
