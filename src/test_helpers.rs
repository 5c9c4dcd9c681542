//! Shared test utilities for the conversion-routes test suite.
//!
//! Provides small registry builders, page-directory fixtures, and bulk
//! extractors so tests can state expectations as plain string lists.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let registry = registry_from(&[
//!     (Category::Image, "jpg", &["png"]),
//!     (Category::Image, "png", &["jpg"]),
//! ]);
//! let tmp = setup_pages(&["jpg-to-png", "about"]);
//! ```

use std::fs;
use tempfile::TempDir;

use crate::catalog::{Category, FormatCatalog, FormatInfo, FormatToken};
use crate::config::SiteConfig;
use crate::registry::{Registry, RegistryBuilder};
use crate::routes::RouteEntry;
use crate::scaffold::PAGE_FILENAME;

// =========================================================================
// Registries
// =========================================================================

pub fn builtin_catalog() -> FormatCatalog {
    FormatCatalog::builtin().unwrap()
}

pub fn builtin_registry() -> Registry {
    Registry::builtin().unwrap()
}

pub fn empty_registry() -> Registry {
    Registry::empty(builtin_catalog())
}

/// Build a registry over the builtin catalog from `(category, source, targets)` rows.
pub fn registry_from(rows: &[(Category, &str, &[&str])]) -> Registry {
    build(builtin_catalog(), rows)
}

/// Build a registry over a custom catalog of `(token, category)` rows.
///
/// Display names are the upper-cased tokens.
pub fn registry_from_catalog(
    formats: &[(&str, Category)],
    rows: &[(Category, &str, &[&str])],
) -> Registry {
    let catalog = FormatCatalog::new(
        formats
            .iter()
            .map(|&(token, category)| FormatInfo::new(token, category, &token.to_uppercase())),
        Vec::<FormatToken>::new(),
    )
    .unwrap();
    build(catalog, rows)
}

fn build(catalog: FormatCatalog, rows: &[(Category, &str, &[&str])]) -> Registry {
    let mut builder = RegistryBuilder::new(catalog);
    for &(category, source, targets) in rows {
        builder
            .declare(category, source, targets)
            .unwrap_or_else(|e| panic!("bad test row {source}: {e}"));
    }
    builder.build()
}

pub fn test_config() -> SiteConfig {
    SiteConfig::default()
}

// =========================================================================
// Page fixtures
// =========================================================================

/// Temp page directory with one `<slug>/index.html` per slug.
pub fn setup_pages(slugs: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for slug in slugs {
        let dir = tmp.path().join(slug);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(PAGE_FILENAME), "<!DOCTYPE html>").unwrap();
    }
    tmp
}

// =========================================================================
// Bulk extractors
// =========================================================================

pub fn tokens(list: &[FormatToken]) -> Vec<&str> {
    list.iter().map(|t| t.as_str()).collect()
}

pub fn urls(routes: &[RouteEntry]) -> Vec<&str> {
    routes.iter().map(|r| r.url.as_str()).collect()
}
