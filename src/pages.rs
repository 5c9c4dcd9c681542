//! On-disk page verification.
//!
//! Reads the page directory and checks it against the registry in the decode
//! direction: every page directory should be either a registered conversion
//! or a configured static page, and every registered conversion should have a
//! page.
//!
//! ## Matching
//!
//! A page slug is matched against the *encoded* slug of every edge first, so
//! override slugs like `merge-pdf` are recognized even though the decoder
//! never reverses overrides. Only unmatched slugs are decoded, to tell a typo
//! (`undecodable`) from a page for a conversion the registry does not declare
//! (`unregistered`) or from a registered conversion published under the wrong
//! slug (`non-canonical`).

use crate::catalog::FormatToken;
use crate::registry::{ConversionEdge, Registry};
use crate::scaffold::PAGE_FILENAME;
use crate::slug::{Slug, SlugCodec};
use crate::types::StaticPage;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PagesError {
    #[error("Failed to read page directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Why a page has no registered counterpart.
#[derive(Debug, Clone, PartialEq)]
pub enum OrphanReason {
    /// The slug has no `to` segment, or an empty side.
    Undecodable,
    /// Decodes to a pair the registry does not declare.
    Unregistered {
        source: FormatToken,
        target: FormatToken,
    },
    /// Decodes to a declared pair whose published slug is different.
    NonCanonical { canonical: Slug },
}

/// An on-disk page with no registered counterpart.
#[derive(Debug, Clone, PartialEq)]
pub struct Orphan {
    pub slug: String,
    pub reason: OrphanReason,
}

/// Result of comparing page directories against the registry.
#[derive(Debug, Default)]
pub struct PageCheck {
    /// Pages for registered conversions.
    pub conversions: Vec<Slug>,
    /// Pages for configured static pages.
    pub statics: Vec<String>,
    pub orphans: Vec<Orphan>,
    /// Registered conversions without a page, sorted.
    pub missing: Vec<Slug>,
}

impl PageCheck {
    pub fn is_clean(&self) -> bool {
        self.orphans.is_empty() && self.missing.is_empty()
    }
}

/// Slugs of first-level directories under `pages_dir` that hold an `index.html`.
///
/// A missing page directory yields no pages. Hidden directories are ignored.
pub fn scan_pages(pages_dir: &Path) -> Result<Vec<String>, PagesError> {
    if !pages_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut slugs = Vec::new();
    for entry in WalkDir::new(pages_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        if entry.path().join(PAGE_FILENAME).is_file() {
            slugs.push(name);
        } else {
            tracing::debug!(dir = %entry.path().display(), "directory has no page file");
        }
    }
    Ok(slugs)
}

/// Classify every existing page slug and list registered edges lacking a page.
pub fn check_pages(
    registry: &Registry,
    codec: &SlugCodec,
    static_pages: &[StaticPage],
    existing: &[String],
) -> PageCheck {
    let encoded: BTreeMap<Slug, ConversionEdge> = registry
        .edges()
        .map(|edge| (codec.encode_edge(&edge), edge))
        .collect();
    let statics: HashSet<String> = static_pages
        .iter()
        .map(|p| p.slug.to_lowercase())
        .collect();

    let mut check = PageCheck::default();
    let mut seen = BTreeSet::new();

    for raw in existing {
        let slug = Slug::new(raw);
        if encoded.contains_key(&slug) {
            seen.insert(slug.clone());
            check.conversions.push(slug);
            continue;
        }
        if statics.contains(slug.as_str()) {
            check.statics.push(raw.clone());
            continue;
        }

        let reason = match codec.decode(slug.as_str()) {
            None => OrphanReason::Undecodable,
            Some((source, target)) if registry.is_supported(source.as_str(), target.as_str()) => {
                OrphanReason::NonCanonical {
                    canonical: codec.encode(source.as_str(), target.as_str()),
                }
            }
            Some((source, target)) => OrphanReason::Unregistered { source, target },
        };
        check.orphans.push(Orphan {
            slug: raw.clone(),
            reason,
        });
    }

    check.missing = encoded
        .into_keys()
        .filter(|slug| !seen.contains(slug))
        .collect();
    check
}
