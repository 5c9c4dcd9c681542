//! Slug codec: conversion pair ⇄ URL path segment.
//!
//! Every conversion page lives at `/{slug}`. The default rule is
//! `{source}-to-{target}`, lower-cased:
//!
//! ```text
//! (heic, jpg)   → heic-to-jpg
//! (PDF, DOCX)   → pdf-to-docx
//! ```
//!
//! ## Overrides
//!
//! A short override table takes precedence on encode for pairs whose natural
//! slug reads badly, mostly pseudo-targets that are operations rather than
//! formats:
//!
//! ```text
//! (pdf, compressed) → compress-pdf
//! (pdf, merged)     → merge-pdf
//! ```
//!
//! Decode never looks at the override table. `decode("merge-pdf")` is `None`;
//! callers that need to recognize override slugs compare against the encoded
//! slug set instead (see [`crate::pages::check_pages`]).
//!
//! ## Decode Rule
//!
//! Split on `-`, find the **last** segment that is exactly `to`, and rebuild
//! source and target from the segments on either side. Matching is per
//! segment, never per substring, so a token like `photo` or `tor` never acts
//! as a separator. The rule cannot recover a target whose own name has a `to`
//! segment: `(a, b-to-c)` encodes to `a-to-b-to-c`, which decodes as
//! `(a-to-b, c)`. No catalog format looks like that today;
//! [`SlugCodec::audit`] reports any registered edge that fails to round-trip.
//!
//! Published slugs are permanent URLs. Once an edge has shipped, its slug must
//! not change and must never be handed to a different edge.

use crate::catalog::{FormatCatalog, FormatToken};
use crate::registry::{ConversionEdge, Registry};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

/// The separator segment of the default rule.
pub const SEPARATOR: &str = "to";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlugError {
    #[error("Slug '{slug}' is produced by both {first_source} → {first_target} and {second_source} → {second_target}")]
    Collision {
        slug: Slug,
        first_source: FormatToken,
        first_target: FormatToken,
        second_source: FormatToken,
        second_target: FormatToken,
    },
}

/// One URL path segment, always lower-case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    pub fn new(slug: &str) -> Self {
        Self(slug.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Slug {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Slug {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A literal slug (and page title) for one conversion pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SlugOverride {
    pub source: FormatToken,
    pub target: FormatToken,
    pub slug: Slug,
    pub title: String,
}

impl SlugOverride {
    pub fn new(source: &str, target: &str, slug: &str, title: &str) -> Self {
        Self {
            source: FormatToken::new(source),
            target: FormatToken::new(target),
            slug: Slug::new(slug),
            title: title.to_string(),
        }
    }
}

/// The site's override table: (source, target, slug, title).
pub const OVERRIDES: &[(&str, &str, &str, &str)] = &[
    ("pdf", "compressed", "compress-pdf", "Compress PDF"),
    ("pdf", "merged", "merge-pdf", "Merge PDF"),
    ("pdf", "split", "split-pdf", "Split PDF"),
    ("pdf", "excel", "pdf-to-excel", "PDF to Excel"),
    ("jpg", "compressed", "compress-jpg", "Compress JPG"),
    ("png", "compressed", "compress-png", "Compress PNG"),
];

/// Encoder/decoder between conversion pairs and slugs.
#[derive(Debug, Clone, Default)]
pub struct SlugCodec {
    overrides: HashMap<(FormatToken, FormatToken), SlugOverride>,
}

impl SlugCodec {
    /// A codec with the given overrides. Later entries replace earlier ones
    /// for the same pair.
    pub fn new(overrides: impl IntoIterator<Item = SlugOverride>) -> Self {
        let overrides = overrides
            .into_iter()
            .map(|o| ((o.source.clone(), o.target.clone()), o))
            .collect();
        Self { overrides }
    }

    /// The codec shipped with the site.
    pub fn builtin() -> Self {
        Self::new(
            OVERRIDES
                .iter()
                .map(|&(source, target, slug, title)| SlugOverride::new(source, target, slug, title)),
        )
    }

    fn lookup_override(&self, source: &str, target: &str) -> Option<&SlugOverride> {
        let key = (FormatToken::new(source), FormatToken::new(target));
        self.overrides.get(&key)
    }

    pub fn is_override(&self, source: &str, target: &str) -> bool {
        self.lookup_override(source, target).is_some()
    }

    /// Slug for `source → target`: override first, default rule otherwise.
    pub fn encode(&self, source: &str, target: &str) -> Slug {
        match self.lookup_override(source, target) {
            Some(o) => o.slug.clone(),
            None => encode_default(source, target),
        }
    }

    pub fn encode_edge(&self, edge: &ConversionEdge) -> Slug {
        self.encode(edge.source.as_str(), edge.target.as_str())
    }

    /// Parse a slug with the default rule. See [`decode`].
    pub fn decode(&self, slug: &str) -> Option<(FormatToken, FormatToken)> {
        decode(slug)
    }

    /// Human title for a conversion page.
    pub fn title(&self, catalog: &FormatCatalog, source: &str, target: &str) -> String {
        match self.lookup_override(source, target) {
            Some(o) => o.title.clone(),
            None => format!(
                "{} to {}",
                catalog.display_name(source),
                catalog.display_name(target)
            ),
        }
    }

    /// Check every registered edge: slug uniqueness and default-rule round-trip.
    pub fn audit(&self, registry: &Registry) -> SlugAudit {
        let mut owners: BTreeMap<Slug, ConversionEdge> = BTreeMap::new();
        let mut audit = SlugAudit::default();

        for edge in registry.edges() {
            let slug = self.encode_edge(&edge);

            if !self.is_override(edge.source.as_str(), edge.target.as_str()) {
                let decoded = decode(slug.as_str());
                if decoded.as_ref() != Some(&(edge.source.clone(), edge.target.clone())) {
                    audit.non_round_trip.push(RoundTripFailure {
                        edge: edge.clone(),
                        slug: slug.clone(),
                        decoded,
                    });
                }
            }

            match owners.get(&slug) {
                Some(first) => audit.collisions.push(SlugError::Collision {
                    slug,
                    first_source: first.source.clone(),
                    first_target: first.target.clone(),
                    second_source: edge.source,
                    second_target: edge.target,
                }),
                None => {
                    owners.insert(slug, edge);
                }
            }
        }
        audit.checked = owners.len() + audit.collisions.len();
        audit
    }
}

/// A default-rule edge whose slug decodes to something else.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundTripFailure {
    pub edge: ConversionEdge,
    pub slug: Slug,
    pub decoded: Option<(FormatToken, FormatToken)>,
}

/// Result of [`SlugCodec::audit`].
#[derive(Debug, Default)]
pub struct SlugAudit {
    pub checked: usize,
    pub collisions: Vec<SlugError>,
    pub non_round_trip: Vec<RoundTripFailure>,
}

impl SlugAudit {
    /// Fail on the first collision. Round-trip failures are warnings only.
    pub fn ensure_unique(self) -> Result<Self, SlugError> {
        match self.collisions.first() {
            Some(err) => Err(err.clone()),
            None => Ok(self),
        }
    }
}

/// `{source}-to-{target}`, lower-cased, with no override lookup.
pub fn encode_default(source: &str, target: &str) -> Slug {
    let source = FormatToken::new(source);
    let target = FormatToken::new(target);
    Slug(format!("{source}-{SEPARATOR}-{target}"))
}

/// Parse `{source}-to-{target}` on the last whole `to` segment.
///
/// Returns `None` when there is no `to` segment, when either side is empty,
/// or when both sides are the same format.
pub fn decode(slug: &str) -> Option<(FormatToken, FormatToken)> {
    let slug = slug.to_lowercase();
    let parts: Vec<&str> = slug.split('-').collect();
    let at = parts.iter().rposition(|&p| p == SEPARATOR)?;
    if at == 0 || at == parts.len() - 1 {
        return None;
    }

    let source = FormatToken::new(&parts[..at].join("-"));
    let target = FormatToken::new(&parts[at + 1..].join("-"));
    if source.as_str().is_empty() || target.as_str().is_empty() || source == target {
        return None;
    }
    Some((source, target))
}
