//! Page scaffolding for registered conversions.
//!
//! Every registered edge gets a landing page at `<pages_dir>/<slug>/index.html`.
//! This module plans one [`PageSpec`] per edge, renders it with
//! [Maud](https://maud.lambda.xyz/), and writes the pages that do not exist
//! yet.
//!
//! ## Output Structure
//!
//! ```text
//! pages/
//! ├── jpg-to-png/
//! │   └── index.html
//! ├── merge-pdf/
//! │   └── index.html
//! └── ...
//! ```
//!
//! ## Existing Pages
//!
//! Pages are created, never updated. A page that already exists is left
//! untouched and reported as skipped, so hand edits survive re-runs. Files are
//! opened with create-new semantics, which keeps concurrent workers from
//! clobbering each other.
//!
//! ## Parallel Writes
//!
//! Each page is an independent file, so the writes run on the rayon pool
//! configured from `[processing] max_processes`.

use crate::catalog::{Category, FormatToken};
use crate::config::SiteConfig;
use crate::registry::Registry;
use crate::routes::route_url;
use crate::slug::{Slug, SlugCodec, SlugError};
use maud::{DOCTYPE, Markup, html};
use rayon::prelude::*;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File written inside each page directory.
pub const PAGE_FILENAME: &str = "index.html";

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("Failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("Slug check failed: {0}")]
    Slug(#[from] SlugError),
}

/// Everything the page template needs for one conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSpec {
    pub slug: Slug,
    pub source: FormatToken,
    pub target: FormatToken,
    pub category: Category,
    pub source_name: String,
    pub target_name: String,
    pub title: String,
    pub description: String,
    /// Other conversions from the same source, in declared target order.
    pub siblings: Vec<Sibling>,
}

/// A link to another conversion of the same source format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sibling {
    pub slug: Slug,
    pub label: String,
}

/// Plan one page per registered edge, in registry order.
pub fn plan_pages(registry: &Registry, codec: &SlugCodec) -> Vec<PageSpec> {
    let catalog = registry.catalog();
    registry
        .edges()
        .map(|edge| {
            let source = edge.source.as_str();
            let target = edge.target.as_str();
            let title = codec.title(catalog, source, target);
            let source_name = catalog.display_name(source);
            let target_name = catalog.display_name(target);
            let description = if codec.is_override(source, target) {
                format!("{title} online. Free, private, and nothing to install.")
            } else {
                format!(
                    "Convert {source_name} files to {target_name} online. Free, private, and nothing to install."
                )
            };
            let siblings = registry
                .target_formats(source)
                .iter()
                .filter(|t| *t != &edge.target)
                .map(|t| Sibling {
                    slug: codec.encode(source, t.as_str()),
                    label: codec.title(catalog, source, t.as_str()),
                })
                .collect();

            PageSpec {
                slug: codec.encode_edge(&edge),
                source: edge.source.clone(),
                target: edge.target.clone(),
                category: edge.category,
                source_name,
                target_name,
                title,
                description,
                siblings,
            }
        })
        .collect()
}

/// `<pages_dir>/<slug>/index.html`.
pub fn page_path(pages_dir: &Path, slug: &Slug) -> PathBuf {
    pages_dir.join(slug.as_str()).join(PAGE_FILENAME)
}

/// Render the landing page for one conversion.
pub fn render_page(spec: &PageSpec, config: &SiteConfig) -> Markup {
    let full_title = format!("{} | {}", spec.title, config.site_name);
    let canonical = route_url(&config.base_url, spec.slug.as_str());

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (full_title) }
                meta name="description" content=(spec.description);
                link rel="canonical" href=(canonical);
            }
            body {
                nav.breadcrumb {
                    a href="/" { (config.site_name) }
                    " / "
                    span.category { (spec.category.as_str()) }
                }
                main.conversion-page {
                    h1 { (spec.title) }
                    p.lede { (spec.description) }
                    div.converter
                        data-source=(spec.source.as_str())
                        data-target=(spec.target.as_str())
                        data-category=(spec.category.as_str()) {}
                    @if !spec.siblings.is_empty() {
                        section.other-conversions {
                            h2 { "Convert " (spec.source_name) " to other formats" }
                            ul {
                                @for sibling in &spec.siblings {
                                    li {
                                        a href={ "/" (sibling.slug.as_str()) } { (sibling.label) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// What happened to one planned page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaffoldOutcome {
    Created,
    Skipped,
}

/// Result of a scaffolding run, in plan order.
#[derive(Debug, Default)]
pub struct ScaffoldReport {
    pub created: Vec<Slug>,
    pub skipped: Vec<Slug>,
}

impl ScaffoldReport {
    pub fn total(&self) -> usize {
        self.created.len() + self.skipped.len()
    }
}

/// Write every missing page under `pages_dir`.
///
/// Refuses to write anything if two edges share a slug.
pub fn scaffold(
    registry: &Registry,
    codec: &SlugCodec,
    config: &SiteConfig,
    pages_dir: &Path,
) -> Result<ScaffoldReport, ScaffoldError> {
    codec.audit(registry).ensure_unique()?;

    let specs = plan_pages(registry, codec);
    let outcomes: Vec<(Slug, ScaffoldOutcome)> = specs
        .par_iter()
        .map(|spec| write_page(spec, config, pages_dir).map(|outcome| (spec.slug.clone(), outcome)))
        .collect::<Result<_, ScaffoldError>>()?;

    let mut report = ScaffoldReport::default();
    for (slug, outcome) in outcomes {
        match outcome {
            ScaffoldOutcome::Created => report.created.push(slug),
            ScaffoldOutcome::Skipped => report.skipped.push(slug),
        }
    }
    tracing::info!(
        created = report.created.len(),
        skipped = report.skipped.len(),
        "scaffolded conversion pages"
    );
    Ok(report)
}

fn write_page(
    spec: &PageSpec,
    config: &SiteConfig,
    pages_dir: &Path,
) -> Result<ScaffoldOutcome, ScaffoldError> {
    let path = page_path(pages_dir, &spec.slug);
    let wrap = |source: io::Error| ScaffoldError::Write {
        path: path.clone(),
        source,
    };

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(wrap)?;
    }
    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            tracing::debug!(slug = %spec.slug, "page exists, skipping");
            return Ok(ScaffoldOutcome::Skipped);
        }
        Err(e) => return Err(wrap(e)),
    };
    file.write_all(render_page(spec, config).into_string().as_bytes())
        .map_err(wrap)?;
    tracing::debug!(slug = %spec.slug, "created page");
    Ok(ScaffoldOutcome::Created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slug::SlugOverride;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn find_spec<'a>(specs: &'a [PageSpec], slug: &str) -> &'a PageSpec {
        specs
            .iter()
            .find(|s| s.slug == slug)
            .unwrap_or_else(|| panic!("no page planned for {slug}"))
    }

    #[test]
    fn plans_one_page_per_edge() {
        let registry = builtin_registry();
        let specs = plan_pages(&registry, &SlugCodec::builtin());
        assert_eq!(specs.len(), registry.edge_count());
    }

    #[test]
    fn spec_carries_names_and_category() {
        let specs = plan_pages(&builtin_registry(), &SlugCodec::builtin());
        let spec = find_spec(&specs, "cr2-to-tiff");
        assert_eq!(spec.source, "cr2");
        assert_eq!(spec.target, "tiff");
        assert_eq!(spec.category, Category::Image);
        assert_eq!(spec.source_name, "Canon CR2");
        assert_eq!(spec.target_name, "TIFF");
        assert_eq!(spec.title, "Canon CR2 to TIFF");
    }

    #[test]
    fn override_spec_uses_override_slug_and_title() {
        let specs = plan_pages(&builtin_registry(), &SlugCodec::builtin());
        let spec = find_spec(&specs, "merge-pdf");
        assert_eq!(spec.target, "merged");
        assert_eq!(spec.category, Category::Pdf);
        assert_eq!(spec.title, "Merge PDF");
        assert_eq!(spec.target_name, "MERGED");
    }

    #[test]
    fn siblings_exclude_self_and_keep_order() {
        let registry = registry_from(&[(Category::Image, "heic", &["jpg", "png", "webp"])]);
        let specs = plan_pages(&registry, &SlugCodec::builtin());
        let spec = find_spec(&specs, "heic-to-png");
        let slugs: Vec<&str> = spec.siblings.iter().map(|s| s.slug.as_str()).collect();
        assert_eq!(slugs, ["heic-to-jpg", "heic-to-webp"]);
        assert_eq!(spec.siblings[0].label, "HEIC to JPG");
    }

    #[test]
    fn render_page_includes_converter_mount() {
        let specs = plan_pages(&builtin_registry(), &SlugCodec::builtin());
        let html = render_page(find_spec(&specs, "heic-to-jpg"), &test_config()).into_string();
        assert!(html.contains("<title>HEIC to JPG | Convert</title>"));
        assert!(html.contains(r#"data-source="heic""#));
        assert!(html.contains(r#"data-target="jpg""#));
        assert!(html.contains(r#"data-category="image""#));
        assert!(html.contains(r#"<link rel="canonical" href="https://convert.example/heic-to-jpg">"#));
        assert!(html.contains(r#"<a href="/heic-to-png">HEIC to PNG</a>"#));
    }

    #[test]
    fn render_page_without_siblings_omits_section() {
        let registry = registry_from(&[(Category::Video, "3gp", &["mp4"])]);
        let specs = plan_pages(&registry, &SlugCodec::builtin());
        let html = render_page(&specs[0], &test_config()).into_string();
        assert!(!html.contains("other-conversions"));
    }

    #[test]
    fn scaffold_creates_missing_pages() {
        let tmp = TempDir::new().unwrap();
        let registry = registry_from(&[
            (Category::Image, "jpg", &["png"]),
            (Category::Image, "png", &["jpg"]),
        ]);
        let report =
            scaffold(&registry, &SlugCodec::builtin(), &test_config(), tmp.path()).unwrap();
        assert_eq!(report.created.len(), 2);
        assert!(report.skipped.is_empty());
        assert!(tmp.path().join("jpg-to-png/index.html").is_file());
        assert!(tmp.path().join("png-to-jpg/index.html").is_file());
    }

    #[test]
    fn scaffold_skips_existing_pages() {
        let tmp = TempDir::new().unwrap();
        let existing = tmp.path().join("jpg-to-png");
        fs::create_dir_all(&existing).unwrap();
        fs::write(existing.join(PAGE_FILENAME), "hand edited").unwrap();

        let registry = registry_from(&[
            (Category::Image, "jpg", &["png"]),
            (Category::Image, "png", &["jpg"]),
        ]);
        let report =
            scaffold(&registry, &SlugCodec::builtin(), &test_config(), tmp.path()).unwrap();
        assert_eq!(report.skipped, vec![Slug::new("jpg-to-png")]);
        assert_eq!(report.created, vec![Slug::new("png-to-jpg")]);
        assert_eq!(
            fs::read_to_string(existing.join(PAGE_FILENAME)).unwrap(),
            "hand edited"
        );
    }

    #[test]
    fn scaffold_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let registry = builtin_registry();
        let codec = SlugCodec::builtin();
        let first = scaffold(&registry, &codec, &test_config(), tmp.path()).unwrap();
        let second = scaffold(&registry, &codec, &test_config(), tmp.path()).unwrap();
        assert_eq!(first.created.len(), registry.edge_count());
        assert!(second.created.is_empty());
        assert_eq!(second.skipped.len(), registry.edge_count());
    }

    #[test]
    fn scaffold_refuses_colliding_slugs() {
        let tmp = TempDir::new().unwrap();
        let registry = registry_from(&[
            (Category::Image, "jpg", &["png"]),
            (Category::Image, "png", &["jpg"]),
        ]);
        let codec = SlugCodec::new(vec![SlugOverride::new(
            "png",
            "jpg",
            "jpg-to-png",
            "Clash",
        )]);
        let result = scaffold(&registry, &codec, &test_config(), tmp.path());
        assert!(matches!(result, Err(ScaffoldError::Slug(_))));
        assert!(fs::read_dir(tmp.path()).unwrap().next().is_none());
    }

    #[test]
    fn empty_registry_scaffolds_nothing() {
        let tmp = TempDir::new().unwrap();
        let report = scaffold(
            &empty_registry(),
            &SlugCodec::builtin(),
            &test_config(),
            tmp.path(),
        )
        .unwrap();
        assert_eq!(report.total(), 0);
    }
}
