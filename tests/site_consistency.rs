//! End-to-end consistency checks across the sitemap, scaffolding, and page
//! verification, using the builtin registry and a temporary site directory.

use chrono::NaiveDate;
use conversion_routes::config::{self, SiteConfig};
use conversion_routes::pages::{self, OrphanReason};
use conversion_routes::registry::Registry;
use conversion_routes::routes::{self, RouteOptions, RouteOrigin};
use conversion_routes::scaffold::{self, PAGE_FILENAME};
use conversion_routes::slug::{Slug, SlugCodec};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn options(config: &SiteConfig) -> RouteOptions {
    RouteOptions {
        base_url: config.base_url.clone(),
        last_modified: config
            .last_modified_or(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
            .unwrap(),
        conversions: config.sitemap.conversions.clone(),
    }
}

fn scaffolded_site() -> (TempDir, SiteConfig, Registry, SlugCodec) {
    let tmp = TempDir::new().unwrap();
    let config = SiteConfig::default();
    let registry = Registry::builtin().unwrap();
    let codec = SlugCodec::builtin();
    scaffold::scaffold(&registry, &codec, &config, &config.pages_path(tmp.path())).unwrap();
    (tmp, config, registry, codec)
}

fn check(
    tmp: &Path,
    config: &SiteConfig,
    registry: &Registry,
    codec: &SlugCodec,
) -> pages::PageCheck {
    let existing = pages::scan_pages(&config.pages_path(tmp)).unwrap();
    pages::check_pages(registry, codec, &config.static_pages, &existing)
}

#[test]
fn builtin_slugs_are_unique() {
    let registry = Registry::builtin().unwrap();
    let audit = SlugCodec::builtin().audit(&registry);
    assert_eq!(audit.checked, registry.edge_count());
    assert!(audit.collisions.is_empty(), "{:?}", audit.collisions);
}

#[test]
fn builtin_routes_cover_every_edge_and_static_page() {
    let config = SiteConfig::default();
    let registry = Registry::builtin().unwrap();
    let routes = routes::generate_routes(
        &registry,
        &SlugCodec::builtin(),
        &config.static_pages,
        &options(&config),
    )
    .unwrap();

    assert_eq!(
        routes.len(),
        registry.edge_count() + config.static_pages.len()
    );
    let urls: Vec<&str> = routes.iter().map(|r| r.url.as_str()).collect();
    assert!(urls.contains(&"https://convert.example/"));
    assert!(urls.contains(&"https://convert.example/heic-to-jpg"));
    assert!(urls.contains(&"https://convert.example/merge-pdf"));
    assert!(!urls.contains(&"https://convert.example/pdf-to-merged"));
}

#[test]
fn scaffolded_site_passes_check() {
    let (tmp, config, registry, codec) = scaffolded_site();
    let result = check(tmp.path(), &config, &registry, &codec);

    assert!(
        result.is_clean(),
        "orphans {:?}, missing {:?}",
        result.orphans,
        result.missing
    );
    assert_eq!(result.conversions.len(), registry.edge_count());
}

#[test]
fn every_conversion_route_has_a_page() {
    let (tmp, config, registry, codec) = scaffolded_site();
    let routes =
        routes::generate_routes(&registry, &codec, &config.static_pages, &options(&config))
            .unwrap();
    let pages_dir = config.pages_path(tmp.path());

    for route in &routes {
        if let RouteOrigin::Conversion { source, target } = &route.origin {
            let slug = codec.encode(source.as_str(), target.as_str());
            assert!(route.url.ends_with(&format!("/{}", slug)));
            assert!(
                scaffold::page_path(&pages_dir, &slug).is_file(),
                "no page for {}",
                route.url
            );
        }
    }
}

#[test]
fn rescaffold_leaves_edited_pages_alone() {
    let (tmp, config, registry, codec) = scaffolded_site();
    let pages_dir = config.pages_path(tmp.path());
    let edited = scaffold::page_path(&pages_dir, &Slug::new("heic-to-jpg"));
    fs::write(&edited, "hand-written").unwrap();

    let report = scaffold::scaffold(&registry, &codec, &config, &pages_dir).unwrap();
    assert!(report.created.is_empty());
    assert_eq!(report.skipped.len(), registry.edge_count());
    assert_eq!(fs::read_to_string(&edited).unwrap(), "hand-written");
}

#[test]
fn check_reports_drift() {
    let (tmp, config, registry, codec) = scaffolded_site();
    let pages_dir = config.pages_path(tmp.path());

    fs::remove_dir_all(pages_dir.join("merge-pdf")).unwrap();
    for stray in ["pdf-to-merged", "bmp-to-mp3"] {
        fs::create_dir_all(pages_dir.join(stray)).unwrap();
        fs::write(pages_dir.join(stray).join(PAGE_FILENAME), "").unwrap();
    }
    fs::create_dir_all(pages_dir.join("about")).unwrap();
    fs::write(pages_dir.join("about").join(PAGE_FILENAME), "").unwrap();

    let result = check(tmp.path(), &config, &registry, &codec);
    assert_eq!(result.missing, vec![Slug::new("merge-pdf")]);
    assert_eq!(result.statics, ["about"]);

    let reasons: Vec<(&str, &OrphanReason)> = result
        .orphans
        .iter()
        .map(|o| (o.slug.as_str(), &o.reason))
        .collect();
    assert_eq!(
        reasons,
        vec![
            (
                "bmp-to-mp3",
                &OrphanReason::Unregistered {
                    source: "bmp".into(),
                    target: "mp3".into(),
                }
            ),
            (
                "pdf-to-merged",
                &OrphanReason::NonCanonical {
                    canonical: Slug::new("merge-pdf"),
                }
            ),
        ]
    );
}

#[test]
fn site_config_drives_sitemap() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(config::CONFIG_FILENAME),
        r#"
base_url = "https://files.test"

[sitemap]
last_modified = "2026-01-15"

[sitemap.conversions]
change_frequency = "monthly"
priority = 0.6

[[static_pages]]
slug = ""
priority = 1.0
"#,
    )
    .unwrap();

    let config = config::load_config(tmp.path()).unwrap();
    let registry = Registry::builtin().unwrap();
    let routes = routes::generate_routes(
        &registry,
        &SlugCodec::builtin(),
        &config.static_pages,
        &options(&config),
    )
    .unwrap();
    assert_eq!(routes.len(), registry.edge_count() + 1);

    let xml = routes::render_sitemap(&routes);
    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(xml.contains(
        "<url><loc>https://files.test/merge-pdf</loc><lastmod>2026-01-15</lastmod>\
         <changefreq>monthly</changefreq><priority>0.6</priority></url>"
    ));
    assert!(xml.contains("<loc>https://files.test/</loc>"));
    assert!(!xml.contains("convert.example"));
}
