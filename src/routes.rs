//! Route set generation and sitemap rendering.
//!
//! Walks the registry once and produces one [`RouteEntry`] per conversion
//! edge plus one per static page. The result feeds `sitemap.xml` and the page
//! checks, so every producer sees the same URL list.
//!
//! ## Collisions
//!
//! Two producers mapping to the same URL is a data error: a conversion slug
//! clashing with another conversion slug or with a static page. Generation
//! fails with [`RouteError::Collision`] naming both producers instead of
//! dropping one of them.
//!
//! ## Ordering
//!
//! Entries are sorted by URL so repeated builds emit byte-identical sitemaps.

use crate::catalog::FormatToken;
use crate::registry::Registry;
use crate::slug::SlugCodec;
use crate::types::{ChangeFrequency, PageSettings, StaticPage};
use chrono::NaiveDate;
use maud::{Markup, PreEscaped, html};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

const SITEMAP_XMLNS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Error, Debug, PartialEq)]
pub enum RouteError {
    #[error("URL {url} is produced by both {first} and {second}")]
    Collision {
        url: String,
        first: RouteOrigin,
        second: RouteOrigin,
    },
}

/// What produced a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RouteOrigin {
    Conversion {
        source: FormatToken,
        target: FormatToken,
    },
    Static {
        slug: String,
    },
}

impl fmt::Display for RouteOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteOrigin::Conversion { source, target } => {
                write!(f, "conversion {source} → {target}")
            }
            RouteOrigin::Static { slug } if slug.is_empty() => f.write_str("the home page"),
            RouteOrigin::Static { slug } => write!(f, "static page '{slug}'"),
        }
    }
}

/// One sitemap entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteEntry {
    pub url: String,
    pub last_modified: NaiveDate,
    pub change_frequency: ChangeFrequency,
    pub priority: f64,
    pub origin: RouteOrigin,
}

/// Site-wide inputs to route generation.
#[derive(Debug, Clone)]
pub struct RouteOptions {
    /// Scheme and host without a trailing slash. Empty yields root-relative URLs.
    pub base_url: String,
    pub last_modified: NaiveDate,
    pub conversions: PageSettings,
}

/// `{base_url}/{slug}`.
pub fn route_url(base_url: &str, slug: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), slug)
}

/// Priority as written to the sitemap: two decimals, one trailing zero dropped
/// (`0.8`, `0.85`, `1.0`).
pub fn format_priority(priority: f64) -> String {
    let text = format!("{priority:.2}");
    match text.strip_suffix('0') {
        Some(trimmed) => trimmed.to_string(),
        None => text,
    }
}

/// Produce every site route, sorted by URL.
pub fn generate_routes(
    registry: &Registry,
    codec: &SlugCodec,
    static_pages: &[StaticPage],
    options: &RouteOptions,
) -> Result<Vec<RouteEntry>, RouteError> {
    let mut routes: BTreeMap<String, RouteEntry> = BTreeMap::new();

    let conversions = registry.edges().map(|edge| {
        let slug = codec.encode_edge(&edge);
        let origin = RouteOrigin::Conversion {
            source: edge.source,
            target: edge.target,
        };
        (slug.into_string(), options.conversions.clone(), origin)
    });
    let statics = static_pages.iter().map(|page| {
        let origin = RouteOrigin::Static {
            slug: page.slug.clone(),
        };
        (page.slug.to_lowercase(), page.settings(), origin)
    });

    for (slug, settings, origin) in conversions.chain(statics) {
        let url = route_url(&options.base_url, &slug);
        if let Some(existing) = routes.get(&url) {
            return Err(RouteError::Collision {
                url,
                first: existing.origin.clone(),
                second: origin,
            });
        }
        routes.insert(
            url.clone(),
            RouteEntry {
                url,
                last_modified: options.last_modified,
                change_frequency: settings.change_frequency,
                priority: settings.priority,
                origin,
            },
        );
    }

    tracing::debug!(
        routes = routes.len(),
        edges = registry.edge_count(),
        "generated route set"
    );
    Ok(routes.into_values().collect())
}

/// Render routes as a sitemaps.org `urlset` document.
pub fn render_sitemap(routes: &[RouteEntry]) -> String {
    let markup: Markup = html! {
        (PreEscaped(r#"<?xml version="1.0" encoding="UTF-8"?>"#))
        urlset xmlns=(SITEMAP_XMLNS) {
            @for route in routes {
                url {
                    loc { (route.url) }
                    lastmod { (route.last_modified.format("%Y-%m-%d").to_string()) }
                    changefreq { (route.change_frequency.as_str()) }
                    priority { (format_priority(route.priority)) }
                }
            }
        }
    };
    markup.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;
    use crate::slug::SlugOverride;
    use crate::test_helpers::*;

    fn options(base_url: &str) -> RouteOptions {
        RouteOptions {
            base_url: base_url.to_string(),
            last_modified: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            conversions: PageSettings::default(),
        }
    }

    #[test]
    fn two_edges_plus_static_page() {
        let registry = registry_from(&[
            (Category::Image, "jpg", &["png"]),
            (Category::Image, "png", &["jpg"]),
        ]);
        let routes = generate_routes(
            &registry,
            &SlugCodec::builtin(),
            &[StaticPage::new("about")],
            &options(""),
        )
        .unwrap();
        assert_eq!(urls(&routes), ["/about", "/jpg-to-png", "/png-to-jpg"]);
    }

    #[test]
    fn base_url_is_prefixed() {
        let registry = registry_from(&[(Category::Image, "heic", &["jpg"])]);
        let routes = generate_routes(
            &registry,
            &SlugCodec::builtin(),
            &[],
            &options("https://convert.example"),
        )
        .unwrap();
        assert_eq!(urls(&routes), ["https://convert.example/heic-to-jpg"]);
    }

    #[test]
    fn trailing_slash_on_base_url_is_ignored() {
        assert_eq!(route_url("https://a.example/", "about"), "https://a.example/about");
    }

    #[test]
    fn empty_slug_is_site_root() {
        assert_eq!(route_url("https://a.example", ""), "https://a.example/");
    }

    #[test]
    fn empty_registry_yields_static_routes_only() {
        let registry = empty_registry();
        let routes = generate_routes(
            &registry,
            &SlugCodec::builtin(),
            &[StaticPage::new(""), StaticPage::new("about")],
            &options(""),
        )
        .unwrap();
        assert_eq!(urls(&routes), ["/", "/about"]);
    }

    #[test]
    fn empty_everything_is_not_an_error() {
        let routes =
            generate_routes(&empty_registry(), &SlugCodec::builtin(), &[], &options("")).unwrap();
        assert!(routes.is_empty());
    }

    #[test]
    fn override_slugs_are_used() {
        let registry = registry_from(&[(Category::Pdf, "pdf", &["merged", "docx"])]);
        let routes =
            generate_routes(&registry, &SlugCodec::builtin(), &[], &options("")).unwrap();
        assert_eq!(urls(&routes), ["/merge-pdf", "/pdf-to-docx"]);
    }

    #[test]
    fn one_route_per_builtin_edge() {
        let registry = builtin_registry();
        let routes =
            generate_routes(&registry, &SlugCodec::builtin(), &[], &options("")).unwrap();
        assert_eq!(routes.len(), registry.edge_count());
        for edge in registry.edges() {
            let url = route_url("", SlugCodec::builtin().encode_edge(&edge).as_str());
            assert!(routes.iter().any(|r| r.url == url), "missing {url}");
        }
    }

    #[test]
    fn conversion_collision_is_an_error() {
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
        let err = generate_routes(&registry, &codec, &[], &options("")).unwrap_err();
        let RouteError::Collision { url, first, second } = err;
        assert_eq!(url, "/jpg-to-png");
        assert_eq!(
            first,
            RouteOrigin::Conversion {
                source: "jpg".into(),
                target: "png".into()
            }
        );
        assert_eq!(
            second,
            RouteOrigin::Conversion {
                source: "png".into(),
                target: "jpg".into()
            }
        );
    }

    #[test]
    fn static_page_colliding_with_conversion_is_an_error() {
        let registry = registry_from(&[(Category::Pdf, "pdf", &["merged"])]);
        let err = generate_routes(
            &registry,
            &SlugCodec::builtin(),
            &[StaticPage::new("merge-pdf")],
            &options(""),
        )
        .unwrap_err();
        assert!(err.to_string().contains("static page 'merge-pdf'"));
        assert!(err.to_string().contains("conversion pdf → merged"));
    }

    #[test]
    fn duplicate_static_page_is_an_error() {
        let err = generate_routes(
            &empty_registry(),
            &SlugCodec::builtin(),
            &[StaticPage::new("about"), StaticPage::new("About")],
            &options(""),
        )
        .unwrap_err();
        assert!(matches!(err, RouteError::Collision { .. }));
    }

    #[test]
    fn entries_carry_page_settings() {
        let registry = registry_from(&[(Category::Image, "jpg", &["png"])]);
        let routes = generate_routes(
            &registry,
            &SlugCodec::builtin(),
            &[StaticPage::with("", ChangeFrequency::Daily, 1.0)],
            &options(""),
        )
        .unwrap();
        assert_eq!(routes[0].url, "/");
        assert_eq!(routes[0].change_frequency, ChangeFrequency::Daily);
        assert_eq!(routes[0].priority, 1.0);
        assert_eq!(routes[1].change_frequency, ChangeFrequency::Weekly);
        assert_eq!(routes[1].priority, 0.8);
    }

    #[test]
    fn output_is_deterministic() {
        let registry = builtin_registry();
        let codec = SlugCodec::builtin();
        let a = generate_routes(&registry, &codec, &[], &options("")).unwrap();
        let b = generate_routes(&registry, &codec, &[], &options("")).unwrap();
        assert_eq!(a, b);
        assert!(a.windows(2).all(|w| w[0].url < w[1].url));
    }

    #[test]
    fn sitemap_contains_entries() {
        let registry = registry_from(&[(Category::Image, "jpg", &["png"])]);
        let routes = generate_routes(
            &registry,
            &SlugCodec::builtin(),
            &[],
            &options("https://convert.example"),
        )
        .unwrap();
        let xml = render_sitemap(&routes);
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#));
        assert!(xml.contains("<loc>https://convert.example/jpg-to-png</loc>"));
        assert!(xml.contains("<lastmod>2026-10-16</lastmod>"));
        assert!(xml.contains("<changefreq>weekly</changefreq>"));
        assert!(xml.contains("<priority>0.8</priority>"));
        assert!(xml.ends_with("</urlset>"));
    }

    #[test]
    fn priority_keeps_two_decimals() {
        assert_eq!(format_priority(0.8), "0.8");
        assert_eq!(format_priority(0.85), "0.85");
        assert_eq!(format_priority(1.0), "1.0");
        assert_eq!(format_priority(0.0), "0.0");
        assert_eq!(format_priority(0.05), "0.05");
    }

    #[test]
    fn sitemap_does_not_round_priority() {
        let registry = registry_from(&[(Category::Image, "jpg", &["png"])]);
        let mut options = options("");
        options.conversions.priority = 0.85;
        let routes =
            generate_routes(&registry, &SlugCodec::builtin(), &[], &options).unwrap();
        let xml = render_sitemap(&routes);
        assert!(xml.contains("<priority>0.85</priority>"), "{xml}");
    }

    #[test]
    fn sitemap_escapes_urls() {
        let routes = generate_routes(
            &empty_registry(),
            &SlugCodec::builtin(),
            &[StaticPage::new("a&b")],
            &options(""),
        )
        .unwrap();
        assert!(render_sitemap(&routes).contains("<loc>/a&amp;b</loc>"));
    }
}
