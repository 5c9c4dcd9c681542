//! # Conversion Routes
//!
//! The conversion capability registry behind a file-conversion website, and
//! the tooling that keeps the site's URLs, sitemap, and page files in step
//! with it.
//!
//! Every conversion the site offers (`heic → jpg`, `pdf → docx`,
//! `pdf → merged`) has exactly one public page at `/{slug}`. The registry
//! decides which pairs exist; the slug codec decides what their URLs are; the
//! route generator turns both into the sitemap. Scaffolding and page checks
//! read the same data, so a conversion can't be offered without a page, and a
//! page can't be published for a conversion that isn't offered.
//!
//! ```text
//! catalog  ──▶ registry ──▶ slug codec ──▶ routes   ──▶ sitemap.xml
//!                                     ├──▶ scaffold ──▶ pages/<slug>/index.html
//!                                     └──▶ pages    ◀── pages/ (check)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Format tokens, categories, display names, pseudo-targets |
//! | [`registry`] | Declared conversion edges, grouped by source format; lookup queries |
//! | [`slug`] | Pair ⇄ slug codec with a one-directional override table; collision audit |
//! | [`routes`] | Sitemap route list from the registry plus static pages; XML rendering |
//! | [`scaffold`] | Page plans per edge, Maud HTML rendering, parallel create-new writes |
//! | [`pages`] | Scans the page directory and checks it against the registry |
//! | [`lookup`] | Resolves a slug or format token for the `lookup` command |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`types`] | Sitemap settings shared by config and routes (`StaticPage`, `ChangeFrequency`) |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## Data In, Not Globals
//!
//! The catalog and conversion tables are plain `const` slices. They are turned
//! into a [`registry::Registry`] by a validating builder that returns
//! `Result`, and every consumer takes the registry by reference. Tests build
//! small registries of their own instead of patching shared state.
//!
//! ## Slugs Are Permanent
//!
//! A slug is a public URL. Once published it must not change, and two edges
//! must never share one. Collisions are hard errors for every command that
//! writes or checks anything; slugs that simply fail to decode back to their
//! edge are reported as warnings.
//!
//! ## Decode Ignores Overrides
//!
//! Override slugs (`merge-pdf`) don't follow the `{source}-to-{target}` shape,
//! and the decoder doesn't try to reverse them. Anything that needs to map a
//! slug back to its edge matches against the encoded slug set first.
//!
//! ## Maud for Pages and Sitemap
//!
//! Page skeletons and the sitemap XML are both rendered with Maud, so every
//! interpolated token and title is escaped.

pub mod catalog;
pub mod config;
pub mod lookup;
pub mod output;
pub mod pages;
pub mod registry;
pub mod routes;
pub mod scaffold;
pub mod slug;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
