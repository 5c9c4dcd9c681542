//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Each entity leads with its public identity (the URL or slug a visitor
//! sees), with the conversion pair or settings shown as indented context
//! lines underneath.
//!
//! # Output Format
//!
//! ## Routes
//!
//! ```text
//! Routes
//! 001 /
//!     the home page (daily, 1.0)
//! 002 /jpg-to-png
//!     conversion jpg → png (weekly, 0.8)
//!
//! 2 routes (1 conversion, 1 static)
//! ```
//!
//! ## Check
//!
//! ```text
//! Orphans
//!     pdf-to-compressed
//!         Registered as: compress-pdf
//!     bmp-to-mp3
//!         Not registered: bmp → mp3
//!
//! Missing
//!     compress-pdf
//!
//! 210 conversion pages, 8 static pages, 2 orphans, 1 missing
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure.

use crate::lookup::Lookup;
use crate::pages::{OrphanReason, PageCheck};
use crate::routes::{RouteEntry, RouteOrigin, format_priority};
use crate::scaffold::ScaffoldReport;
use crate::slug::SlugAudit;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// `1 page`, `2 pages`.
fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

// ============================================================================
// Routes
// ============================================================================

/// Format the route list produced for the sitemap.
pub fn format_routes(routes: &[RouteEntry]) -> Vec<String> {
    let mut lines = vec!["Routes".to_string()];
    let mut conversions = 0;

    for (i, route) in routes.iter().enumerate() {
        if matches!(route.origin, RouteOrigin::Conversion { .. }) {
            conversions += 1;
        }
        lines.push(format!("{} {}", format_index(i + 1), route.url));
        lines.push(format!(
            "    {} ({}, {})",
            route.origin,
            route.change_frequency,
            format_priority(route.priority)
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "{} ({}, {} static)",
        plural(routes.len(), "route"),
        plural(conversions, "conversion"),
        routes.len() - conversions
    ));
    lines
}

pub fn print_routes(routes: &[RouteEntry]) {
    for line in format_routes(routes) {
        println!("{}", line);
    }
}

// ============================================================================
// Slug audit
// ============================================================================

/// Format collisions and round-trip warnings from a slug audit.
///
/// A clean audit produces a single summary line.
pub fn format_audit(audit: &SlugAudit) -> Vec<String> {
    let mut lines = Vec::new();

    if !audit.collisions.is_empty() {
        lines.push("Collisions".to_string());
        for collision in &audit.collisions {
            lines.push(format!("    {}", collision));
        }
        lines.push(String::new());
    }

    if !audit.non_round_trip.is_empty() {
        lines.push("Slugs that do not decode back".to_string());
        for failure in &audit.non_round_trip {
            lines.push(format!(
                "    {} ({} → {})",
                failure.slug, failure.edge.source, failure.edge.target
            ));
            let decoded = match &failure.decoded {
                Some((source, target)) => format!("{} → {}", source, target),
                None => "nothing".to_string(),
            };
            lines.push(format!("        Decodes to: {}", decoded));
        }
        lines.push(String::new());
    }

    lines.push(format!(
        "Checked {}: {}, {}",
        plural(audit.checked, "slug"),
        plural(audit.collisions.len(), "collision"),
        plural(audit.non_round_trip.len(), "warning")
    ));
    lines
}

pub fn print_audit(audit: &SlugAudit) {
    for line in format_audit(audit) {
        println!("{}", line);
    }
}

// ============================================================================
// Page check
// ============================================================================

/// Format the result of comparing the page directory with the registry.
pub fn format_page_check(check: &PageCheck) -> Vec<String> {
    let mut lines = Vec::new();

    if !check.orphans.is_empty() {
        lines.push("Orphans".to_string());
        for orphan in &check.orphans {
            lines.push(format!("    {}", orphan.slug));
            let detail = match &orphan.reason {
                OrphanReason::Undecodable => "Not a conversion slug".to_string(),
                OrphanReason::Unregistered { source, target } => {
                    format!("Not registered: {} → {}", source, target)
                }
                OrphanReason::NonCanonical { canonical } => {
                    format!("Registered as: {}", canonical)
                }
            };
            lines.push(format!("        {}", detail));
        }
        lines.push(String::new());
    }

    if !check.missing.is_empty() {
        lines.push("Missing".to_string());
        for slug in &check.missing {
            lines.push(format!("    {}", slug));
        }
        lines.push(String::new());
    }

    lines.push(format!(
        "{}, {}, {}, {} missing",
        plural(check.conversions.len(), "conversion page"),
        plural(check.statics.len(), "static page"),
        plural(check.orphans.len(), "orphan"),
        check.missing.len()
    ));
    lines
}

pub fn print_page_check(check: &PageCheck) {
    for line in format_page_check(check) {
        println!("{}", line);
    }
}

// ============================================================================
// Scaffold
// ============================================================================

/// Format the scaffold report: each created page, then a summary.
///
/// Skipped pages are only counted; on a mature site they are the majority.
pub fn format_scaffold_report(report: &ScaffoldReport, pages_dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    let mut created: Vec<_> = report.created.iter().collect();
    created.sort();

    if !created.is_empty() {
        lines.push(format!("Created in {}", pages_dir.display()));
        for slug in created {
            lines.push(format!("    {}/", slug));
        }
        lines.push(String::new());
    }

    lines.push(format!(
        "Scaffolded {}: {} created, {} already present",
        plural(report.total(), "page"),
        report.created.len(),
        report.skipped.len()
    ));
    lines
}

pub fn print_scaffold_report(report: &ScaffoldReport, pages_dir: &Path) {
    for line in format_scaffold_report(report, pages_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Lookup
// ============================================================================

pub fn format_lookup(lookup: &Lookup) -> Vec<String> {
    match lookup {
        Lookup::Conversion {
            source,
            target,
            category,
            title,
            slug,
            supported,
        } => {
            let status = if *supported {
                "supported"
            } else {
                "not supported"
            };
            vec![
                title.clone(),
                format!("    Pair: {} → {} ({})", source, target, status),
                format!("    Category: {}", category),
                format!("    Slug: {}", slug),
            ]
        }
        Lookup::Format {
            token,
            category,
            display_name,
            in_catalog,
            targets,
        } => {
            let mut lines = vec![format!("{} ({})", display_name, token)];
            let known = if *in_catalog { "" } else { " (not in catalog)" };
            lines.push(format!("    Category: {}{}", category, known));
            if targets.is_empty() {
                lines.push("    No conversions".to_string());
            } else {
                lines.push(format!("    Converts to {}:", plural(targets.len(), "format")));
                for link in targets {
                    lines.push(format!("        {} → /{}", link.target, link.slug));
                }
            }
            lines
        }
    }
}

pub fn print_lookup(lookup: &Lookup) {
    for line in format_lookup(lookup) {
        println!("{}", line);
    }
}
