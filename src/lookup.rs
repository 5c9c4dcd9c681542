//! Answer "what is this?" for a format token or a page slug.
//!
//! Backs the `lookup` command. A query is first matched against the encoded
//! slug of every registered edge (so override slugs resolve), then decoded
//! with the default rule, and finally treated as a format token.

use crate::catalog::{Category, FormatToken};
use crate::registry::Registry;
use crate::slug::{Slug, SlugCodec};

/// One target of a format, with the slug of its page.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetLink {
    pub target: FormatToken,
    pub slug: Slug,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// The query names a conversion pair.
    Conversion {
        source: FormatToken,
        target: FormatToken,
        category: Category,
        title: String,
        /// The published slug, which may differ from the query.
        slug: Slug,
        supported: bool,
    },
    /// The query names a format.
    Format {
        token: FormatToken,
        category: Category,
        display_name: String,
        in_catalog: bool,
        targets: Vec<TargetLink>,
    },
}

pub fn lookup(registry: &Registry, codec: &SlugCodec, query: &str) -> Lookup {
    let catalog = registry.catalog();
    let wanted = Slug::new(query.trim());

    let pair = registry
        .edges()
        .find(|edge| codec.encode_edge(edge) == wanted)
        .map(|edge| (edge.source, edge.target))
        .or_else(|| codec.decode(wanted.as_str()));

    if let Some((source, target)) = pair {
        let category = registry
            .category_of(source.as_str())
            .unwrap_or_else(|| catalog.category(source.as_str()));
        return Lookup::Conversion {
            title: codec.title(catalog, source.as_str(), target.as_str()),
            slug: codec.encode(source.as_str(), target.as_str()),
            supported: registry.is_supported(source.as_str(), target.as_str()),
            category,
            source,
            target,
        };
    }

    let token = FormatToken::new(query);
    let targets = registry
        .target_formats(token.as_str())
        .iter()
        .map(|t| TargetLink {
            target: t.clone(),
            slug: codec.encode(token.as_str(), t.as_str()),
        })
        .collect();
    Lookup::Format {
        category: registry
            .category_of(token.as_str())
            .unwrap_or_else(|| catalog.category(token.as_str())),
        display_name: catalog.display_name(token.as_str()),
        in_catalog: catalog.contains(token.as_str()),
        targets,
        token,
    }
}
