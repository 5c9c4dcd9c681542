//! Conversion registry: which source format converts to which targets.
//!
//! The registry is a directed graph declared once from a literal table. Each
//! source format is declared under exactly one [`Category`] together with the
//! ordered list of targets it converts to in a single step. The declaration
//! order of targets is the order the converter UI lists them in.
//!
//! ## No Inference
//!
//! Edges are never derived. `jpg → png` being declared says nothing about
//! `png → jpg`, and `a → b`, `b → c` says nothing about `a → c`. Camera RAW
//! formats, for instance, only convert outward.
//!
//! ## Boundary Validation
//!
//! [`RegistryBuilder::declare`] checks every token against the
//! [`FormatCatalog`]: sources must be catalog formats declared under their
//! catalog category with at least one target, and targets must be catalog
//! formats or pseudo-targets (`compressed`, `merged`, ...). Lookups on a built
//! registry never fail; unknown sources simply have no targets.

use crate::catalog::{CatalogError, Category, FormatCatalog, FormatToken};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RegistryError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Source format '{0}' is not in the format catalog")]
    UnknownSource(FormatToken),
    #[error("Target '{target}' of '{format}' is neither a catalog format nor a pseudo-target")]
    UnknownTarget {
        format: FormatToken,
        target: FormatToken,
    },
    #[error("Source format '{0}' is declared more than once")]
    DuplicateSource(FormatToken),
    #[error("Target '{target}' is listed twice for '{format}'")]
    DuplicateTarget {
        format: FormatToken,
        target: FormatToken,
    },
    #[error("'{0}' cannot convert to itself")]
    SelfConversion(FormatToken),
    #[error("Source format '{0}' is declared without targets")]
    NoTargets(FormatToken),
    #[error("'{format}' is declared under {declared} but the catalog puts it under {catalog}")]
    CategoryMismatch {
        format: FormatToken,
        declared: Category,
        catalog: Category,
    },
}

/// A declared, directed conversion capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConversionEdge {
    pub source: FormatToken,
    pub target: FormatToken,
    pub category: Category,
}

/// All targets declared for one source.
#[derive(Debug, Clone)]
struct SourceEntry {
    source: FormatToken,
    category: Category,
    targets: Vec<FormatToken>,
}

/// Immutable conversion graph plus the catalog it was validated against.
#[derive(Debug, Clone)]
pub struct Registry {
    catalog: FormatCatalog,
    entries: Vec<SourceEntry>,
    index: HashMap<FormatToken, usize>,
}

impl Registry {
    /// The registry shipped with the site.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut builder = RegistryBuilder::new(FormatCatalog::builtin()?);
        for &(category, sources) in CONVERSIONS {
            for &(source, targets) in sources {
                builder.declare(category, source, targets)?;
            }
        }
        Ok(builder.build())
    }

    /// A registry with no edges.
    pub fn empty(catalog: FormatCatalog) -> Self {
        RegistryBuilder::new(catalog).build()
    }

    pub fn catalog(&self) -> &FormatCatalog {
        &self.catalog
    }

    /// Declared targets for `source`, in declaration order. Empty if unknown.
    pub fn target_formats(&self, source: &str) -> &[FormatToken] {
        self.entry(source)
            .map(|e| e.targets.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `source → target` is declared. Case-insensitive on both sides.
    pub fn is_supported(&self, source: &str, target: &str) -> bool {
        let target = FormatToken::new(target);
        self.target_formats(source).contains(&target)
    }

    /// Every token that appears as a source.
    pub fn all_source_formats(&self) -> BTreeSet<FormatToken> {
        self.entries.iter().map(|e| e.source.clone()).collect()
    }

    /// Sources declared under `category`, in declaration order.
    pub fn formats_by_category(&self, category: Category) -> Vec<FormatToken> {
        self.entries
            .iter()
            .filter(|e| e.category == category)
            .map(|e| e.source.clone())
            .collect()
    }

    /// Category a source was declared under.
    pub fn category_of(&self, source: &str) -> Option<Category> {
        self.entry(source).map(|e| e.category)
    }

    /// All edges, grouped by source in declaration order.
    pub fn edges(&self) -> impl Iterator<Item = ConversionEdge> + '_ {
        self.entries.iter().flat_map(|e| {
            e.targets.iter().map(move |t| ConversionEdge {
                source: e.source.clone(),
                target: t.clone(),
                category: e.category,
            })
        })
    }

    pub fn edge_count(&self) -> usize {
        self.entries.iter().map(|e| e.targets.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count() == 0
    }

    fn entry(&self, source: &str) -> Option<&SourceEntry> {
        let key = FormatToken::new(source);
        self.index.get(&key).map(|&i| &self.entries[i])
    }
}

/// Validating builder for [`Registry`].
#[derive(Debug)]
pub struct RegistryBuilder {
    catalog: FormatCatalog,
    entries: Vec<SourceEntry>,
    index: HashMap<FormatToken, usize>,
}

impl RegistryBuilder {
    pub fn new(catalog: FormatCatalog) -> Self {
        Self {
            catalog,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Declare the full target list of one source.
    pub fn declare(
        &mut self,
        category: Category,
        source: &str,
        targets: &[&str],
    ) -> Result<&mut Self, RegistryError> {
        let source = FormatToken::new(source);
        if !self.catalog.contains(source.as_str()) {
            return Err(RegistryError::UnknownSource(source));
        }
        if self.index.contains_key(&source) {
            return Err(RegistryError::DuplicateSource(source));
        }
        let catalog_category = self.catalog.category(source.as_str());
        if catalog_category != category {
            return Err(RegistryError::CategoryMismatch {
                format: source,
                declared: category,
                catalog: catalog_category,
            });
        }
        if targets.is_empty() {
            return Err(RegistryError::NoTargets(source));
        }

        let mut declared: Vec<FormatToken> = Vec::with_capacity(targets.len());
        for raw in targets {
            let target = FormatToken::new(raw);
            if target == source {
                return Err(RegistryError::SelfConversion(source));
            }
            if !self.catalog.is_known_target(target.as_str()) {
                return Err(RegistryError::UnknownTarget {
                    format: source,
                    target,
                });
            }
            if declared.contains(&target) {
                return Err(RegistryError::DuplicateTarget {
                    format: source,
                    target,
                });
            }
            declared.push(target);
        }

        self.index.insert(source.clone(), self.entries.len());
        self.entries.push(SourceEntry {
            source,
            category,
            targets: declared,
        });
        Ok(self)
    }

    pub fn build(self) -> Registry {
        Registry {
            catalog: self.catalog,
            entries: self.entries,
            index: self.index,
        }
    }
}

type SourceTable = &'static [(&'static str, &'static [&'static str])];

/// The site's conversion table, grouped by owning category.
pub const CONVERSIONS: &[(Category, SourceTable)] = &[
    (
        Category::Image,
        &[
            (
                "jpg",
                &["png", "webp", "avif", "gif", "bmp", "tiff", "ico", "svg", "pdf", "compressed"],
            ),
            ("jpeg", &["png", "webp", "avif", "gif", "bmp", "tiff", "pdf"]),
            (
                "png",
                &["jpg", "webp", "avif", "gif", "bmp", "tiff", "ico", "svg", "pdf", "compressed"],
            ),
            ("webp", &["jpg", "png", "gif", "avif", "bmp", "tiff", "pdf"]),
            ("avif", &["jpg", "png", "webp", "gif"]),
            ("gif", &["jpg", "png", "webp", "mp4"]),
            ("bmp", &["jpg", "png", "webp", "tiff"]),
            ("tiff", &["jpg", "png", "webp", "pdf"]),
            ("ico", &["png", "jpg"]),
            ("svg", &["png", "jpg", "webp", "pdf"]),
            ("heic", &["jpg", "png", "webp", "pdf"]),
            ("heif", &["jpg", "png"]),
            ("raw", &["jpg", "png", "tiff"]),
            ("cr2", &["jpg", "png", "tiff"]),
            ("nef", &["jpg", "png", "tiff"]),
            ("arw", &["jpg", "png"]),
            ("dng", &["jpg", "png", "tiff"]),
            ("psd", &["jpg", "png", "webp", "pdf"]),
            ("tga", &["png", "jpg"]),
            ("jfif", &["jpg", "png"]),
        ],
    ),
    (
        Category::Document,
        &[
            ("docx", &["pdf", "odt", "rtf", "txt", "html", "epub"]),
            ("doc", &["docx", "pdf", "odt", "txt"]),
            ("odt", &["docx", "pdf", "doc"]),
            ("rtf", &["docx", "pdf", "txt"]),
            ("txt", &["pdf", "docx"]),
            ("html", &["pdf", "docx", "md"]),
            ("md", &["html", "pdf", "docx"]),
            ("epub", &["pdf", "mobi", "docx"]),
            ("mobi", &["epub", "pdf"]),
            ("xlsx", &["csv", "pdf", "xls"]),
            ("xls", &["xlsx", "csv", "pdf"]),
            ("csv", &["xlsx", "xls", "pdf"]),
            ("pptx", &["pdf", "ppt"]),
            ("ppt", &["pptx", "pdf"]),
        ],
    ),
    (
        Category::Audio,
        &[
            ("mp3", &["wav", "flac", "aac", "ogg", "m4a", "opus"]),
            ("wav", &["mp3", "flac", "aac", "ogg", "m4a"]),
            ("flac", &["mp3", "wav", "aac", "ogg"]),
            ("aac", &["mp3", "wav", "m4a"]),
            ("ogg", &["mp3", "wav", "flac"]),
            ("m4a", &["mp3", "wav", "aac", "flac"]),
            ("wma", &["mp3", "wav"]),
            ("aiff", &["mp3", "wav", "flac"]),
            ("opus", &["mp3", "wav", "ogg"]),
        ],
    ),
    (
        Category::Video,
        &[
            ("mp4", &["mov", "avi", "mkv", "webm", "gif", "mp3", "wav"]),
            ("mov", &["mp4", "avi", "webm", "gif", "mp3"]),
            ("avi", &["mp4", "mov", "mkv", "webm"]),
            ("mkv", &["mp4", "avi", "webm", "mov"]),
            ("webm", &["mp4", "mov", "gif", "mp3"]),
            ("flv", &["mp4", "avi"]),
            ("wmv", &["mp4", "avi"]),
            ("m4v", &["mp4", "mov"]),
            ("mpeg", &["mp4", "avi"]),
            ("3gp", &["mp4"]),
        ],
    ),
    (
        Category::Pdf,
        &[(
            "pdf",
            &[
                "jpg", "png", "docx", "txt", "html", "epub", "pptx", "excel", "compressed",
                "merged", "split",
            ],
        )],
    ),
    (
        Category::Font,
        &[
            ("ttf", &["otf", "woff", "woff2", "eot"]),
            ("otf", &["ttf", "woff", "woff2"]),
            ("woff", &["ttf", "otf", "woff2"]),
            ("woff2", &["ttf", "otf", "woff"]),
            ("eot", &["ttf", "woff"]),
        ],
    ),
    (
        Category::Ai3d,
        &[
            ("ai", &["svg", "pdf", "png", "jpg", "eps"]),
            ("eps", &["svg", "pdf", "png", "jpg"]),
            ("stl", &["obj", "glb", "ply"]),
            ("obj", &["stl", "glb", "gltf", "fbx"]),
            ("fbx", &["obj", "glb", "gltf"]),
            ("glb", &["gltf", "obj", "stl"]),
            ("gltf", &["glb", "obj"]),
            ("ply", &["stl", "obj"]),
        ],
    ),
];
