//! Format catalog: every file format the site knows about.
//!
//! Each format is identified by a [`FormatToken`] (a lower-cased string such
//! as `jpg` or `woff2`), belongs to exactly one [`Category`], and carries a
//! display name used in page titles.
//!
//! ## Pseudo-targets
//!
//! Some conversion targets are operations rather than formats: `compressed`,
//! `merged`, `split`, `excel`. They are allowed as the *target* of an edge but
//! have no catalog entry of their own; the edge they appear on decides their
//! category.
//!
//! ## Fallbacks
//!
//! Lookups never fail. An unknown token is categorized as
//! [`Category::Document`] and displayed as its upper-cased self, so pages for
//! freshly added formats still render before the catalog catches up.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CatalogError {
    #[error("Format '{0}' is declared more than once")]
    DuplicateFormat(FormatToken),
    #[error("Pseudo-target '{0}' shadows a catalog format")]
    PseudoShadowsFormat(FormatToken),
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

/// Canonical, lower-cased identifier for a file format or pseudo-target.
///
/// Construction normalizes case and surrounding whitespace, so two tokens
/// compare equal exactly when their inputs match case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FormatToken(String);

impl FormatToken {
    pub fn new(token: &str) -> Self {
        Self(token.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upper-cased token, the display fallback for uncatalogued formats.
    pub fn upper(&self) -> String {
        self.0.to_uppercase()
    }
}

impl From<String> for FormatToken {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<&str> for FormatToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<FormatToken> for String {
    fn from(token: FormatToken) -> Self {
        token.0
    }
}

impl Borrow<str> for FormatToken {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FormatToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormatToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for FormatToken {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for FormatToken {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Top-level grouping of formats, mirrored by the site's navigation sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Image,
    Document,
    Audio,
    Video,
    Pdf,
    Font,
    #[serde(rename = "ai/3d")]
    Ai3d,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Image,
        Category::Document,
        Category::Audio,
        Category::Video,
        Category::Pdf,
        Category::Font,
        Category::Ai3d,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Image => "image",
            Category::Document => "document",
            Category::Audio => "audio",
            Category::Video => "video",
            Category::Pdf => "pdf",
            Category::Font => "font",
            Category::Ai3d => "ai/3d",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "image" => Ok(Category::Image),
            "document" => Ok(Category::Document),
            "audio" => Ok(Category::Audio),
            "video" => Ok(Category::Video),
            "pdf" => Ok(Category::Pdf),
            "font" => Ok(Category::Font),
            "ai/3d" | "ai-3d" | "ai3d" => Ok(Category::Ai3d),
            _ => Err(CatalogError::UnknownCategory(s.to_string())),
        }
    }
}

/// One catalog row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatInfo {
    pub token: FormatToken,
    pub category: Category,
    pub display_name: String,
}

impl FormatInfo {
    pub fn new(token: &str, category: Category, display_name: &str) -> Self {
        Self {
            token: FormatToken::new(token),
            category,
            display_name: display_name.to_string(),
        }
    }
}

/// Immutable lookup table from token to category and display name.
#[derive(Debug, Clone)]
pub struct FormatCatalog {
    /// Rows in declaration order.
    formats: Vec<FormatInfo>,
    index: HashMap<FormatToken, usize>,
    pseudo_targets: HashSet<FormatToken>,
}

impl FormatCatalog {
    /// Build a catalog from explicit rows and pseudo-targets.
    pub fn new(
        formats: impl IntoIterator<Item = FormatInfo>,
        pseudo_targets: impl IntoIterator<Item = FormatToken>,
    ) -> Result<Self, CatalogError> {
        let mut rows = Vec::new();
        let mut index = HashMap::new();
        for info in formats {
            if index.contains_key(&info.token) {
                return Err(CatalogError::DuplicateFormat(info.token));
            }
            index.insert(info.token.clone(), rows.len());
            rows.push(info);
        }

        let mut pseudo = HashSet::new();
        for token in pseudo_targets {
            if index.contains_key(&token) {
                return Err(CatalogError::PseudoShadowsFormat(token));
            }
            pseudo.insert(token);
        }

        Ok(Self {
            formats: rows,
            index,
            pseudo_targets: pseudo,
        })
    }

    /// The catalog shipped with the site.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(
            FORMATS
                .iter()
                .map(|&(token, category, name)| FormatInfo::new(token, category, name)),
            PSEUDO_TARGETS.iter().map(|&t| FormatToken::new(t)),
        )
    }

    fn lookup(&self, token: &str) -> Option<&FormatInfo> {
        let key = FormatToken::new(token);
        self.index.get(&key).map(|&i| &self.formats[i])
    }

    /// Category of `token`; [`Category::Document`] when unknown.
    pub fn category(&self, token: &str) -> Category {
        self.lookup(token)
            .map(|info| info.category)
            .unwrap_or(Category::Document)
    }

    /// Display name of `token`; the upper-cased token when unknown.
    pub fn display_name(&self, token: &str) -> String {
        match self.lookup(token) {
            Some(info) => info.display_name.clone(),
            None => FormatToken::new(token).upper(),
        }
    }

    /// Catalog tokens in `category`, in declaration order.
    pub fn formats_by_category(&self, category: Category) -> Vec<FormatToken> {
        self.formats
            .iter()
            .filter(|info| info.category == category)
            .map(|info| info.token.clone())
            .collect()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.lookup(token).is_some()
    }

    pub fn is_pseudo_target(&self, token: &str) -> bool {
        self.pseudo_targets.contains(&FormatToken::new(token))
    }

    /// Whether `token` may appear as the target of an edge.
    pub fn is_known_target(&self, token: &str) -> bool {
        self.contains(token) || self.is_pseudo_target(token)
    }

    pub fn formats(&self) -> &[FormatInfo] {
        &self.formats
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

/// Targets that name an operation instead of a format.
pub const PSEUDO_TARGETS: &[&str] = &["compressed", "merged", "split", "excel"];

/// The site's format table: (token, category, display name).
pub const FORMATS: &[(&str, Category, &str)] = &[
    // Image
    ("jpg", Category::Image, "JPG"),
    ("jpeg", Category::Image, "JPEG"),
    ("png", Category::Image, "PNG"),
    ("webp", Category::Image, "WebP"),
    ("avif", Category::Image, "AVIF"),
    ("gif", Category::Image, "GIF"),
    ("bmp", Category::Image, "BMP"),
    ("tiff", Category::Image, "TIFF"),
    ("ico", Category::Image, "ICO"),
    ("svg", Category::Image, "SVG"),
    ("heic", Category::Image, "HEIC"),
    ("heif", Category::Image, "HEIF"),
    ("raw", Category::Image, "RAW"),
    ("cr2", Category::Image, "Canon CR2"),
    ("nef", Category::Image, "Nikon NEF"),
    ("arw", Category::Image, "Sony ARW"),
    ("dng", Category::Image, "DNG"),
    ("psd", Category::Image, "Photoshop PSD"),
    ("tga", Category::Image, "TGA"),
    ("jfif", Category::Image, "JFIF"),
    // Document
    ("docx", Category::Document, "Word DOCX"),
    ("doc", Category::Document, "Word DOC"),
    ("odt", Category::Document, "OpenDocument Text"),
    ("rtf", Category::Document, "Rich Text"),
    ("txt", Category::Document, "Plain Text"),
    ("html", Category::Document, "HTML"),
    ("md", Category::Document, "Markdown"),
    ("epub", Category::Document, "EPUB"),
    ("mobi", Category::Document, "MOBI"),
    ("xlsx", Category::Document, "Excel XLSX"),
    ("xls", Category::Document, "Excel XLS"),
    ("csv", Category::Document, "CSV"),
    ("pptx", Category::Document, "PowerPoint PPTX"),
    ("ppt", Category::Document, "PowerPoint PPT"),
    // Audio
    ("mp3", Category::Audio, "MP3"),
    ("wav", Category::Audio, "WAV"),
    ("flac", Category::Audio, "FLAC"),
    ("aac", Category::Audio, "AAC"),
    ("ogg", Category::Audio, "OGG"),
    ("m4a", Category::Audio, "M4A"),
    ("wma", Category::Audio, "WMA"),
    ("aiff", Category::Audio, "AIFF"),
    ("opus", Category::Audio, "Opus"),
    // Video
    ("mp4", Category::Video, "MP4"),
    ("mov", Category::Video, "MOV"),
    ("avi", Category::Video, "AVI"),
    ("mkv", Category::Video, "MKV"),
    ("webm", Category::Video, "WebM"),
    ("flv", Category::Video, "FLV"),
    ("wmv", Category::Video, "WMV"),
    ("m4v", Category::Video, "M4V"),
    ("mpeg", Category::Video, "MPEG"),
    ("3gp", Category::Video, "3GP"),
    // PDF
    ("pdf", Category::Pdf, "PDF"),
    // Font
    ("ttf", Category::Font, "TrueType TTF"),
    ("otf", Category::Font, "OpenType OTF"),
    ("woff", Category::Font, "WOFF"),
    ("woff2", Category::Font, "WOFF2"),
    ("eot", Category::Font, "EOT"),
    // AI / 3D
    ("ai", Category::Ai3d, "Adobe Illustrator"),
    ("eps", Category::Ai3d, "EPS"),
    ("stl", Category::Ai3d, "STL"),
    ("obj", Category::Ai3d, "OBJ"),
    ("fbx", Category::Ai3d, "FBX"),
    ("glb", Category::Ai3d, "GLB"),
    ("gltf", Category::Ai3d, "glTF"),
    ("ply", Category::Ai3d, "PLY"),
];
