//! The docs map: every mirrored document with its source and output path
//!
//! A [`DocsMap`] is computed fresh on each run by [`generate`] and never
//! persisted by the engine itself. Its JSON form (camelCase keys) is the
//! interchange format for the corpus renderer and external tooling.

mod frontmatter;
mod generator;

pub use frontmatter::{DocMetadata, extract_metadata};
pub(crate) use frontmatter::collapse_whitespace;
pub use generator::{GeneratedDocs, generate, generate_docs_map, is_markdown_path, slugify};

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Generator identifier written into every map, `name@version`
pub const GENERATOR: &str = concat!("docmirror@", env!("CARGO_PKG_VERSION"));

/// What a mirrored document is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocKind {
    /// A package's root README
    Readme,
    /// Prose documentation
    Guide,
    /// API or reference material
    Reference,
    /// Worked examples
    Example,
}

impl DocKind {
    /// Parse a frontmatter `kind:` value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "readme" => Some(Self::Readme),
            "guide" => Some(Self::Guide),
            "reference" | "api" => Some(Self::Reference),
            "example" | "examples" => Some(Self::Example),
            _ => None,
        }
    }

    /// Kind inferred from a package-relative path when frontmatter is silent.
    pub fn infer(relative_path: &str) -> Self {
        let mut dirs: Vec<&str> = relative_path.split('/').collect();
        dirs.pop();
        for dir in dirs {
            match dir.to_ascii_lowercase().as_str() {
                "api" | "reference" => return Self::Reference,
                "example" | "examples" => return Self::Example,
                _ => {}
            }
        }
        Self::Guide
    }
}

impl fmt::Display for DocKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Readme => write!(f, "readme"),
            Self::Guide => write!(f, "guide"),
            Self::Reference => write!(f, "reference"),
            Self::Example => write!(f, "example"),
        }
    }
}

/// One source → output mapping. Paths are workspace-relative with forward
/// slashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocsMapEntry {
    pub id: String,
    pub kind: DocKind,
    #[serde(default)]
    pub title: String,
    pub source_path: String,
    pub output_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// The full mapping for one workspace snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocsMap {
    pub generated_at: DateTime<Utc>,
    pub generator: String,
    pub entries: Vec<DocsMapEntry>,
}

impl DocsMap {
    /// A map stamped with the current time and this generator's identity.
    pub fn new(entries: Vec<DocsMapEntry>) -> Self {
        Self {
            generated_at: Utc::now(),
            generator: GENERATOR.to_string(),
            entries,
        }
    }

    /// Entries in canonical order (ascending `outputPath`).
    pub fn sorted_entries(&self) -> Vec<&DocsMapEntry> {
        let mut entries: Vec<&DocsMapEntry> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.output_path.cmp(&b.output_path));
        entries
    }

    /// Entry whose source is `source_path`, if any.
    pub fn entry_for_source(&self, source_path: &str) -> Option<&DocsMapEntry> {
        self.entries.iter().find(|e| e.source_path == source_path)
    }

    /// Sorted, deduplicated package names referenced by entries.
    pub fn package_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .iter()
            .filter_map(|e| e.package.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
