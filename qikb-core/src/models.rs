//! Content model structs for source documents, index entries and wiki pages.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Kind of source content, decided by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Markdown,
    Html,
}

impl SourceKind {
    /// Classify an extension (without the leading dot, any case)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "md" | "mdx" | "markdown" => Some(SourceKind::Markdown),
            "html" | "htm" => Some(SourceKind::Html),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Markdown => "markdown",
            SourceKind::Html => "html",
        }
    }
}

/// A file captured at discovery time, read once and never mutated.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Location on disk
    pub path: PathBuf,

    /// Path relative to the discovery root it was found under
    pub rel_path: PathBuf,

    /// Discovery root the file belongs to
    pub root: PathBuf,

    pub kind: SourceKind,

    /// File contents exactly as read
    pub raw: Vec<u8>,
}

impl SourceDocument {
    /// File name without its extension
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .to_string()
    }

    /// Relative path with forward slashes, for reports and links
    pub fn display_path(&self) -> String {
        to_slash(&self.rel_path)
    }
}

/// Frontmatter metadata from markdown files
///
/// Known keys are typed; anything else lands in `extra` so that no
/// metadata is dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    #[serde(default, deserialize_with = "optional_scalar")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "optional_scalar")]
    pub slug: Option<String>,

    #[serde(default, deserialize_with = "optional_scalar")]
    pub summary: Option<String>,

    #[serde(default, deserialize_with = "optional_scalar")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "scalar_list")]
    pub tags: Vec<String>,

    #[serde(default, deserialize_with = "optional_scalar")]
    pub updated: Option<String>,

    #[serde(default, deserialize_with = "optional_scalar")]
    pub category: Option<String>,

    #[serde(default, deserialize_with = "optional_scalar")]
    pub audio: Option<String>,

    /// Unrecognized keys, kept in key order
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Frontmatter {
    pub fn is_empty(&self) -> bool {
        *self == Frontmatter::default()
    }

    /// Explicit title, ignoring blank values
    pub fn title(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }

    /// Explicit slug, ignoring blank values
    pub fn slug(&self) -> Option<&str> {
        non_blank(self.slug.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn optional_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_to_string(value)
            .map(Some)
            .ok_or_else(|| de::Error::custom("expected a string, number or boolean")),
    }
}

fn scalar_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(items)) => items
            .into_iter()
            .map(|item| {
                scalar_to_string(item)
                    .ok_or_else(|| de::Error::custom("list items must be scalars"))
            })
            .collect(),
        Some(value) => scalar_to_string(value)
            .map(|s| vec![s])
            .ok_or_else(|| de::Error::custom("expected a list of strings")),
    }
}

/// A source document split into metadata and body
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub source: SourceDocument,
    pub frontmatter: Frontmatter,
    /// Body text after frontmatter removal (may be empty)
    pub body: String,
}

/// One record of the JSON search index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub tags: Vec<String>,
    /// ISO-8601 date (YYYY-MM-DD)
    pub updated: String,
    /// Site-relative path, `/`-prefixed
    pub path: String,
    /// Plain-text body, capped at the configured length
    pub body: String,
}

/// A rendered static wiki page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiPage {
    pub title: String,
    pub body_html: String,
    /// Output path relative to the wiki root, `/`-separated
    pub output_rel_path: String,
    /// Source file the page was built from, as shown in reports
    pub source_path: String,
    /// Relative link back to the generated index page
    pub back_link: String,
    pub stylesheet: String,
}

/// A link entry on the wiki index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLink {
    pub title: String,
    pub href: String,
}

/// Generated wiki index listing every page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiIndex {
    pub title: String,
    pub stylesheet: String,
    pub links: Vec<WikiLink>,
}

/// Join path components with `/` regardless of platform
pub fn to_slash(path: &std::path::Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
