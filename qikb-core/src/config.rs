//! Configuration parsing and management.

use crate::slug::CollisionPolicy;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Main configuration struct matching the qikb.yml schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub wiki: WikiConfig,

    #[serde(default)]
    pub digest: DigestConfig,

    #[serde(default)]
    pub collisions: CollisionPolicy,

    /// Date used for missing `updated` fields and the digest stamp.
    /// Defaults to today when unset.
    #[serde(default)]
    pub build_date: Option<NaiveDate>,

    // Directory relative paths are resolved against
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Directory that site-relative index paths are computed from
    #[serde(default = "default_content_base")]
    pub base: PathBuf,

    /// Directories to scan; defaults to `base` alone
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Regexes matched against root-relative paths
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

fn default_content_base() -> PathBuf {
    PathBuf::from("content")
}

fn default_extensions() -> Vec<String> {
    ["md", "mdx", "html", "htm"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_search_output")]
    pub output: PathBuf,

    #[serde(default = "default_max_body_chars")]
    pub max_body_chars: usize,
}

fn default_search_output() -> PathBuf {
    PathBuf::from("public/search-index.json")
}

pub const DEFAULT_MAX_BODY_CHARS: usize = 2000;

fn default_max_body_chars() -> usize {
    DEFAULT_MAX_BODY_CHARS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_wiki_output")]
    pub output: PathBuf,

    /// Stylesheet href written into every page
    #[serde(default = "default_stylesheet")]
    pub stylesheet: String,

    #[serde(default = "default_index_title")]
    pub index_title: String,

    /// Write the bundled stylesheet into the output directory
    #[serde(default)]
    pub copy_assets: bool,
}

fn default_wiki_output() -> PathBuf {
    PathBuf::from("wiki")
}

fn default_stylesheet() -> String {
    String::from("/wiki/css/wikistyle.css")
}

fn default_index_title() -> String {
    String::from("Knowledge Base")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_digest_output")]
    pub output: PathBuf,

    #[serde(default = "default_digest_title")]
    pub title: String,

    /// Case-insensitive file-name fragments that are placed first, in order
    #[serde(default)]
    pub order_hints: Vec<String>,
}

fn default_digest_output() -> PathBuf {
    PathBuf::from("digest.md")
}

fn default_digest_title() -> String {
    String::from("Knowledge Base Digest")
}

fn default_true() -> bool {
    true
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            base: default_content_base(),
            roots: Vec::new(),
            extensions: default_extensions(),
            ignore_patterns: Vec::new(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output: default_search_output(),
            max_body_chars: default_max_body_chars(),
        }
    }
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output: default_wiki_output(),
            stylesheet: default_stylesheet(),
            index_title: default_index_title(),
            copy_assets: false,
        }
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            output: default_digest_output(),
            title: default_digest_title(),
            order_hints: Vec::new(),
        }
    }
}

impl Config {
    /// Configuration with every relative path resolved against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
            ..Self::default()
        }
    }

    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&contents)?;

        // Relative paths in the file are relative to the file itself
        config.base_dir = path.parent().map(Path::to_path_buf);

        Ok(config)
    }

    /// Parse configuration from YAML text, resolving paths against the
    /// working directory
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.search.max_body_chars == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.max_body_chars".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.content.extensions.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "content.extensions".into(),
                message: "at least one extension is required".into(),
            });
        }
        Ok(())
    }

    /// Directory site-relative paths are computed from
    pub fn content_base(&self) -> PathBuf {
        self.resolve_path(&self.content.base)
    }

    /// Content roots in configuration order, resolved
    pub fn content_roots(&self) -> Vec<PathBuf> {
        if self.content.roots.is_empty() {
            vec![self.content_base()]
        } else {
            self.content
                .roots
                .iter()
                .map(|p| self.resolve_path(p))
                .collect()
        }
    }

    pub fn search_output(&self) -> PathBuf {
        self.resolve_path(&self.search.output)
    }

    pub fn wiki_output_dir(&self) -> PathBuf {
        self.resolve_path(&self.wiki.output)
    }

    pub fn digest_output(&self) -> PathBuf {
        self.resolve_path(&self.digest.output)
    }

    /// Builder-style setters, mostly for programmatic use
    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.content.base = base.into();
        self
    }

    pub fn with_roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.content.roots = roots.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_build_date(mut self, date: NaiveDate) -> Self {
        self.build_date = Some(date);
        self
    }

    pub fn with_collisions(mut self, policy: CollisionPolicy) -> Self {
        self.collisions = policy;
        self
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(base_dir) = &self.base_dir {
            base_dir.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::from_yaml("{}").unwrap();

        assert_eq!(config.search.max_body_chars, 2000);
        assert!(config.search.enabled);
        assert!(config.wiki.enabled);
        assert!(!config.digest.enabled);
        assert_eq!(config.wiki.stylesheet, "/wiki/css/wikistyle.css");
        assert_eq!(config.wiki.index_title, "Knowledge Base");
        assert_eq!(config.collisions, CollisionPolicy::Suffix);
        assert_eq!(config.content.extensions, vec!["md", "mdx", "html", "htm"]);
        assert_eq!(config.build_date, None);
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
content:
  base: public/kb
  roots: [public/kb/articles, public/kb/policies]
  ignore_patterns: ["^drafts/"]
search:
  output: public/kb/_meta/search-index.json
  max_body_chars: 500
wiki:
  output: wiki/pages/kb
  copy_assets: true
digest:
  enabled: true
  order_hints: [setup, session]
collisions: fail
build_date: 2025-09-15
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.content.roots.len(), 2);
        assert_eq!(config.search.max_body_chars, 500);
        assert!(config.wiki.copy_assets);
        assert_eq!(config.digest.order_hints, vec!["setup", "session"]);
        assert_eq!(config.collisions, CollisionPolicy::Fail);
        assert_eq!(config.build_date, NaiveDate::from_ymd_opt(2025, 9, 15));
    }

    #[test]
    fn test_zero_body_length_rejected() {
        let result = Config::from_yaml("search:\n  max_body_chars: 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_paths_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qikb.yml");
        std::fs::write(&path, "content:\n  base: kb\nsearch:\n  output: out/index.json\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.content_base(), dir.path().join("kb"));
        assert_eq!(config.content_roots(), vec![dir.path().join("kb")]);
        assert_eq!(config.search_output(), dir.path().join("out/index.json"));
    }

    #[test]
    fn test_programmatic_config() {
        let config = Config::new("/srv/site")
            .with_base("kb")
            .with_roots(["kb/articles", "/abs/policies"]);
        assert_eq!(
            config.content_roots(),
            vec![
                PathBuf::from("/srv/site/kb/articles"),
                PathBuf::from("/abs/policies")
            ]
        );
        assert_eq!(config.wiki_output_dir(), PathBuf::from("/srv/site/wiki"));
    }
}
