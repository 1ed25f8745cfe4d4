//! Slug generation, title humanizing and collision handling.

use crate::models::SourceKind;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

static HYPHEN_RUNS: OnceLock<Regex> = OnceLock::new();

/// Convert a string to a URL-safe slug
///
/// Rules:
/// - Lowercase
/// - Replace whitespace and underscores with hyphens
/// - Remove special characters (except hyphens)
/// - Collapse multiple hyphens
/// - Trim leading/trailing hyphens
///
/// # Examples
///
/// ```
/// use qikb_core::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("Tax & Engagement"), "tax-engagement");
/// assert_eq!(slugify("welcome"), "welcome");
/// ```
pub fn slugify(input: &str) -> String {
    let cleaned = input
        .to_lowercase()
        .graphemes(true)
        .filter_map(|g| {
            let c = g.chars().next()?;
            if c.is_whitespace() || c == '_' {
                Some("-")
            } else if c.is_ascii_alphanumeric() || c == '-' || c.is_alphabetic() {
                Some(g)
            } else {
                None
            }
        })
        .collect::<String>();

    let re = HYPHEN_RUNS.get_or_init(|| Regex::new(r"-+").expect("hyphen regex is valid"));
    re.replace_all(&cleaned, "-").trim_matches('-').to_string()
}

/// Turn a file name into a display title: separators become spaces and
/// each word is capitalized.
///
/// ```
/// use qikb_core::slug::humanize_title;
///
/// assert_eq!(humanize_title("tax-engagement_letter.md"), "Tax Engagement Letter");
/// assert_eq!(humanize_title("welcome"), "Welcome");
/// ```
pub fn humanize_title(file_name: &str) -> String {
    let stem = strip_content_extension(file_name);
    stem.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_content_extension(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && SourceKind::from_extension(ext).is_some() => stem,
        _ => file_name,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Output location of a wiki page: the source's relative path with
/// markdown extensions mapped to `.html`. HTML sources keep their name.
pub fn wiki_output_path(rel_path: &Path, kind: SourceKind) -> PathBuf {
    match kind {
        SourceKind::Markdown => rel_path.with_extension("html"),
        SourceKind::Html => rel_path.to_path_buf(),
    }
}

/// What to do when two documents claim the same slug or output path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Report the collision and keep the later document as-is
    Warn,
    /// Report the collision and append `-2`, `-3`, ... to the later document
    #[default]
    Suffix,
    /// Report the collision as an error and drop the later document
    Fail,
}

/// Outcome of claiming a key with [`SlugResolver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The key was free
    Unique(String),
    /// The key was taken; a suffixed key was assigned instead
    Renamed {
        key: String,
        original: String,
        previous_owner: String,
    },
    /// The key was taken and is reused (last writer wins)
    Shared { key: String, previous_owner: String },
    /// The key was taken and the claim is refused
    Rejected { key: String, previous_owner: String },
}

impl Resolution {
    /// Key to use, or `None` when the document must be dropped
    pub fn key(&self) -> Option<&str> {
        match self {
            Resolution::Unique(key)
            | Resolution::Renamed { key, .. }
            | Resolution::Shared { key, .. } => Some(key),
            Resolution::Rejected { .. } => None,
        }
    }

    pub fn is_collision(&self) -> bool {
        !matches!(self, Resolution::Unique(_))
    }
}

/// Tracks claimed slugs (or output paths) for one build run
#[derive(Debug, Default)]
pub struct SlugResolver {
    policy: CollisionPolicy,
    owners: HashMap<String, String>,
}

impl SlugResolver {
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            owners: HashMap::new(),
        }
    }

    /// Claim a slug on behalf of `owner` (usually the source path)
    pub fn claim_slug(&mut self, slug: &str, owner: &str) -> Resolution {
        self.claim(slug, owner, |n| format!("{}-{}", slug, n))
    }

    /// Claim an output path; suffixes go before the extension
    /// (`guide.html` becomes `guide-2.html`)
    pub fn claim_path(&mut self, path: &str, owner: &str) -> Resolution {
        let (stem, ext) = split_extension(path);
        self.claim(path, owner, |n| format!("{}-{}{}", stem, n, ext))
    }

    fn claim(
        &mut self,
        key: &str,
        owner: &str,
        suffixed: impl Fn(usize) -> String,
    ) -> Resolution {
        let Some(previous_owner) = self.owners.get(key).cloned() else {
            self.owners.insert(key.to_string(), owner.to_string());
            return Resolution::Unique(key.to_string());
        };

        match self.policy {
            CollisionPolicy::Warn => {
                self.owners.insert(key.to_string(), owner.to_string());
                Resolution::Shared {
                    key: key.to_string(),
                    previous_owner,
                }
            }
            CollisionPolicy::Fail => Resolution::Rejected {
                key: key.to_string(),
                previous_owner,
            },
            CollisionPolicy::Suffix => {
                let mut n = 2;
                let renamed = loop {
                    let candidate = suffixed(n);
                    if !self.owners.contains_key(&candidate) {
                        break candidate;
                    }
                    n += 1;
                };
                self.owners.insert(renamed.clone(), owner.to_string());
                Resolution::Renamed {
                    key: renamed,
                    original: key.to_string(),
                    previous_owner,
                }
            }
        }
    }
}

fn split_extension(path: &str) -> (&str, &str) {
    let file_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[file_start..].rfind('.') {
        Some(dot) if dot > 0 => path.split_at(file_start + dot),
        _ => (path, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("welcome"), "welcome");
    }

    #[test]
    fn test_special_characters() {
        assert_eq!(slugify("Rust & Safety"), "rust-safety");
        assert_eq!(slugify("Node.js Tips"), "nodejs-tips");
        assert_eq!(slugify("What's new?"), "whats-new");
    }

    #[test]
    fn test_unicode() {
        assert_eq!(slugify("Café"), "café");
    }

    #[test]
    fn test_separators_collapse() {
        assert_eq!(slugify("  Hello    World  "), "hello-world");
        assert_eq!(slugify("tax_engagement--letter"), "tax-engagement-letter");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_humanize_title() {
        assert_eq!(humanize_title("draft"), "Draft");
        assert_eq!(humanize_title("welcome.md"), "Welcome");
        assert_eq!(humanize_title("getting_started-guide.html"), "Getting Started Guide");
        assert_eq!(humanize_title("a--b"), "A B");
        assert_eq!(humanize_title("v1.2-notes"), "V1.2 Notes");
    }

    #[test]
    fn test_wiki_output_path() {
        let md = wiki_output_path(Path::new("guides/intro.md"), SourceKind::Markdown);
        assert_eq!(md, PathBuf::from("guides/intro.html"));

        let mdx = wiki_output_path(Path::new("intro.mdx"), SourceKind::Markdown);
        assert_eq!(mdx, PathBuf::from("intro.html"));

        let html = wiki_output_path(Path::new("legacy/page.htm"), SourceKind::Html);
        assert_eq!(html, PathBuf::from("legacy/page.htm"));
    }

    #[test]
    fn test_resolver_unique() {
        let mut resolver = SlugResolver::new(CollisionPolicy::Suffix);
        assert_eq!(
            resolver.claim_slug("welcome", "a/welcome.md"),
            Resolution::Unique("welcome".into())
        );
        assert_eq!(
            resolver.claim_slug("other", "a/other.md"),
            Resolution::Unique("other".into())
        );
    }

    #[test]
    fn test_resolver_suffix_is_deterministic() {
        let mut resolver = SlugResolver::new(CollisionPolicy::Suffix);
        resolver.claim_slug("welcome", "a/welcome.md");
        let second = resolver.claim_slug("welcome", "b/welcome.md");
        let third = resolver.claim_slug("welcome", "c/welcome.md");
        assert_eq!(second.key(), Some("welcome-2"));
        assert_eq!(third.key(), Some("welcome-3"));
        assert!(second.is_collision());
    }

    #[test]
    fn test_resolver_path_suffix_before_extension() {
        let mut resolver = SlugResolver::new(CollisionPolicy::Suffix);
        resolver.claim_path("guides/intro.html", "guides/intro.md");
        let renamed = resolver.claim_path("guides/intro.html", "guides/intro.html");
        assert_eq!(renamed.key(), Some("guides/intro-2.html"));

        resolver.claim_path("v1.0/README", "x");
        let renamed = resolver.claim_path("v1.0/README", "y");
        assert_eq!(renamed.key(), Some("v1.0/README-2"));
    }

    #[test]
    fn test_resolver_warn_keeps_key() {
        let mut resolver = SlugResolver::new(CollisionPolicy::Warn);
        resolver.claim_slug("dup", "first.md");
        let res = resolver.claim_slug("dup", "second.md");
        assert_eq!(
            res,
            Resolution::Shared {
                key: "dup".into(),
                previous_owner: "first.md".into()
            }
        );
    }

    #[test]
    fn test_resolver_fail_rejects() {
        let mut resolver = SlugResolver::new(CollisionPolicy::Fail);
        resolver.claim_slug("dup", "first.md");
        let res = resolver.claim_slug("dup", "second.md");
        assert_eq!(res.key(), None);
        assert!(res.is_collision());
    }

    #[test]
    fn test_policy_deserializes_lowercase() {
        let policy: CollisionPolicy = serde_yaml::from_str("fail").unwrap();
        assert_eq!(policy, CollisionPolicy::Fail);
        assert_eq!(CollisionPolicy::default(), CollisionPolicy::Suffix);
    }
}
