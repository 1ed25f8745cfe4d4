//! Frontmatter parsing from markdown files.

use crate::models::{Frontmatter, SourceKind};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Frontmatter must be a mapping of keys to values")]
    NotAMapping,
}

static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX.get_or_init(|| {
        Regex::new(r"(?s)\A---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n(.*))?\z")
            .expect("frontmatter regex is valid")
    })
}

/// Parse frontmatter from markdown content
///
/// Returns a tuple of (frontmatter, markdown_body).
/// If no frontmatter is present, returns default frontmatter with the full content as body.
///
/// # Example
///
/// ```
/// use qikb_core::frontmatter::parse_frontmatter;
///
/// let content = "---\ntitle: Welcome\ntags: [onboarding]\n---\nHello world\n";
///
/// let (fm, body) = parse_frontmatter(content).unwrap();
/// assert_eq!(fm.title.as_deref(), Some("Welcome"));
/// assert_eq!(fm.tags, vec!["onboarding"]);
/// assert_eq!(body, "Hello world\n");
/// ```
pub fn parse_frontmatter(content: &str) -> Result<(Frontmatter, String), FrontmatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let Some(captures) = frontmatter_regex().captures(content) else {
        return Ok((Frontmatter::default(), content.to_string()));
    };

    let yaml = captures.get(1).map_or("", |m| m.as_str());
    let body = captures.get(2).map_or("", |m| m.as_str());

    if yaml.trim().is_empty() {
        return Ok((Frontmatter::default(), body.to_string()));
    }

    let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
    match value {
        serde_yaml::Value::Mapping(_) => {}
        serde_yaml::Value::Null => return Ok((Frontmatter::default(), body.to_string())),
        _ => return Err(FrontmatterError::NotAMapping),
    }

    let frontmatter: Frontmatter = serde_yaml::from_value(value)?;
    Ok((frontmatter, body.to_string()))
}

/// Split a source file according to its kind.
///
/// HTML sources are already-rendered markup and carry no frontmatter.
pub fn split_document(
    kind: SourceKind,
    content: &str,
) -> Result<(Frontmatter, String), FrontmatterError> {
    match kind {
        SourceKind::Markdown => parse_frontmatter(content),
        SourceKind::Html => Ok((Frontmatter::default(), content.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_frontmatter() {
        let content = r#"---
title: Test Post
summary: A test post
updated: 2025-09-15
category: Guides
audio: https://cdn.example.com/a.mp3
---

# Hello World

This is the content."#;

        let (fm, body) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Test Post"));
        assert_eq!(fm.summary.as_deref(), Some("A test post"));
        assert_eq!(fm.updated.as_deref(), Some("2025-09-15"));
        assert_eq!(fm.category.as_deref(), Some("Guides"));
        assert_eq!(fm.audio.as_deref(), Some("https://cdn.example.com/a.mp3"));
        assert!(body.contains("# Hello World"));
        assert!(body.contains("This is the content."));
    }

    #[test]
    fn test_parse_frontmatter_with_tags() {
        let content = r#"---
title: Tagged Post
tags:
  - tax
  - onboarding
---

Content."#;

        let (fm, _) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.tags, vec!["tax", "onboarding"]);
    }

    #[test]
    fn test_parse_no_frontmatter() {
        let content = "# Just Content\n\nNo frontmatter here.";
        let (fm, body) = parse_frontmatter(content).unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_empty_frontmatter_block() {
        let (fm, body) = parse_frontmatter("---\n---\nBody").unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_closing_delimiter_at_eof() {
        let (fm, body) = parse_frontmatter("---\ntitle: Only Meta\n---").unwrap();
        assert_eq!(fm.title.as_deref(), Some("Only Meta"));
        assert_eq!(body, "");
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = "---\r\ntitle: Windows\r\n---\r\nBody text\r\n";
        let (fm, body) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Windows"));
        assert_eq!(body, "Body text\r\n");
    }

    #[test]
    fn test_horizontal_rule_later_is_not_frontmatter() {
        let content = "Intro\n\n---\n\nMore";
        let (fm, body) = parse_frontmatter(content).unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_invalid_yaml() {
        let content = r#"---
title: Test
invalid yaml: [unclosed
---

Content."#;

        assert!(matches!(
            parse_frontmatter(content),
            Err(FrontmatterError::YamlError(_))
        ));
    }

    #[test]
    fn test_scalar_frontmatter_is_rejected() {
        let content = "---\njust a sentence\n---\nBody";
        assert!(matches!(
            parse_frontmatter(content),
            Err(FrontmatterError::NotAMapping)
        ));
    }

    #[test]
    fn test_html_is_never_split() {
        let content = "---\ntitle: nope\n---\n<p>Hi</p>";
        let (fm, body) = split_document(SourceKind::Html, content).unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, content);
    }
}
