//! Merged markdown digest of every markdown document.

use crate::models::{ParsedDocument, SourceKind};
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::fmt::Write;

/// Order documents for the digest.
///
/// Documents whose lowercased file name contains one of `order_hints` come
/// first, in hint order; the rest follow alphabetically by file name.
/// Ties fall back to the relative path so the order is total.
pub fn digest_order<'a>(docs: &[&'a ParsedDocument], order_hints: &[String]) -> Vec<&'a ParsedDocument> {
    let hints: Vec<String> = order_hints.iter().map(|h| h.to_lowercase()).collect();
    let rank = |doc: &ParsedDocument| {
        let name = file_name(doc).to_lowercase();
        hints.iter().position(|h| !h.is_empty() && name.contains(h.as_str()))
    };

    let mut ordered = docs.to_vec();
    ordered.sort_by(|a, b| {
        let by_hint = match (rank(*a), rank(*b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_hint
            .then_with(|| file_name(a).to_lowercase().cmp(&file_name(b).to_lowercase()))
            .then_with(|| a.source.rel_path.cmp(&b.source.rel_path))
    });
    ordered
}

/// Render the digest for the markdown documents among `docs`.
///
/// Each document is included verbatim (front matter and all), trimmed.
pub fn render_digest(
    docs: &[ParsedDocument],
    title: &str,
    order_hints: &[String],
    build_date: NaiveDate,
) -> String {
    let markdown: Vec<&ParsedDocument> = docs
        .iter()
        .filter(|d| d.source.kind == SourceKind::Markdown)
        .collect();
    let date = build_date.format("%Y-%m-%d");

    let mut out = String::new();
    let _ = write!(out, "# {}\n\n", title);

    if markdown.is_empty() {
        let _ = writeln!(out, "_No knowledge base files found to merge on {}._", date);
        return out;
    }

    let ordered = digest_order(&markdown, order_hints);

    let _ = write!(out, "Generated: {}\n\n", date);
    out.push_str("This document merges all markdown files of the knowledge base into one reference.\n\n");
    out.push_str("## Included Files (order)\n");
    for (i, doc) in ordered.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, file_name(doc));
    }
    out.push_str("\n---\n");

    for doc in ordered {
        let _ = write!(out, "\n\n---\n\n# Source: {}\n\n", file_name(doc));
        out.push_str(String::from_utf8_lossy(&doc.source.raw).trim());
        out.push('\n');
    }

    out
}

fn file_name(doc: &ParsedDocument) -> String {
    doc.source
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| doc.source.display_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frontmatter, SourceDocument};
    use std::path::PathBuf;

    fn doc(rel: &str, raw: &str) -> ParsedDocument {
        let kind = if rel.ends_with(".html") {
            SourceKind::Html
        } else {
            SourceKind::Markdown
        };
        ParsedDocument {
            source: SourceDocument {
                path: PathBuf::from("/kb").join(rel),
                rel_path: PathBuf::from(rel),
                root: PathBuf::from("/kb"),
                kind,
                raw: raw.as_bytes().to_vec(),
            },
            frontmatter: Frontmatter::default(),
            body: raw.to_string(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 15).unwrap()
    }

    #[test]
    fn test_hints_first_then_alphabetical() {
        let docs = vec![
            doc("zeta.md", ""),
            doc("Alpha.md", ""),
            doc("dev-setup.md", ""),
            doc("session-01.md", ""),
        ];
        let refs: Vec<&ParsedDocument> = docs.iter().collect();
        let hints = vec!["session".to_string(), "SETUP".to_string()];
        let names: Vec<String> = digest_order(&refs, &hints).iter().map(|d| file_name(d)).collect();
        assert_eq!(names, vec!["session-01.md", "dev-setup.md", "Alpha.md", "zeta.md"]);
    }

    #[test]
    fn test_render_digest() {
        let docs = vec![
            doc("b.md", "---\ntitle: B\n---\nBee\n\n"),
            doc("a.md", "  Ay  "),
            doc("page.html", "<p>skip</p>"),
        ];
        let out = render_digest(&docs, "KB Digest", &[], date());
        let expected = "# KB Digest\n\n\
            Generated: 2025-09-15\n\n\
            This document merges all markdown files of the knowledge base into one reference.\n\n\
            ## Included Files (order)\n\
            1. a.md\n\
            2. b.md\n\
            \n---\n\
            \n\n---\n\n# Source: a.md\n\nAy\n\
            \n\n---\n\n# Source: b.md\n\n---\ntitle: B\n---\nBee\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_empty_digest() {
        let docs = vec![doc("only.html", "<p>x</p>")];
        let out = render_digest(&docs, "KB Digest", &[], date());
        assert_eq!(
            out,
            "# KB Digest\n\n_No knowledge base files found to merge on 2025-09-15._\n"
        );
    }
}
