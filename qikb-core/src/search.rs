//! Search index entries built from parsed documents.

use crate::models::{to_slash, IndexEntry, ParsedDocument, SourceKind};
use crate::normalize::{html_to_text, to_plain_text, truncate_chars};
use crate::slug::{humanize_title, slugify};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::path::Path;

/// Settings shared by every entry of one index build
#[derive(Debug, Clone)]
pub struct IndexSettings<'a> {
    /// Directory site-relative paths are computed from
    pub content_base: &'a Path,
    pub max_body_chars: usize,
    /// Fallback for documents without an `updated` field
    pub build_date: NaiveDate,
}

/// Build the index record for one document.
///
/// Returns a warning message alongside the entry when the `updated` field
/// could not be read as a date and was kept verbatim.
pub fn build_index_entry(
    doc: &ParsedDocument,
    settings: &IndexSettings<'_>,
) -> (IndexEntry, Option<String>) {
    let fm = &doc.frontmatter;
    let stem = doc.source.stem();

    let title = fm
        .title()
        .map(str::to_string)
        .unwrap_or_else(|| humanize_title(&stem));
    let slug = default_slug(fm.slug(), &stem);
    let summary = fm
        .summary
        .clone()
        .or_else(|| fm.description.clone())
        .unwrap_or_default();

    let mut warning = None;
    let updated = match fm.updated.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        Some(raw) => match normalize_date(raw) {
            Some(date) => date,
            None => {
                warning = Some(format!("'updated' value '{}' is not a date, kept as-is", raw));
                raw.to_string()
            }
        },
        None => settings.build_date.format("%Y-%m-%d").to_string(),
    };

    let text = plain_text(doc);
    let body = truncate_chars(&text, settings.max_body_chars).to_string();

    let entry = IndexEntry {
        title,
        slug,
        summary,
        tags: fm.tags.clone(),
        updated,
        path: site_path(doc, settings.content_base),
        body,
    };
    (entry, warning)
}

/// Full plain-text rendering of a document body, before truncation
pub fn plain_text(doc: &ParsedDocument) -> String {
    match doc.source.kind {
        SourceKind::Markdown => to_plain_text(&doc.body),
        SourceKind::Html => html_to_text(&doc.body),
    }
}

fn default_slug(explicit: Option<&str>, stem: &str) -> String {
    if let Some(slug) = explicit {
        return slug.to_string();
    }
    let slug = slugify(stem);
    if slug.is_empty() {
        String::from("untitled")
    } else {
        slug
    }
}

/// `/`-prefixed path of the source relative to the content base, falling
/// back to its path under the discovery root
pub fn site_path(doc: &ParsedDocument, content_base: &Path) -> String {
    let rel = doc
        .source
        .path
        .strip_prefix(content_base)
        .unwrap_or(&doc.source.rel_path);
    format!("/{}", to_slash(rel))
}

/// Normalize a date-like string to `YYYY-MM-DD`
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y/%m/%d"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|dt| dt.date())
        })?;
    Some(date.format("%Y-%m-%d").to_string())
}
