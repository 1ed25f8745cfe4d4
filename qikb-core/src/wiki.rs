//! Wiki page and index models.
//!
//! Rendering to HTML documents is done by `qikb-render`; this module only
//! decides titles, bodies, output paths and links.

use crate::models::{ParsedDocument, SourceKind, WikiIndex, WikiLink, WikiPage};
use crate::normalize::markdown_to_html;
use crate::slug::humanize_title;
use std::collections::BTreeMap;

/// Reserved output path of the generated index page
pub const INDEX_PAGE: &str = "index.html";

/// All wiki pages of one build plus the index listing them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiSite {
    pub pages: Vec<WikiPage>,
    pub index: WikiIndex,
}

/// Build the page model for one document written to `output_rel_path`.
///
/// Markdown bodies are converted with raw HTML escaped. HTML sources are
/// already markup and are passed through.
pub fn build_wiki_page(doc: &ParsedDocument, output_rel_path: &str, stylesheet: &str) -> WikiPage {
    let title = doc
        .frontmatter
        .title()
        .map(str::to_string)
        .unwrap_or_else(|| humanize_title(&doc.source.stem()));

    let body_html = match doc.source.kind {
        SourceKind::Markdown => markdown_to_html(&doc.body),
        SourceKind::Html => doc.body.clone(),
    };

    WikiPage {
        title,
        body_html,
        output_rel_path: output_rel_path.to_string(),
        source_path: doc.source.path.display().to_string(),
        back_link: back_link(output_rel_path),
        stylesheet: stylesheet.to_string(),
    }
}

/// Relative href from a page to the index at the wiki root
///
/// ```
/// use qikb_core::wiki::back_link;
///
/// assert_eq!(back_link("welcome.html"), "./index.html");
/// assert_eq!(back_link("articles/nested/welcome.html"), "../../index.html");
/// ```
pub fn back_link(output_rel_path: &str) -> String {
    let depth = output_rel_path.matches('/').count();
    if depth == 0 {
        format!("./{}", INDEX_PAGE)
    } else {
        format!("{}{}", "../".repeat(depth), INDEX_PAGE)
    }
}

/// Build the index listing every page, sorted by title then href.
///
/// When several pages share an output path only the last one is listed,
/// matching the file left on disk.
pub fn build_wiki_index(pages: &[WikiPage], title: &str, stylesheet: &str) -> WikiIndex {
    let mut by_path: BTreeMap<&str, &WikiPage> = BTreeMap::new();
    for page in pages {
        by_path.insert(page.output_rel_path.as_str(), page);
    }

    let mut links: Vec<WikiLink> = by_path
        .values()
        .map(|page| WikiLink {
            title: page.title.clone(),
            href: format!("./{}", page.output_rel_path),
        })
        .collect();
    links.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.href.cmp(&b.href)));

    WikiIndex {
        title: title.to_string(),
        stylesheet: stylesheet.to_string(),
        links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frontmatter, SourceDocument};
    use std::path::PathBuf;

    fn doc(rel: &str, kind: SourceKind, title: Option<&str>, body: &str) -> ParsedDocument {
        ParsedDocument {
            source: SourceDocument {
                path: PathBuf::from("/kb").join(rel),
                rel_path: PathBuf::from(rel),
                root: PathBuf::from("/kb"),
                kind,
                raw: body.as_bytes().to_vec(),
            },
            frontmatter: Frontmatter {
                title: title.map(String::from),
                ..Default::default()
            },
            body: body.to_string(),
        }
    }

    fn page(title: &str, path: &str) -> WikiPage {
        WikiPage {
            title: title.to_string(),
            body_html: String::new(),
            output_rel_path: path.to_string(),
            source_path: format!("/kb/{}", path),
            back_link: back_link(path),
            stylesheet: "/s.css".to_string(),
        }
    }

    #[test]
    fn test_markdown_page() {
        let d = doc("guides/getting-started.md", SourceKind::Markdown, None, "Some **bold** text");
        let page = build_wiki_page(&d, "guides/getting-started.html", "/wiki/css/wikistyle.css");

        assert_eq!(page.title, "Getting Started");
        assert_eq!(page.body_html, "<p>Some <strong>bold</strong> text</p>\n");
        assert_eq!(page.back_link, "../index.html");
        assert_eq!(page.stylesheet, "/wiki/css/wikistyle.css");
    }

    #[test]
    fn test_frontmatter_title_wins() {
        let d = doc("a.md", SourceKind::Markdown, Some("Alpha Page"), "");
        let page = build_wiki_page(&d, "a.html", "/s.css");
        assert_eq!(page.title, "Alpha Page");
        assert_eq!(page.back_link, "./index.html");
    }

    #[test]
    fn test_raw_html_in_markdown_is_escaped() {
        let d = doc("x.md", SourceKind::Markdown, None, "<script>alert(1)</script> & more");
        let page = build_wiki_page(&d, "x.html", "/s.css");
        assert!(!page.body_html.contains("<script>"));
        assert!(page.body_html.contains("&lt;script&gt;"));
        assert!(page.body_html.contains("&amp; more"));
    }

    #[test]
    fn test_html_source_passthrough() {
        let d = doc("legacy/old.html", SourceKind::Html, None, "<h2>Old</h2>");
        let page = build_wiki_page(&d, "legacy/old.html", "/s.css");
        assert_eq!(page.body_html, "<h2>Old</h2>");
        assert_eq!(page.title, "Old");
    }

    #[test]
    fn test_index_sorted_by_title() {
        let pages = vec![page("Beta", "b.html"), page("Alpha", "nested/a.html")];
        let index = build_wiki_index(&pages, "Knowledge Base", "/s.css");
        assert_eq!(
            index.links,
            vec![
                WikiLink {
                    title: "Alpha".into(),
                    href: "./nested/a.html".into()
                },
                WikiLink {
                    title: "Beta".into(),
                    href: "./b.html".into()
                },
            ]
        );
    }

    #[test]
    fn test_index_ties_broken_by_href() {
        let pages = vec![page("Same", "z.html"), page("Same", "a.html")];
        let index = build_wiki_index(&pages, "KB", "/s.css");
        assert_eq!(index.links[0].href, "./a.html");
        assert_eq!(index.links[1].href, "./z.html");
    }

    #[test]
    fn test_index_keeps_last_page_for_shared_path() {
        let pages = vec![page("First", "dup.html"), page("Second", "dup.html")];
        let index = build_wiki_index(&pages, "KB", "/s.css");
        assert_eq!(index.links.len(), 1);
        assert_eq!(index.links[0].title, "Second");
    }
}
