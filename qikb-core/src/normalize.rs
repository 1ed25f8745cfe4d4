//! Body normalization: markdown to plain text for search, markdown to HTML
//! for wiki pages.
//!
//! Every function here is a pure text transform; the same input always
//! yields the same output.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options
}

/// Render markdown as continuous prose for keyword search.
///
/// Markup is dropped: headings and emphasis lose their markers, links and
/// images keep only their text, fenced code keeps its raw contents and raw
/// HTML keeps only its text. Blocks are separated by a blank line.
///
/// ```
/// use qikb_core::normalize::to_plain_text;
///
/// let text = to_plain_text("# Heading\n\nSome **bold** [link](/x) text");
/// assert_eq!(text, "Heading\n\nSome bold link text");
/// ```
pub fn to_plain_text(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());

    for event in Parser::new_ext(markdown, markdown_options()) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::Html(raw) | Event::InlineHtml(raw) => out.push_str(&html_fragment_text(&raw)),
            Event::SoftBreak | Event::HardBreak => push_space(&mut out),
            Event::Rule => push_break(&mut out, "\n\n"),
            Event::End(TagEnd::Item) | Event::End(TagEnd::TableRow) | Event::End(TagEnd::TableHead) => {
                push_break(&mut out, "\n")
            }
            Event::End(TagEnd::TableCell) => push_space(&mut out),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::CodeBlock
                | TagEnd::HtmlBlock
                | TagEnd::BlockQuote(_)
                | TagEnd::List(_)
                | TagEnd::Table,
            ) => push_break(&mut out, "\n\n"),
            _ => {}
        }
    }

    out.trim().to_string()
}

fn push_space(out: &mut String) {
    if !out.is_empty() && !out.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

fn push_break(out: &mut String, separator: &str) {
    let trimmed = out.trim_end_matches([' ', '\t', '\n', '\r']).len();
    out.truncate(trimmed);
    if !out.is_empty() {
        out.push_str(separator);
    }
}

/// Strip tags from an already-rendered HTML document and collapse whitespace.
pub fn html_to_text(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;

    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                result.push(' ');
            }
            '>' if in_tag => {
                in_tag = false;
                result.push(' ');
            }
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }

    decode_entities(&result)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Raw HTML embedded in markdown: tags removed, surrounding spacing kept.
fn html_fragment_text(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    decode_entities(&result)
}

fn decode_entities(text: &str) -> String {
    // `&amp;` goes last so escaped entities are not decoded twice
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Hard cut at `max_chars` Unicode scalar values.
///
/// The result is always a prefix of `text`; shorter input is returned whole.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Convert markdown to an HTML fragment.
///
/// Raw HTML in the source is never passed through: it is turned into text
/// and escaped like any other content, and blocks of it become paragraphs.
pub fn markdown_to_html(markdown: &str) -> String {
    let events = Parser::new_ext(markdown, markdown_options()).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::HtmlBlock) => Event::Start(Tag::Paragraph),
        Event::End(TagEnd::HtmlBlock) => Event::End(TagEnd::Paragraph),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_destination(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_destination(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut html_output, events);
    html_output
}

fn safe_destination(dest: CowStr<'_>) -> CowStr<'_> {
    let scheme = dest.trim_start().to_ascii_lowercase();
    if ["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|blocked| scheme.starts_with(blocked))
    {
        CowStr::Borrowed("#")
    } else {
        dest
    }
}
