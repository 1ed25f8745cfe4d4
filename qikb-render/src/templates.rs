//! Askama template definitions.

use askama::Template;
use qikb_core::{WikiIndex, WikiLink, WikiPage};

/// Standalone HTML document for one knowledge-base page
#[derive(Template)]
#[template(path = "page.html")]
pub struct WikiPageTemplate {
    pub title: String,
    pub stylesheet: String,
    /// Rendered body, inserted without escaping
    pub body_html: String,
    pub back_link: String,
}

impl From<&WikiPage> for WikiPageTemplate {
    fn from(page: &WikiPage) -> Self {
        Self {
            title: page.title.clone(),
            stylesheet: page.stylesheet.clone(),
            body_html: page.body_html.clone(),
            back_link: page.back_link.clone(),
        }
    }
}

/// Index page listing every generated page
#[derive(Template)]
#[template(path = "index.html")]
pub struct WikiIndexTemplate {
    pub title: String,
    pub stylesheet: String,
    pub links: Vec<WikiLink>,
}

impl From<&WikiIndex> for WikiIndexTemplate {
    fn from(index: &WikiIndex) -> Self {
        Self {
            title: index.title.clone(),
            stylesheet: index.stylesheet.clone(),
            links: index.links.clone(),
        }
    }
}

/// Render a page to a complete HTML document
pub fn render_page(page: &WikiPage) -> askama::Result<String> {
    WikiPageTemplate::from(page).render()
}

/// Render the index to a complete HTML document
pub fn render_index(index: &WikiIndex) -> askama::Result<String> {
    WikiIndexTemplate::from(index).render()
}
