//! # qikb-render
//!
//! Template rendering library for qikb.
//!
//! This crate turns wiki page and index models into HTML documents using
//! Askama.

pub mod templates;

pub use templates::{render_index, render_page, WikiIndexTemplate, WikiPageTemplate};
