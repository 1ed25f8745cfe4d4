//! # qikb-core
//!
//! Core library for the qikb knowledge-base build pipeline.
//!
//! This crate discovers content files, parses their front matter,
//! normalizes bodies to plain text or HTML and assembles the search index,
//! wiki and digest models. Writing artifacts is left to the caller.

pub mod builder;
pub mod config;
pub mod digest;
pub mod discovery;
pub mod frontmatter;
pub mod models;
pub mod normalize;
pub mod report;
pub mod search;
pub mod slug;
pub mod wiki;

pub use builder::{BuildError, DocumentError, KbBuild, KbBuilder};
pub use config::Config;
pub use models::{
    Frontmatter, IndexEntry, ParsedDocument, SourceDocument, SourceKind, WikiIndex, WikiLink,
    WikiPage,
};
pub use report::{BuildReport, Diagnostic, DiagnosticSeverity};
pub use slug::{slugify, CollisionPolicy};
pub use wiki::WikiSite;
