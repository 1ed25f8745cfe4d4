//! Batch build logic - discovery, parsing and per-target assembly.

use crate::{
    config::Config,
    digest::render_digest,
    discovery::{discover, DiscoveredFile},
    frontmatter::{split_document, FrontmatterError},
    models::*,
    report::{BuildReport, Diagnostic},
    search::{build_index_entry, IndexSettings},
    slug::{wiki_output_path, Resolution, SlugResolver},
    wiki::{build_wiki_index, build_wiki_page, WikiSite, INDEX_PAGE},
};
use chrono::NaiveDate;
use std::fs;
use thiserror::Error;

/// Errors that abort the whole run
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("No configured content root exists: {0}")]
    NoContentRoots(String),

    #[error("None of the {0} content roots could be read")]
    RootsUnreadable(usize),
}

/// Errors that drop a single document from the run
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Read(#[from] std::io::Error),

    #[error("File is not valid UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),

    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

impl DocumentError {
    /// Pipeline stage that failed, as recorded in the report
    pub fn stage(&self) -> &'static str {
        match self {
            DocumentError::Read(_) => "read",
            DocumentError::Decode(_) => "decode",
            DocumentError::Frontmatter(_) => "frontmatter",
        }
    }
}

const GENERATED_INDEX_OWNER: &str = "(generated index)";

/// Main knowledge-base builder
pub struct KbBuilder {
    config: Config,
    build_date: NaiveDate,
}

impl KbBuilder {
    /// The build date is taken from the config, or today when unset
    pub fn new(config: Config) -> Self {
        let build_date = config
            .build_date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        Self { config, build_date }
    }

    pub fn with_build_date(mut self, date: NaiveDate) -> Self {
        self.build_date = date;
        self
    }

    pub fn build_date(&self) -> NaiveDate {
        self.build_date
    }

    /// Discover and parse every document.
    ///
    /// Per-document failures are recorded in the report and the document
    /// is left out. Fails only when no content root could be scanned.
    pub fn build(&self) -> Result<KbBuild, BuildError> {
        let roots = self.config.content_roots();
        let discovery = discover(
            &roots,
            &self.config.content.extensions,
            &self.config.content.ignore_patterns,
        );

        let mut report = BuildReport::new();
        for diagnostic in discovery.diagnostics {
            report.push(diagnostic);
        }

        if discovery.roots_present == 0 {
            let listed = roots
                .iter()
                .map(|r| r.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(BuildError::NoContentRoots(listed));
        }
        if discovery.roots_scanned == 0 {
            return Err(BuildError::RootsUnreadable(discovery.roots_present));
        }

        report.discovered = discovery.files.len();
        tracing::info!(
            "Discovered {} files in {} content roots",
            report.discovered,
            discovery.roots_scanned
        );

        let mut documents = Vec::with_capacity(discovery.files.len());
        for file in &discovery.files {
            match load_document(file) {
                Ok(doc) => {
                    tracing::debug!("Parsed {}", doc.source.path.display());
                    documents.push(doc);
                }
                Err(e) => report.skip(file.path.display().to_string(), e.stage(), e.to_string()),
            }
        }
        report.parsed = documents.len();

        tracing::info!("Parsed {} documents", report.parsed);

        Ok(KbBuild {
            documents,
            report,
            build_date: self.build_date,
            config: self.config.clone(),
        })
    }
}

/// Read and split one discovered file
pub fn load_document(file: &DiscoveredFile) -> Result<ParsedDocument, DocumentError> {
    let raw = fs::read(&file.path)?;
    let text = std::str::from_utf8(&raw)?;
    let (frontmatter, body) = split_document(file.kind, text)?;

    Ok(ParsedDocument {
        source: SourceDocument {
            path: file.path.clone(),
            rel_path: file.rel_path.clone(),
            root: file.root.clone(),
            kind: file.kind,
            raw,
        },
        frontmatter,
        body,
    })
}

/// Parsed documents of one run, ready to be turned into output models.
///
/// Each target method records its collisions in `report`, so each should
/// be called once per run.
#[derive(Debug)]
pub struct KbBuild {
    /// Documents in processing order
    pub documents: Vec<ParsedDocument>,
    pub report: BuildReport,
    pub build_date: NaiveDate,
    config: Config,
}

impl KbBuild {
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Search index entries in processing order, with slug collisions
    /// resolved by the configured policy
    pub fn search_index(&mut self) -> Vec<IndexEntry> {
        let content_base = self.config.content_base();
        let settings = IndexSettings {
            content_base: &content_base,
            max_body_chars: self.config.search.max_body_chars,
            build_date: self.build_date,
        };
        let mut resolver = SlugResolver::new(self.config.collisions);
        let mut entries = Vec::with_capacity(self.documents.len());

        for doc in &self.documents {
            let owner = doc.source.path.display().to_string();
            let (mut entry, warning) = build_index_entry(doc, &settings);
            if let Some(message) = warning {
                self.report.push(Diagnostic::warning(
                    "frontmatter.updated",
                    message,
                    Some(owner.clone()),
                ));
            }

            let resolution = resolver.claim_slug(&entry.slug, &owner);
            let Some(slug) = record_collision(&mut self.report, "collision.slug", &resolution, &owner)
            else {
                continue;
            };
            entry.slug = slug;
            entries.push(entry);
        }

        tracing::info!("Built {} search index entries", entries.len());
        entries
    }

    /// Wiki pages and the index listing them, with output path collisions
    /// resolved by the configured policy
    pub fn wiki(&mut self) -> WikiSite {
        let stylesheet = self.config.wiki.stylesheet.clone();
        let mut resolver = SlugResolver::new(self.config.collisions);
        resolver.claim_path(INDEX_PAGE, GENERATED_INDEX_OWNER);

        let mut pages = Vec::with_capacity(self.documents.len());
        for doc in &self.documents {
            let owner = doc.source.path.display().to_string();
            let wanted = to_slash(&wiki_output_path(&doc.source.rel_path, doc.source.kind));

            let resolution = match resolver.claim_path(&wanted, &owner) {
                // The generated index is written last and would replace the page
                Resolution::Shared {
                    key,
                    previous_owner,
                } if previous_owner == GENERATED_INDEX_OWNER => Resolution::Rejected {
                    key,
                    previous_owner,
                },
                other => other,
            };
            let Some(path) = record_collision(&mut self.report, "collision.path", &resolution, &owner)
            else {
                continue;
            };
            pages.push(build_wiki_page(doc, &path, &stylesheet));
        }

        let index = build_wiki_index(&pages, &self.config.wiki.index_title, &stylesheet);
        tracing::info!("Built {} wiki pages", pages.len());
        WikiSite { pages, index }
    }

    /// Merged markdown digest of all markdown documents
    pub fn digest(&self) -> String {
        render_digest(
            &self.documents,
            &self.config.digest.title,
            &self.config.digest.order_hints,
            self.build_date,
        )
    }
}

/// Report a collision, returning the key to use or `None` when the
/// document must be dropped
fn record_collision(
    report: &mut BuildReport,
    code: &str,
    resolution: &Resolution,
    owner: &str,
) -> Option<String> {
    match resolution {
        Resolution::Unique(key) => Some(key.clone()),
        Resolution::Renamed {
            key,
            original,
            previous_owner,
        } => {
            report.push(Diagnostic::warning(
                code,
                format!(
                    "'{}' is already used by {}, renamed to '{}'",
                    original, previous_owner, key
                ),
                Some(owner.to_string()),
            ));
            Some(key.clone())
        }
        Resolution::Shared {
            key,
            previous_owner,
        } => {
            report.push(Diagnostic::warning(
                code,
                format!("'{}' is also used by {}", key, previous_owner),
                Some(owner.to_string()),
            ));
            Some(key.clone())
        }
        Resolution::Rejected {
            key,
            previous_owner,
        } => {
            let message = format!("'{}' is already used by {}", key, previous_owner);
            report.push(Diagnostic::error(code, message.clone(), Some(owner.to_string())));
            report.skip(owner, "collision", message);
            None
        }
    }
}
