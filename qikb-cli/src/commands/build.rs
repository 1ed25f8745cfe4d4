//! Build command implementation.

use crate::Target;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use include_dir::{include_dir, Dir};
use qikb_core::wiki::{build_wiki_index, INDEX_PAGE};
use qikb_core::{BuildReport, Config, Diagnostic, KbBuild, KbBuilder, WikiPage};
use qikb_render::{render_index, render_page};
use std::fs;
use std::path::Path;

// Embed static assets (CSS) at compile time
static STATIC_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/../static");

/// Options from the `build` command line
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Targets to emit; empty means whatever the config enables
    pub only: Vec<Target>,
    /// Overrides `build_date` from the config
    pub date: Option<NaiveDate>,
}

impl BuildOptions {
    fn wants(&self, target: Target, config: &Config) -> bool {
        if !self.only.is_empty() {
            return self.only.contains(&target);
        }
        match target {
            Target::Index => config.search.enabled,
            Target::Wiki => config.wiki.enabled,
            Target::Digest => config.digest.enabled,
        }
    }
}

/// Build the knowledge base described by the config file
pub fn build_kb(config_path: &Path, options: &BuildOptions) -> Result<BuildReport> {
    tracing::info!("Loading config from {:?}", config_path);
    let config = Config::from_file(config_path).context("Failed to load configuration")?;
    build_kb_with_config(config, options)
}

/// Build from an already loaded config, writing every requested artifact
pub fn build_kb_with_config(config: Config, options: &BuildOptions) -> Result<BuildReport> {
    let mut builder = KbBuilder::new(config);
    if let Some(date) = options.date {
        builder = builder.with_build_date(date);
    }
    tracing::info!("Build date: {}", builder.build_date());

    let mut build = builder.build().context("Failed to build knowledge base")?;
    let config = build.config().clone();

    if options.wants(Target::Index, &config) {
        write_search_index(&mut build)?;
    } else {
        tracing::info!("Search index disabled; skipping");
    }

    if options.wants(Target::Wiki, &config) {
        write_wiki(&mut build)?;
    } else {
        tracing::info!("Wiki disabled; skipping");
    }

    if options.wants(Target::Digest, &config) {
        write_digest(&mut build)?;
    }

    let report = build.report;
    for skipped in &report.skipped {
        tracing::info!(
            "  skipped {} ({}): {}",
            skipped.source_path,
            skipped.stage,
            skipped.reason
        );
    }
    tracing::info!("✓ {}", report.summary());
    Ok(report)
}

/// Write the JSON search index (full overwrite)
fn write_search_index(build: &mut KbBuild) -> Result<()> {
    let entries = build.search_index();
    let output = build.config().search_output();

    let mut json = serde_json::to_string_pretty(&entries)?;
    json.push('\n');
    write_required(&mut build.report, &output, json.as_bytes())?;
    tracing::info!("✓ Wrote {} index entries to {:?}", entries.len(), output);
    Ok(())
}

/// Write every wiki page, then the index page listing the ones written
fn write_wiki(build: &mut KbBuild) -> Result<()> {
    let site = build.wiki();
    let config = build.config().clone();
    let output_dir = config.wiki_output_dir();
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;

    let mut written: Vec<WikiPage> = Vec::with_capacity(site.pages.len());
    for page in &site.pages {
        let target = output_dir.join(&page.output_rel_path);
        match render_page(page) {
            Ok(html) => {
                if write_page(&mut build.report, &page.source_path, &target, html.as_bytes()) {
                    tracing::debug!("Rendered: {}", page.output_rel_path);
                    written.push(page.clone());
                }
            }
            Err(e) => build
                .report
                .skip(page.source_path.clone(), "render", e.to_string()),
        }
    }

    // Index is written last so it always wins its reserved path
    let index = build_wiki_index(&written, &site.index.title, &site.index.stylesheet);
    let index_html = render_index(&index).context("Failed to render wiki index")?;
    write_required(
        &mut build.report,
        &output_dir.join(INDEX_PAGE),
        index_html.as_bytes(),
    )?;

    if config.wiki.copy_assets {
        if let Err(e) = extract_embedded_static(&output_dir) {
            build.report.push(Diagnostic::error(
                "emit.assets",
                format!("Failed to copy bundled assets: {:#}", e),
                Some(output_dir.display().to_string()),
            ));
        }
    }

    tracing::info!("✓ Wrote {} wiki pages to {:?}", written.len(), output_dir);
    Ok(())
}

/// Write the merged markdown digest
fn write_digest(build: &mut KbBuild) -> Result<()> {
    let digest = build.digest();
    let output = build.config().digest_output();

    write_required(&mut build.report, &output, digest.as_bytes())?;
    tracing::info!("✓ Wrote digest to {:?}", output);
    Ok(())
}

fn write_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

/// Write an aggregate artifact. Any failure aborts the run.
fn write_required(report: &mut BuildReport, path: &Path, contents: &[u8]) -> Result<()> {
    write_file(path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    report.written += 1;
    Ok(())
}

/// Write one wiki page. Failures are recorded against the page's source
/// document instead of aborting the run.
fn write_page(report: &mut BuildReport, source_path: &str, path: &Path, contents: &[u8]) -> bool {
    match write_file(path, contents) {
        Ok(()) => {
            report.written += 1;
            true
        }
        Err(e) => {
            report.push(Diagnostic::error(
                "emit.write",
                format!("Failed to write {}: {}", path.display(), e),
                Some(source_path.to_string()),
            ));
            report.skip(source_path, "write", e.to_string());
            false
        }
    }
}

fn extract_embedded_static(dest: &Path) -> Result<()> {
    // The include_dir crate stores full paths relative to the embedded root
    for entry in STATIC_ASSETS.entries() {
        extract_entry(entry, dest)?;
    }
    Ok(())
}

fn extract_entry(entry: &include_dir::DirEntry, dest: &Path) -> Result<()> {
    match entry {
        include_dir::DirEntry::Dir(dir) => {
            for sub_entry in dir.entries() {
                extract_entry(sub_entry, dest)?;
            }
        }
        include_dir::DirEntry::File(file) => {
            let target = dest.join(file.path());
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, file.contents())
                .with_context(|| format!("Failed to write embedded static file to {:?}", target))?;
        }
    }
    Ok(())
}
