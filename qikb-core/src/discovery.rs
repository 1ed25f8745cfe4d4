//! Content file discovery under the configured roots.

use crate::models::{to_slash, SourceKind};
use crate::report::Diagnostic;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A candidate content file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// Path relative to `root`
    pub rel_path: PathBuf,
    pub root: PathBuf,
    pub kind: SourceKind,
}

/// Result of scanning every root
#[derive(Debug, Default)]
pub struct Discovery {
    /// Files in processing order: roots in the order given, sorted paths
    /// within each root
    pub files: Vec<DiscoveredFile>,
    /// Number of roots that existed and were scanned to completion
    pub roots_scanned: usize,
    /// Number of configured roots that exist on disk
    pub roots_present: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Discover content files beneath `roots`.
///
/// A missing root is skipped with a warning. An I/O error while walking a
/// root abandons that root (none of its files are kept) and is reported
/// as an error; the other roots are still scanned.
pub fn discover(roots: &[PathBuf], extensions: &[String], ignore_patterns: &[String]) -> Discovery {
    let mut discovery = Discovery::default();
    let ignores = compile_ignore_patterns(ignore_patterns, &mut discovery.diagnostics);
    let extensions: HashSet<String> = extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
        .collect();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for root in roots {
        if !root.is_dir() {
            discovery.diagnostics.push(Diagnostic::warning(
                "discovery.missing_root",
                "Content root not found, skipping",
                Some(root.display().to_string()),
            ));
            continue;
        }
        discovery.roots_present += 1;

        match scan_root(root, &extensions, &ignores) {
            Ok(files) => {
                tracing::debug!("Found {} files under {:?}", files.len(), root);
                discovery.roots_scanned += 1;
                for file in files {
                    let key = std::fs::canonicalize(&file.path).unwrap_or_else(|_| file.path.clone());
                    if seen.insert(key) {
                        discovery.files.push(file);
                    } else {
                        tracing::debug!("{:?} already discovered under an earlier root", file.path);
                    }
                }
            }
            Err(err) => {
                discovery.diagnostics.push(Diagnostic::error(
                    "discovery.walk",
                    format!("Failed to scan content root, skipping it: {}", err),
                    Some(root.display().to_string()),
                ));
            }
        }
    }

    discovery
}

fn scan_root(
    root: &Path,
    extensions: &HashSet<String>,
    ignores: &[Regex],
) -> Result<Vec<DiscoveredFile>, walkdir::Error> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if !extensions.contains(&ext) {
            continue;
        }
        let Some(kind) = SourceKind::from_extension(&ext) else {
            continue;
        };

        let rel_path = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();
        let rel = to_slash(&rel_path);
        if ignores.iter().any(|re| re.is_match(&rel)) {
            tracing::debug!("Ignoring {} due to ignore_patterns", rel);
            continue;
        }

        files.push(DiscoveredFile {
            path: entry.path().to_path_buf(),
            rel_path,
            root: root.to_path_buf(),
            kind,
        });
    }

    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn compile_ignore_patterns(patterns: &[String], diagnostics: &mut Vec<Diagnostic>) -> Vec<Regex> {
    let mut compiled = Vec::new();
    for pat in patterns {
        match Regex::new(pat) {
            Ok(re) => compiled.push(re),
            Err(err) => diagnostics.push(Diagnostic::warning(
                "config.ignore_pattern",
                format!("Invalid ignore pattern '{}': {}", pat, err),
                None,
            )),
        }
    }
    compiled
}
