//! Init command implementation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = include_str!("../../../qikb.yml.example");

/// Initialize a new knowledge base with a config and a sample article
pub fn init_project(path: Option<&Path>) -> Result<()> {
    let root = path.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(root).with_context(|| format!("Failed to create {:?}", root))?;

    write_config(root)?;
    scaffold_content(root)?;

    println!("✓ qikb initialized in {:?}", root);
    println!("  - Edit qikb.yml to point at your content roots");
    println!("  - Write articles in kb/articles/ and run `qikb build`");
    Ok(())
}

fn write_config(root: &Path) -> Result<()> {
    let config_path = root.join("qikb.yml");
    if config_path.exists() {
        println!("qikb.yml already exists at {:?}", config_path);
        return Ok(());
    }

    fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {:?}", config_path))?;
    println!("Created {:?}", config_path);
    Ok(())
}

fn scaffold_content(root: &Path) -> Result<()> {
    let kb = root.join("kb");
    let articles = kb.join("articles");
    let policies = kb.join("policies");

    for dir in [&kb, &articles, &policies] {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    }

    // Starter article
    let sample = articles.join("welcome.md");
    if !sample.exists() {
        fs::write(&sample, sample_article())
            .with_context(|| format!("Failed to write {:?}", sample))?;
        println!("Created {:?}", sample);
    }

    Ok(())
}

fn sample_article() -> &'static str {
    r#"---
title: Welcome
summary: How this knowledge base is organized
tags: [onboarding]
category: guides
---

# Welcome

Articles live in `kb/articles/`, policies in `kb/policies/`. Every file may
start with a front matter block carrying `title`, `slug`, `summary`, `tags`
and `updated`.

Run `qikb build` to write the search index and the wiki, or `qikb verify`
to check the content without writing anything.
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use qikb_core::Config;

    #[test]
    fn test_scaffold_is_buildable_config() {
        let dir = tempfile::tempdir().unwrap();
        init_project(Some(dir.path())).unwrap();

        let config = Config::from_file(dir.path().join("qikb.yml")).unwrap();
        assert_eq!(config.content_base(), dir.path().join("kb"));
        assert!(dir.path().join("kb/articles/welcome.md").exists());
    }

    #[test]
    fn test_existing_config_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("qikb.yml"), "collisions: fail\n").unwrap();
        init_project(Some(dir.path())).unwrap();

        let contents = fs::read_to_string(dir.path().join("qikb.yml")).unwrap();
        assert_eq!(contents, "collisions: fail\n");
    }
}
