// src/site/fs.rs
// =============================================================================
// This module is the only place that touches the filesystem.
//
// The indexer never calls std::fs or walks directories itself. It asks a
// `SiteFs` to:
// - list the files under a root that match a glob pattern
// - read one file as UTF-8 text
//
// Two implementations ship with the crate:
// - DiskFs: the real thing, built on `walkdir` + `globset`
// - MemoryFs: a map of path -> contents, for tests and embedding
//
// Rust concepts:
// - Traits: A shared interface that several types implement
// - Send + Sync: The indexer reads from worker threads, so implementations
//   must be safe to share between threads
// =============================================================================

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Read-only access to the files of a built site.
pub trait SiteFs: Send + Sync {
    /// Lists files under `root` whose root-relative path matches `pattern`.
    ///
    /// Hidden files and directories (a name starting with `.`) below `root`
    /// are never listed. Results are sorted.
    fn glob(&self, root: &Path, pattern: &str) -> Result<Vec<PathBuf>>;

    /// Reads a whole file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> Result<String>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFs;

impl SiteFs for DiskFs {
    fn glob(&self, root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        let matcher = compile_glob(pattern)?;
        let mut files = Vec::new();

        // filter_entry prunes hidden directories without descending into them.
        // Depth 0 is the root itself, which may legitimately be hidden.
        let walker = WalkDir::new(root)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden_name(entry.file_name()));

        for entry in walker {
            let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
            // Symlinked files count (their target is checked), symlinked
            // directories are not descended into since follow_links is off
            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if !is_file {
                continue;
            }

            if let Ok(relative) = entry.path().strip_prefix(root) {
                if matcher.is_match(relative) {
                    files.push(entry.into_path());
                }
            }
        }

        files.sort();
        Ok(files)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

/// An in-memory site, keyed by full path.
///
/// ```
/// use site_guardian::site::MemoryFs;
///
/// let fs = MemoryFs::new()
///     .with_file("/site/index.html", r#"<a href="/about/">About</a>"#)
///     .with_file("/site/about/index.html", "<h1>About</h1>");
/// assert_eq!(fs.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a file and returns the updated fs.
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl SiteFs for MemoryFs {
    fn glob(&self, root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        let matcher = compile_glob(pattern)?;

        // BTreeMap iterates in key order, so the result is already sorted
        let files = self
            .files
            .keys()
            .filter(|path| match path.strip_prefix(root) {
                Ok(relative) => !has_hidden_component(relative) && matcher.is_match(relative),
                Err(_) => false,
            })
            .cloned()
            .collect();

        Ok(files)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file in memory fs"))
            .with_context(|| format!("failed to read {}", path.display()))
    }
}

// `*` stays inside one path segment and `**` crosses directories, the same
// way shell globs behave
fn compile_glob(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid glob pattern {pattern:?}"))?;
    Ok(glob.compile_matcher())
}

fn is_hidden_name(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn has_hidden_component(relative: &Path) -> bool {
    relative.components().any(|component| match component {
        Component::Normal(name) => is_hidden_name(name),
        _ => false,
    })
}
