// src/site/index.rs
// =============================================================================
// This module builds the Site Index: every page of the site with its
// anchors, links and images, plus the list of image files that exist.
//
// How it works:
// 1. Ask the SiteFs for every *.html file and every image file under root
// 2. Read + parse + extract each HTML file on tokio's blocking thread pool
//    (parsing is CPU work, so it must not run on the async worker threads)
// 3. Collect the results one by one and insert them into the page map
//
// Only the collecting loop touches the map, so no Mutex is needed even
// though extraction runs in parallel.
//
// Rust concepts:
// - Arc: Shared ownership, so every worker can use the same SiteFs
// - spawn_blocking: Runs synchronous code on a separate thread pool
// - Streams: buffer_unordered() limits how many files are in flight
// =============================================================================

use crate::checker::{extract_metadata, IMAGE_EXTENSIONS};
use crate::site::path::{page_path, site_relative};
use crate::site::SiteFs;
use anyhow::Result;
use futures::stream::{self, StreamExt};
use log::{debug, info};
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Glob pattern for pages.
pub const HTML_PATTERN: &str = "**/*.html";

/// Glob pattern for images, built from [`IMAGE_EXTENSIONS`].
pub fn image_pattern() -> String {
    format!("**/*.{{{}}}", IMAGE_EXTENSIONS.join(","))
}

/// Structural problems found while building the index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("`{first}` and `{second}` both map to page `{page}`")]
    DuplicatePage {
        page: String,
        first: String,
        second: String,
    },
    #[error("`{}` is not inside the site root `{}`", .file.display(), .root.display())]
    OutsideRoot { file: PathBuf, root: PathBuf },
    #[error("extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Metadata of one HTML page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
    /// Page path, the key links are resolved against ("/blog/")
    pub path: String,
    /// Site-relative file the page was read from ("/blog/index.html")
    pub file: String,
    pub anchors: BTreeSet<String>,
    pub outgoing_links: BTreeSet<String>,
    pub outgoing_images: BTreeSet<String>,
}

/// The whole site: pages by page path, plus every image file that exists.
///
/// Built once by [`build_index`] and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteIndex {
    pages: BTreeMap<String, FileMetadata>,
    images: BTreeSet<String>,
}

impl SiteIndex {
    pub fn page(&self, path: &str) -> Option<&FileMetadata> {
        self.pages.get(path)
    }

    pub fn pages(&self) -> impl Iterator<Item = &FileMetadata> {
        self.pages.values()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn has_image(&self, image: &str) -> bool {
        self.images.contains(image)
    }

    pub fn images(&self) -> impl Iterator<Item = &str> {
        self.images.iter().map(String::as_str)
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    // Two files claiming the same page path is an error rather than a
    // silent overwrite, so the outcome never depends on task ordering.
    pub(crate) fn insert_page(&mut self, metadata: FileMetadata) -> Result<(), IndexError> {
        match self.pages.entry(metadata.path.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(metadata);
                Ok(())
            }
            Entry::Occupied(existing) => {
                let mut files = [existing.get().file.clone(), metadata.file];
                files.sort();
                let [first, second] = files;
                Err(IndexError::DuplicatePage {
                    page: metadata.path,
                    first,
                    second,
                })
            }
        }
    }

    pub(crate) fn insert_image(&mut self, image: String) {
        self.images.insert(image);
    }
}

// Builds the index for the site under `root`
//
// Parameters:
//   fs: where files are listed and read from
//   root: the site's output directory
//   concurrency: how many HTML files may be processed at once
//
// Returns: the finished SiteIndex, or the first error hit along the way
pub async fn build_index(fs: Arc<dyn SiteFs>, root: &Path, concurrency: usize) -> Result<SiteIndex> {
    info!("Indexing site at {}", root.display());

    // Directory walking is blocking I/O too
    let (html_files, image_files) = {
        let fs = Arc::clone(&fs);
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<_> {
            let html = fs.glob(&root, HTML_PATTERN)?;
            let images = fs.glob(&root, &image_pattern())?;
            Ok((html, images))
        })
        .await
        .map_err(IndexError::from)??
    };

    let mut index = SiteIndex::default();
    for image in &image_files {
        index.insert_image(site_relative(root, image)?);
    }

    let page_count = html_files.len();
    let tasks = html_files.into_iter().map(|file| {
        let fs = Arc::clone(&fs);
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || load_page(fs.as_ref(), &root, &file))
    });

    // Run up to `concurrency` extractions at once and collect them as they
    // finish (not in file order, hence "unordered")
    let mut loaded = stream::iter(tasks).buffer_unordered(concurrency.max(1));
    while let Some(joined) = loaded.next().await {
        let metadata = joined.map_err(IndexError::from)??;
        index.insert_page(metadata)?;
    }

    info!(
        "Indexed {} page(s) and {} image(s)",
        page_count,
        index.image_count()
    );

    Ok(index)
}

// Reads, parses and extracts a single page. Runs on the blocking pool.
fn load_page(fs: &dyn SiteFs, root: &Path, file: &Path) -> Result<FileMetadata> {
    let html = fs.read_to_string(file)?;
    let file = site_relative(root, file)?;
    let refs = extract_metadata(&html);

    debug!(
        "{}: {} anchor(s), {} link(s), {} image(s)",
        file,
        refs.anchors.len(),
        refs.outgoing_links.len(),
        refs.outgoing_images.len()
    );

    Ok(FileMetadata {
        path: page_path(&file),
        file,
        anchors: refs.anchors,
        outgoing_links: refs.outgoing_links,
        outgoing_images: refs.outgoing_images,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::MemoryFs;

    fn memory_site() -> Arc<dyn SiteFs> {
        Arc::new(
            MemoryFs::new()
                .with_file(
                    "/site/index.html",
                    r#"<h1 id="home">Home</h1>
                       <a href="/blog/">Blog</a>
                       <a href="https://example.com">External</a>
                       <img src="/img/logo.png">"#,
                )
                .with_file("/site/blog/index.html", r#"<h2 id="latest">Latest</h2>"#)
                .with_file("/site/blog/first.html", "<p>first</p>")
                .with_file("/site/img/logo.png", "")
                .with_file("/site/img/photo.jpg", "")
                .with_file("/site/.hidden/index.html", "<p>ignored</p>"),
        )
    }

    #[test]
    fn test_image_pattern() {
        assert_eq!(image_pattern(), "**/*.{png,jpg,jpeg,gif,svg,webp}");
    }

    #[tokio::test]
    async fn test_build_index_pages_and_images() {
        let index = build_index(memory_site(), Path::new("/site"), 4).await.unwrap();

        let paths: Vec<_> = index.pages().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["/", "/blog/", "/blog/first.html"]);

        let images: Vec<_> = index.images().collect();
        assert_eq!(images, vec!["/img/logo.png", "/img/photo.jpg"]);
    }

    #[tokio::test]
    async fn test_build_index_page_metadata() {
        let index = build_index(memory_site(), Path::new("/site"), 1).await.unwrap();

        let home = index.page("/").unwrap();
        assert_eq!(home.file, "/index.html");
        assert!(home.anchors.contains("home"));
        assert_eq!(home.outgoing_links.len(), 1);
        assert!(home.outgoing_links.contains("/blog/"));
        assert!(home.outgoing_images.contains("/img/logo.png"));

        let blog = index.page("/blog/").unwrap();
        assert_eq!(blog.file, "/blog/index.html");
    }

    #[tokio::test]
    async fn test_build_index_is_independent_of_concurrency() {
        let sequential = build_index(memory_site(), Path::new("/site"), 1).await.unwrap();
        let parallel = build_index(memory_site(), Path::new("/site"), 16).await.unwrap();
        assert_eq!(sequential, parallel);
    }

    #[tokio::test]
    async fn test_build_index_empty_site() {
        let fs: Arc<dyn SiteFs> = Arc::new(MemoryFs::new());
        let index = build_index(fs, Path::new("/site"), 4).await.unwrap();
        assert_eq!(index.page_count(), 0);
        assert_eq!(index.image_count(), 0);
    }

    #[test]
    fn test_duplicate_page_is_rejected() {
        let mut index = SiteIndex::default();
        let page = |file: &str| FileMetadata {
            path: "/a/".to_string(),
            file: file.to_string(),
            ..FileMetadata::default()
        };

        index.insert_page(page("/a/index.html")).unwrap();
        let err = index.insert_page(page("/a.html")).unwrap_err();

        match err {
            IndexError::DuplicatePage { page, first, second } => {
                assert_eq!(page, "/a/");
                assert_eq!(first, "/a.html");
                assert_eq!(second, "/a/index.html");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
