// src/checker/resolve.rs
// =============================================================================
// This module decides which links and images in the Site Index are broken.
//
// A link is broken when:
// - its target page is not in the index (also tried with a trailing "/"), or
// - it has a #fragment and the target page has no element with that id
//
// An image is broken when its src is not one of the image files we found.
//
// Every page is checked on its own, in parallel, against the same read-only
// index. The results are then handed to the caller's callbacks one page at a
// time, so callbacks never run concurrently with each other.
//
// Rust concepts:
// - Arc<SiteIndex>: One index shared by all workers, no copying
// - dyn FnMut: A callback that can update its own captured state
// =============================================================================

use crate::checker::link::{Link, LinkTarget};
use crate::site::{FileMetadata, IndexError, SiteIndex};
use anyhow::Result;
use futures::stream::{self, StreamExt};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A link that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InvalidLink {
    /// Site-relative file containing the link ("/index.html")
    pub file: String,
    /// The href exactly as written
    pub link: String,
    /// The fragment of the href, empty when there is none
    pub hash: String,
}

/// An image reference that does not match any image file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InvalidImage {
    pub file: String,
    pub image: String,
}

/// Result of checking one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageReport {
    pub checked_links: usize,
    pub checked_images: usize,
    pub invalid_links: Vec<InvalidLink>,
    pub invalid_images: Vec<InvalidImage>,
}

/// Totals over the whole site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveCounts {
    pub checked_links: usize,
    pub broken_links: usize,
    pub checked_images: usize,
    pub broken_images: usize,
}

impl ResolveCounts {
    fn add(&mut self, report: &PageReport) {
        self.checked_links += report.checked_links;
        self.broken_links += report.invalid_links.len();
        self.checked_images += report.checked_images;
        self.broken_images += report.invalid_images.len();
    }
}

pub type LinkCallback<'a> = dyn FnMut(&InvalidLink) -> Result<()> + Send + 'a;
pub type ImageCallback<'a> = dyn FnMut(&InvalidImage) -> Result<()> + Send + 'a;

// Checks whether `href`, found on the page `current_page`, resolves
//
// Examples (with pages "/" and "/docs/" where "/docs/" has id="install"):
//   "/docs"          -> true  (retried as "/docs/")
//   "/docs/#install" -> true
//   "/docs/#nope"    -> false (page exists, anchor does not)
//   "/missing"       -> false
pub fn link_resolves(index: &SiteIndex, current_page: &str, href: &str) -> bool {
    let link = Link::parse(href);

    let destination = match link.target {
        LinkTarget::CurrentPage => index.page(current_page),
        LinkTarget::Page(target) => index
            .page(target)
            .or_else(|| index.page(&format!("{target}/"))),
    };

    let Some(destination) = destination else {
        return false;
    };

    match link.fragment {
        Some(fragment) => destination.anchors.contains(fragment),
        None => true,
    }
}

/// Checks every link and image of one page.
pub fn resolve_page(index: &SiteIndex, page: &FileMetadata) -> PageReport {
    let invalid_links = page
        .outgoing_links
        .iter()
        .filter(|href| !link_resolves(index, &page.path, href))
        .map(|href| InvalidLink {
            file: page.file.clone(),
            link: href.clone(),
            hash: Link::parse(href).hash().to_string(),
        })
        .collect();

    let invalid_images = page
        .outgoing_images
        .iter()
        .filter(|image| !index.has_image(image))
        .map(|image| InvalidImage {
            file: page.file.clone(),
            image: image.clone(),
        })
        .collect();

    PageReport {
        checked_links: page.outgoing_links.len(),
        checked_images: page.outgoing_images.len(),
        invalid_links,
        invalid_images,
    }
}

// Checks the whole site
//
// Pages are resolved on the blocking pool, up to `concurrency` at a time.
// Each finished page report is passed to the callbacks right away. The first
// callback error stops the run and is returned as-is.
pub async fn resolve_site(
    index: Arc<SiteIndex>,
    concurrency: usize,
    on_invalid_link: &mut LinkCallback<'_>,
    on_invalid_image: &mut ImageCallback<'_>,
) -> Result<ResolveCounts> {
    let paths: Vec<String> = index.pages().map(|page| page.path.clone()).collect();

    let tasks = paths.into_iter().map(|path| {
        let index = Arc::clone(&index);
        tokio::task::spawn_blocking(move || {
            index
                .page(&path)
                .map(|page| resolve_page(&index, page))
                .unwrap_or_default()
        })
    });

    let mut reports = stream::iter(tasks).buffer_unordered(concurrency.max(1));
    let mut counts = ResolveCounts::default();

    while let Some(joined) = reports.next().await {
        let report = joined.map_err(IndexError::from)?;
        counts.add(&report);

        for invalid in &report.invalid_links {
            debug!("{}: broken link {}", invalid.file, invalid.link);
            on_invalid_link(invalid)?;
        }
        for invalid in &report.invalid_images {
            debug!("{}: missing image {}", invalid.file, invalid.image);
            on_invalid_image(invalid)?;
        }
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn page(path: &str, file: &str, anchors: &[&str], links: &[&str], images: &[&str]) -> FileMetadata {
        let set = |values: &[&str]| values.iter().map(|v| v.to_string()).collect();
        FileMetadata {
            path: path.to_string(),
            file: file.to_string(),
            anchors: set(anchors),
            outgoing_links: set(links),
            outgoing_images: set(images),
        }
    }

    fn sample_index() -> SiteIndex {
        let mut index = SiteIndex::default();
        index
            .insert_page(page(
                "/",
                "/index.html",
                &["top"],
                &["/docs", "/docs/#install", "/docs/#nope", "/missing", "#top", "#gone", "#"],
                &["/img/logo.png", "/img/missing.png", "./relative.png"],
            ))
            .unwrap();
        index
            .insert_page(page("/docs/", "/docs/index.html", &["install"], &[], &[]))
            .unwrap();
        index
            .insert_page(page("/about.html", "/about.html", &["Team"], &[], &[]))
            .unwrap();
        index.insert_image("/img/logo.png".to_string());
        index
    }

    #[test]
    fn test_link_to_directory_without_slash() {
        let index = sample_index();
        assert!(link_resolves(&index, "/", "/docs"));
        assert!(link_resolves(&index, "/", "/docs/"));
    }

    #[test]
    fn test_link_to_missing_page() {
        let index = sample_index();
        assert!(!link_resolves(&index, "/", "/missing"));
        assert!(!link_resolves(&index, "/", "/missing/"));
    }

    #[test]
    fn test_link_with_anchor() {
        let index = sample_index();
        assert!(link_resolves(&index, "/", "/docs/#install"));
        assert!(link_resolves(&index, "/", "/docs#install"));
        assert!(!link_resolves(&index, "/", "/docs/#nope"));
    }

    #[test]
    fn test_anchor_match_is_case_sensitive() {
        let index = sample_index();
        assert!(link_resolves(&index, "/", "/about.html#Team"));
        assert!(!link_resolves(&index, "/", "/about.html#team"));
    }

    #[test]
    fn test_same_page_fragment() {
        let index = sample_index();
        assert!(link_resolves(&index, "/", "#top"));
        assert!(link_resolves(&index, "/", "#"));
        assert!(!link_resolves(&index, "/", "#gone"));
        // resolved against the current page, not the home page
        assert!(link_resolves(&index, "/docs/", "#install"));
        assert!(!link_resolves(&index, "/docs/", "#top"));
    }

    #[test]
    fn test_resolve_page_report() {
        let index = sample_index();
        let home = index.page("/").unwrap();
        let report = resolve_page(&index, home);

        assert_eq!(report.checked_links, 7);
        assert_eq!(report.checked_images, 3);

        let broken: Vec<_> = report
            .invalid_links
            .iter()
            .map(|l| (l.link.as_str(), l.hash.as_str()))
            .collect();
        assert_eq!(
            broken,
            vec![("#gone", "gone"), ("/docs/#nope", "nope"), ("/missing", "")]
        );

        let images: Vec<_> = report.invalid_images.iter().map(|i| i.image.as_str()).collect();
        // relative image paths are compared verbatim against the image set
        assert_eq!(images, vec!["./relative.png", "/img/missing.png"]);
        assert!(report.invalid_images.iter().all(|i| i.file == "/index.html"));
    }

    #[tokio::test]
    async fn test_resolve_site_counts_and_callbacks() {
        let index = Arc::new(sample_index());
        let mut links = Vec::new();
        let mut images = Vec::new();

        let counts = resolve_site(
            index,
            4,
            &mut |link: &InvalidLink| {
                links.push(link.clone());
                Ok(())
            },
            &mut |image: &InvalidImage| {
                images.push(image.clone());
                Ok(())
            },
        )
        .await
        .unwrap();

        assert_eq!(
            counts,
            ResolveCounts {
                checked_links: 7,
                broken_links: 3,
                checked_images: 3,
                broken_images: 2,
            }
        );
        assert_eq!(links.len(), 3);
        assert_eq!(images.len(), 2);
    }

    #[tokio::test]
    async fn test_callback_error_stops_the_run() {
        let index = Arc::new(sample_index());
        let mut calls = 0;

        let result = resolve_site(
            index,
            1,
            &mut |_: &InvalidLink| {
                calls += 1;
                Err(anyhow!("stop"))
            },
            &mut |_: &InvalidImage| Ok(()),
        )
        .await;

        assert_eq!(result.unwrap_err().to_string(), "stop");
        assert_eq!(calls, 1);
    }
}
