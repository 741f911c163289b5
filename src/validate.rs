// src/validate.rs
// =============================================================================
// The public entry point: validate_folder().
//
// What happens here:
// 1. Start a timer
// 2. Build the Site Index for the directory (site::build_index)
// 3. Resolve every link and image against it (checker::resolve_site)
// 4. Stop the timer and turn the counts into a ValidationResult
//
// Broken links are not errors: they are reported through the callbacks and
// counted in the result. An Err from validate_folder means the run itself
// could not finish (unreadable file, callback failure, ...).
// =============================================================================

use crate::checker::{resolve_site, InvalidImage, InvalidLink, ResolveCounts};
use crate::site::{build_index, DiskFs, SiteFs};
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default number of files (or pages) processed at once.
pub const DEFAULT_CONCURRENCY: usize = 32;

type BoxedLinkCallback = Box<dyn FnMut(&InvalidLink) -> Result<()> + Send>;
type BoxedImageCallback = Box<dyn FnMut(&InvalidImage) -> Result<()> + Send>;

/// What to validate and who to tell about broken references.
///
/// ```no_run
/// use site_guardian::{validate_folder, ValidateOptions};
///
/// # async fn run() -> anyhow::Result<()> {
/// let result = validate_folder(
///     ValidateOptions::new("public").on_invalid_link(|broken| {
///         eprintln!("{}: {}", broken.file, broken.link);
///         Ok(())
///     }),
/// )
/// .await?;
/// assert!(result.ok);
/// # Ok(())
/// # }
/// ```
pub struct ValidateOptions {
    dir: PathBuf,
    on_invalid_link: Option<BoxedLinkCallback>,
    on_invalid_image: Option<BoxedImageCallback>,
    concurrency: usize,
    fs: Arc<dyn SiteFs>,
}

impl ValidateOptions {
    /// Validate the site in `dir`, reading from disk.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            on_invalid_link: None,
            on_invalid_image: None,
            concurrency: DEFAULT_CONCURRENCY,
            fs: Arc::new(DiskFs),
        }
    }

    /// Called once per broken link. Returning an error aborts the run.
    pub fn on_invalid_link(
        mut self,
        callback: impl FnMut(&InvalidLink) -> Result<()> + Send + 'static,
    ) -> Self {
        self.on_invalid_link = Some(Box::new(callback));
        self
    }

    /// Called once per broken image. Returning an error aborts the run.
    pub fn on_invalid_image(
        mut self,
        callback: impl FnMut(&InvalidImage) -> Result<()> + Send + 'static,
    ) -> Self {
        self.on_invalid_image = Some(Box::new(callback));
        self
    }

    /// Set how many files or pages are processed at once (at least 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Read the site from something other than the real disk.
    pub fn with_fs(mut self, fs: Arc<dyn SiteFs>) -> Self {
        self.fs = fs;
        self
    }
}

/// Summary of one validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True when nothing is broken
    pub ok: bool,

    pub checked_links: usize,
    pub checked_images: usize,
    pub total_checked: usize,

    pub broken_links: usize,
    pub broken_images: usize,
    pub total_broken: usize,

    /// Wall-clock time of the whole run, in milliseconds
    pub took_millis: f64,
}

impl ValidationResult {
    fn new(counts: ResolveCounts, took: Duration) -> Self {
        let total_broken = counts.broken_links + counts.broken_images;

        ValidationResult {
            ok: total_broken == 0,
            checked_links: counts.checked_links,
            checked_images: counts.checked_images,
            total_checked: counts.checked_links + counts.checked_images,
            broken_links: counts.broken_links,
            broken_images: counts.broken_images,
            total_broken,
            took_millis: took.as_secs_f64() * 1000.0,
        }
    }
}

/// Validates every internal link and local image of the site in `options.dir`.
pub async fn validate_folder(options: ValidateOptions) -> Result<ValidationResult> {
    let ValidateOptions {
        dir,
        on_invalid_link,
        on_invalid_image,
        concurrency,
        fs,
    } = options;

    let started = Instant::now();

    let index = Arc::new(build_index(fs, &dir, concurrency).await?);

    let mut on_invalid_link: BoxedLinkCallback = match on_invalid_link {
        Some(callback) => callback,
        None => Box::new(ignore_link),
    };
    let mut on_invalid_image: BoxedImageCallback = match on_invalid_image {
        Some(callback) => callback,
        None => Box::new(ignore_image),
    };

    let counts = resolve_site(
        index,
        concurrency,
        &mut *on_invalid_link,
        &mut *on_invalid_image,
    )
    .await?;

    let result = ValidationResult::new(counts, started.elapsed());

    info!(
        "Checked {} link(s) and {} image(s) under {} in {:.1}ms: {} broken",
        result.checked_links,
        result.checked_images,
        dir.display(),
        result.took_millis,
        result.total_broken
    );

    Ok(result)
}

fn ignore_link(_: &InvalidLink) -> Result<()> {
    Ok(())
}

fn ignore_image(_: &InvalidImage) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::MemoryFs;
    use std::sync::Mutex;

    #[test]
    fn test_result_totals() {
        let counts = ResolveCounts {
            checked_links: 5,
            broken_links: 2,
            checked_images: 3,
            broken_images: 0,
        };
        let result = ValidationResult::new(counts, Duration::from_millis(12));

        assert!(!result.ok);
        assert_eq!(result.total_checked, 8);
        assert_eq!(result.total_broken, 2);
        assert!((result.took_millis - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_concurrency_is_at_least_one() {
        let options = ValidateOptions::new("site").with_concurrency(0);
        assert_eq!(options.concurrency, 1);
        assert_eq!(options.dir, PathBuf::from("site"));
    }

    #[tokio::test]
    async fn test_validate_in_memory_site() {
        let fs = MemoryFs::new()
            .with_file(
                "/site/index.html",
                r##"<a href="/guide">Guide</a>
                    <a href="/guide/#setup">Setup</a>
                    <a href="#nowhere">Nowhere</a>
                    <img src="/logo.svg">"##,
            )
            .with_file("/site/guide/index.html", r#"<h2 id="setup">Setup</h2>"#)
            .with_file("/site/logo.svg", "<svg/>");

        let broken = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&broken);

        let result = validate_folder(
            ValidateOptions::new("/site")
                .with_fs(Arc::new(fs))
                .on_invalid_link(move |link| {
                    sink.lock().unwrap().push(link.clone());
                    Ok(())
                }),
        )
        .await
        .unwrap();

        assert!(!result.ok);
        assert_eq!(result.checked_links, 3);
        assert_eq!(result.checked_images, 1);
        assert_eq!(result.broken_links, 1);
        assert_eq!(result.broken_images, 0);

        let broken = broken.lock().unwrap();
        assert_eq!(
            *broken,
            vec![InvalidLink {
                file: "/index.html".to_string(),
                link: "#nowhere".to_string(),
                hash: "nowhere".to_string(),
            }]
        );
    }
}
