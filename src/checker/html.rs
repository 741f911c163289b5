// src/checker/html.rs
// =============================================================================
// This module pulls the three things we care about out of an HTML page:
// - anchors: every id="..." value (things a #fragment can point at)
// - outgoing links: href values of <a> tags that stay inside the site
// - outgoing images: src values of <img> tags that point at local image files
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser), so it never fails:
//   broken markup is repaired the same way a browser would repair it
//
// Rust concepts:
// - BTreeSet: A sorted set, so output is the same on every run
// - LazyLock: A static that is built the first time it is used
// - Closures: Anonymous functions (|x| ...) used as filters
// =============================================================================

use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Image file extensions we know how to check (without the leading dot).
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "svg", "webp"];

// Selectors are constant and known to be valid, so failing to parse one is a
// programmer error, not something a user can trigger.
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("*[id]").expect("anchor selector is valid"));
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("link selector is valid"));
static IMAGE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[src]").expect("image selector is valid"));

/// Everything extracted from a single HTML document.
///
/// Values are kept exactly as they appear in the source (after HTML entity
/// decoding), so they can be reported back to the user verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedRefs {
    pub anchors: BTreeSet<String>,
    pub outgoing_links: BTreeSet<String>,
    pub outgoing_images: BTreeSet<String>,
}

// Parses HTML content and extracts its anchors, links and images
//
// Example:
//   html = r#"<h2 id="usage">Usage</h2><a href="/docs#usage">Docs</a>"#
//   anchors = {"usage"}, outgoing_links = {"/docs#usage"}
pub fn extract_metadata(html: &str) -> ExtractedRefs {
    let document = Html::parse_document(html);
    extract_from_document(&document)
}

/// Same as [`extract_metadata`] for a document that is already parsed.
pub fn extract_from_document(document: &Html) -> ExtractedRefs {
    ExtractedRefs {
        anchors: collect_attribute(document, &ANCHOR_SELECTOR, "id", |_| true),
        outgoing_links: collect_attribute(document, &LINK_SELECTOR, "href", is_internal_link),
        outgoing_images: collect_attribute(document, &IMAGE_SELECTOR, "src", is_local_image),
    }
}

// Collects the non-empty values of `attribute` on every element matching
// `selector`, keeping only the values accepted by `keep`
fn collect_attribute(
    document: &Html,
    selector: &Selector,
    attribute: &str,
    keep: impl Fn(&str) -> bool,
) -> BTreeSet<String> {
    document
        .select(selector)
        .filter_map(|element| element.value().attr(attribute))
        .filter(|value| !value.is_empty() && keep(*value))
        .map(str::to_string)
        .collect()
}

/// Returns true for hrefs we check ourselves.
///
/// Absolute http(s) URLs point at other sites and are skipped. Everything
/// else (relative paths, `#fragments`, `mailto:`, `//host/...`, `?query`)
/// is treated as internal.
pub fn is_internal_link(href: &str) -> bool {
    !(href.starts_with("http://") || href.starts_with("https://"))
}

/// Returns true for src values that point at a local image file.
///
/// The value must be root-relative (`/img/a.png`) or relative
/// (`./a.png`, `../a.png`) and end with a known image extension.
/// The extension check is case-sensitive: `/a.PNG` is not checked.
pub fn is_local_image(src: &str) -> bool {
    let local = src.starts_with('/') || src.starts_with('.');

    local
        && IMAGE_EXTENSIONS.iter().any(|extension| {
            src.strip_suffix(extension)
                .is_some_and(|rest| rest.ends_with('.'))
        })
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does "*[id]" mean?
//    - "*" matches any element, "[id]" requires an id attribute
//    - So headings, divs, sections... all count as anchors, not just <a>
//
// 2. Why BTreeSet instead of HashSet?
//    - Both remove duplicates
//    - BTreeSet also keeps items sorted, which makes JSON output and test
//      expectations stable
//
// 3. What is strip_suffix?
//    - "/logo.png".strip_suffix("png") returns Some("/logo.")
//    - We then check the remaining text ends with '.', so "/png" alone
//      (no dot before the extension) does not count as an image
// -----------------------------------------------------------------------------
