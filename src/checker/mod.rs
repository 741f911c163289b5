// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - html: Extracts anchors, links and images from an HTML page
// - link: Splits an href into target page + fragment
// - resolve: Checks every link and image against the Site Index
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of our application can use.
// =============================================================================

mod html;
mod link;
mod resolve;

// Re-export public items from submodules
// This lets users write `checker::resolve_site()` instead of
// `checker::resolve::resolve_site()`
pub use html::{
    extract_from_document, extract_metadata, is_internal_link, is_local_image, ExtractedRefs,
    IMAGE_EXTENSIONS,
};
pub use link::{Link, LinkTarget};
pub use resolve::{
    link_resolves, resolve_page, resolve_site, ImageCallback, InvalidImage, InvalidLink,
    LinkCallback, PageReport, ResolveCounts,
};
