// src/site/mod.rs
// =============================================================================
// This module turns a directory of built HTML into a Site Index.
//
// Submodules:
// - fs: Listing and reading files (real disk or in-memory)
// - path: How file paths become page keys ("/blog/index.html" -> "/blog/")
// - index: Parallel extraction of every page into one SiteIndex
// =============================================================================

mod fs;
mod index;
mod path;

pub use fs::{DiskFs, MemoryFs, SiteFs};
pub use index::{build_index, image_pattern, FileMetadata, IndexError, SiteIndex, HTML_PATTERN};
pub use path::{page_path, site_relative};
