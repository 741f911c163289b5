// src/lib.rs
// =============================================================================
// site-guardian checks a directory of built HTML (the output of a static
// site generator) for broken internal links, missing anchors and missing
// images. It never fetches remote URLs and never modifies files.
//
// Modules:
// - site: Finds pages and images on disk and builds the Site Index
// - checker: Extracts references from HTML and resolves them
// - validate: The validate_folder() entry point tying both together
// =============================================================================

pub mod checker;
pub mod site;
mod validate;

pub use checker::{InvalidImage, InvalidLink};
pub use validate::{validate_folder, ValidateOptions, ValidationResult, DEFAULT_CONCURRENCY};
