// src/site/path.rs
// =============================================================================
// Path normalization: how an on-disk file becomes a key in the site index.
//
//   <root>/index.html        -> file "/index.html"       page "/"
//   <root>/blog/index.html   -> file "/blog/index.html"  page "/blog/"
//   <root>/blog/post.html    -> file "/blog/post.html"   page "/blog/post.html"
//   <root>/img/logo.png      -> image "/img/logo.png"
//
// Links written in the HTML ("/blog/", "/blog") are looked up against the
// page form, so index.html files must collapse to their directory.
// =============================================================================

use crate::site::IndexError;
use std::path::{Component, Path};

const INDEX_FILE: &str = "index.html";

/// Strips `root` from `file` and renders the rest with `/` separators and a
/// leading `/`.
///
/// Only normal path components are kept, so `.` segments and platform
/// separators never leak into the key.
pub fn site_relative(root: &Path, file: &Path) -> Result<String, IndexError> {
    let relative = file
        .strip_prefix(root)
        .map_err(|_| IndexError::OutsideRoot {
            file: file.to_path_buf(),
            root: root.to_path_buf(),
        })?;

    let mut rendered = String::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            rendered.push('/');
            rendered.push_str(&part.to_string_lossy());
        }
    }

    if rendered.is_empty() {
        rendered.push('/');
    }

    Ok(rendered)
}

/// Turns a site-relative file path into a page path.
///
/// `.../index.html` collapses to `.../` and runs of `/` collapse to one.
pub fn page_path(site_relative: &str) -> String {
    let collapsed = collapse_separators(site_relative);

    match collapsed.strip_suffix(INDEX_FILE) {
        Some(directory) if directory.ends_with('/') => directory.to_string(),
        _ => collapsed,
    }
}

fn collapse_separators(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    let mut previous_was_slash = false;

    for ch in path.chars() {
        let is_slash = ch == '/';
        if !(is_slash && previous_was_slash) {
            collapsed.push(ch);
        }
        previous_was_slash = is_slash;
    }

    collapsed
}
