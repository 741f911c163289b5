// src/checker/link.rs
// =============================================================================
// This module turns a raw href value into something we can resolve.
//
// An href like "/docs/intro#install" has two parts:
// - the target page ("/docs/intro")
// - the fragment, the id of an element on that page ("install")
//
// An href like "#install" has no target at all: it points at the page
// it appears on.
//
// Rust concepts:
// - Enums with data: LinkTarget is either "this page" or "some other page"
// - Lifetimes: Link borrows from the href string instead of copying it
// =============================================================================

/// Where a link points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget<'a> {
    /// Empty target (`#section` or a bare `#`): the page the link is on
    CurrentPage,
    /// Any other target, kept exactly as written
    Page(&'a str),
}

/// A parsed href: a target plus an optional fragment.
///
/// An empty fragment is stored as `None`, so `"/a#"` and `"/a"` both mean
/// "page /a, no anchor check".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link<'a> {
    pub target: LinkTarget<'a>,
    pub fragment: Option<&'a str>,
}

impl<'a> Link<'a> {
    /// Splits an href on `#`.
    ///
    /// Everything before the first `#` is the target. The fragment runs up
    /// to the next `#` (if any), so `"/a#b#c"` has fragment `"b"`.
    pub fn parse(href: &'a str) -> Self {
        let mut parts = href.split('#');
        // split() always yields at least one item
        let target = parts.next().unwrap_or_default();
        let fragment = parts.next().filter(|fragment| !fragment.is_empty());

        let target = if target.is_empty() {
            LinkTarget::CurrentPage
        } else {
            LinkTarget::Page(target)
        };

        Link { target, fragment }
    }

    /// The fragment as reported to callers, empty when there is none.
    pub fn hash(&self) -> &'a str {
        self.fragment.unwrap_or("")
    }
}
