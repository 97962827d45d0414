//! Utility functions and helpers.

pub mod http;

use url::Url;

/// Literal stored in place of a missing link by [`naive_join`].
pub const MISSING_LINK: &str = "null";

/// Join a link onto a base by plain string concatenation with a `/` in between.
///
/// No normalisation happens: a base ending in `/` yields `//`, and a missing
/// link becomes the literal `null`. Records written by earlier runs use this
/// exact shape.
pub fn naive_join(base: &str, href: Option<&str>) -> String {
    format!("{}/{}", base, href.unwrap_or(MISSING_LINK))
}

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}
