//! Title-based deduplication against the record table.
//!
//! A post counts as new when its exact title has never been recorded.
//! Comparison is case-sensitive and whitespace-exact; titles are already
//! trimmed by extraction.

use std::collections::HashSet;

use crate::models::Post;

/// Keep the posts whose title is not in `existing`, preserving order.
///
/// Repeated titles within `posts` are kept as they appear.
pub fn filter_new(posts: Vec<Post>, existing: &HashSet<String>) -> Vec<Post> {
    posts
        .into_iter()
        .filter(|post| !existing.contains(&post.title))
        .collect()
}
