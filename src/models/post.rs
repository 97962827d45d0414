//! Post data structure.

use serde::{Deserialize, Serialize};

/// Column labels of the record table, in storage order.
pub const RECORD_HEADER: [&str; 8] = [
    "recordedAt",
    "number",
    "status",
    "title",
    "deadline",
    "selectedDate",
    "file",
    "url",
];

/// One row of the announcements listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Listing-assigned sequence label
    pub number: String,

    /// Alt text of the status icon, if the row has one
    pub status: Option<String>,

    /// Announcement title (deduplication key)
    pub title: String,

    /// Application deadline text
    pub deadline: String,

    /// Result announcement text
    pub selected_date: String,

    /// Attachment descriptor text
    pub file: String,

    /// Link to the detail page
    pub url: String,
}

impl Post {
    /// Build the record table row for this post.
    ///
    /// The timestamp goes first; a missing status is stored as an empty cell.
    pub fn to_row(&self, recorded_at: &str) -> Vec<String> {
        vec![
            recorded_at.to_string(),
            self.number.clone(),
            self.status.clone().unwrap_or_default(),
            self.title.clone(),
            self.deadline.clone(),
            self.selected_date.clone(),
            self.file.clone(),
            self.url.clone(),
        ]
    }
}
