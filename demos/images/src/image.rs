//! The image record served by `GET /api/images`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One uploaded image
///
/// Documents come straight out of the server's database, so the id may
/// arrive as `_id` and the unique id as `uniqueid`. Everything except the
/// id is optional on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default, alias = "uniqueid")]
    pub unique_id: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Image {
    /// An image with only its id set
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: String::new(),
            filename: String::new(),
            unique_id: String::new(),
            timestamp: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// What to show for this image in a list: the filename, else the url
    pub fn label(&self) -> &str {
        if !self.filename.is_empty() {
            &self.filename
        } else {
            &self.url
        }
    }
}
