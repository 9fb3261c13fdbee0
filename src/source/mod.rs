//! Remote source client for the sites' content API
//!
//! This module covers everything that talks to the remote side:
//! - Endpoint layout per content kind
//! - The configured HTTP client
//! - Retrying transport failures
//! - Wrapping responses as presence-checked records

mod client;
mod records;
mod retry;

pub use client::{build_http_client, SourceClient};
pub use records::Record;
pub use retry::{retry, RetryExhausted, RetryPolicy};

use std::fmt;

/// Content kinds exposed by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Movie,
    Gallery,
    Model,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Gallery => "gallery",
            Self::Model => "model",
        }
    }

    /// Items per list page
    pub fn page_size(&self) -> u32 {
        match self {
            Self::Movie | Self::Gallery => 60,
            Self::Model => 40,
        }
    }

    /// Field of a list response holding the page's items
    pub fn collection_field(&self) -> &'static str {
        match self {
            Self::Movie | Self::Gallery => "galleries",
            Self::Model => "models",
        }
    }

    /// Path and query of the list endpoint for a 1-based page
    pub fn list_path(&self, page: u32) -> String {
        let size = self.page_size();
        match self {
            Self::Movie => format!(
                "/api/movies?galleryType=MOVIE&first={size}&page={page}&staffSelectionHead=false&tabId=0&order=DATE&direction=ASC&type=MOVIE"
            ),
            Self::Gallery => format!(
                "/api/galleries?galleryType=GALLERY&first={size}&page={page}&staffSelectionHead=false&tabId=0&order=DATE&direction=ASC&type=GALLERY"
            ),
            Self::Model => {
                format!("/api/models?first={size}&page={page}&order=DATE&direction=ASC")
            }
        }
    }

    /// Path and query of the detail endpoint
    ///
    /// `slug` must already be URL-safe; the date fragment only applies to
    /// galleries and movies.
    pub fn detail_path(&self, slug: &str, date: Option<&str>) -> String {
        match (self, date) {
            (Self::Movie, Some(date)) => format!("/api/movie?name={slug}&date={date}"),
            (Self::Movie, None) => format!("/api/movie?name={slug}"),
            (Self::Gallery, Some(date)) => format!("/api/gallery?name={slug}&date={date}"),
            (Self::Gallery, None) => format!("/api/gallery?name={slug}"),
            (Self::Model, _) => format!("/api/model?name={slug}&order=DATE&direction=DESC"),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
