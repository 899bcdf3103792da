//! Backend contract for listing and rescheduling posts.
//!
//! The calendar only needs two calls from the backend: the posts in the
//! visible range and a partial update that moves one post. [`PostApi`] is the
//! seam the rest of the crate talks to; [`HttpPostApi`] is the real client.

mod client;
pub mod payload;

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::models::scheduled_item::ScheduledItem;

pub use client::HttpPostApi;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("background worker failed: {0}")]
    Worker(String),
}

impl ApiError {
    /// Short text suitable for a toast
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(err) if err.is_timeout() => "The server took too long to respond".to_string(),
            ApiError::Network(_) => "Could not reach the server".to_string(),
            ApiError::Status { status, .. } => format!("The server rejected the change (HTTP {})", status),
            ApiError::Decode(_) => "The server sent an unexpected response".to_string(),
            ApiError::InvalidRequest(reason) => reason.clone(),
            ApiError::Worker(_) => "The change could not be sent".to_string(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait PostApi: Send + Sync {
    /// Fetch all posts the calendar can show
    fn list_posts(&self) -> Result<Vec<ScheduledItem>, ApiError>;

    /// Move a post to a new time and mark it scheduled.
    ///
    /// Returns the server's copy of the post when the response carries one.
    fn reschedule(
        &self,
        id: &str,
        scheduled_at: DateTime<Local>,
    ) -> Result<Option<ScheduledItem>, ApiError>;
}
