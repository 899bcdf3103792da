// Scheduled item module
// A social post as held in the calendar's client-side cache

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a post, as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PostStatus {
    #[serde(alias = "draft")]
    Draft,
    #[serde(alias = "scheduled")]
    Scheduled,
    #[serde(alias = "published")]
    Published,
    #[serde(alias = "failed")]
    Failed,
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PostStatus::Draft => "draft",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Published => "published",
            PostStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// One schedulable post.
///
/// Owned by the backend; the calendar keeps a read/write copy of the items
/// in the visible range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledItem {
    pub id: String,
    pub title: String,
    pub status: PostStatus,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub platforms: Vec<String>,
}

impl ScheduledItem {
    /// Create a draft item with no schedule
    ///
    /// # Examples
    /// ```
    /// use post_calendar::models::scheduled_item::{PostStatus, ScheduledItem};
    ///
    /// let item = ScheduledItem::new("p-1", "Launch teaser").unwrap();
    /// assert_eq!(item.status, PostStatus::Draft);
    /// assert!(item.scheduled_at.is_none());
    /// ```
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Result<Self, String> {
        let item = Self {
            id: id.into(),
            title: title.into(),
            status: PostStatus::Draft,
            scheduled_at: None,
            platforms: Vec::new(),
        };
        item.validate()?;
        Ok(item)
    }

    /// Create a builder for constructing items with optional fields
    pub fn builder() -> ScheduledItemBuilder {
        ScheduledItemBuilder::new()
    }

    /// Validate the item
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Post id cannot be empty".to_string());
        }

        if self.title.trim().is_empty() {
            return Err("Post title cannot be empty".to_string());
        }

        Ok(())
    }

    /// Local calendar date the item is scheduled on, if any
    pub fn scheduled_date(&self) -> Option<NaiveDate> {
        self.scheduled_at.map(|at| at.date_naive())
    }

    pub fn is_scheduled_on(&self, date: NaiveDate) -> bool {
        self.scheduled_date() == Some(date)
    }
}

/// Builder for creating items with optional fields
pub struct ScheduledItemBuilder {
    id: Option<String>,
    title: Option<String>,
    status: PostStatus,
    scheduled_at: Option<DateTime<Local>>,
    platforms: Vec<String>,
}

impl ScheduledItemBuilder {
    pub fn new() -> Self {
        Self {
            id: None,
            title: None,
            status: PostStatus::Draft,
            scheduled_at: None,
            platforms: Vec::new(),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    pub fn scheduled_at(mut self, at: DateTime<Local>) -> Self {
        self.scheduled_at = Some(at);
        self
    }

    /// Add a target platform tag; repeated tags are kept once
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        let platform = platform.into();
        if !self.platforms.contains(&platform) {
            self.platforms.push(platform);
        }
        self
    }

    pub fn build(self) -> Result<ScheduledItem, String> {
        let id = self.id.ok_or("Post id is required")?;
        let title = self.title.ok_or("Post title is required")?;

        let item = ScheduledItem {
            id,
            title,
            status: self.status,
            scheduled_at: self.scheduled_at,
            platforms: self.platforms,
        };

        item.validate()?;
        Ok(item)
    }
}

impl Default for ScheduledItemBuilder {
    fn default() -> Self {
        Self::new()
    }
}
