// Test fixtures - reusable test data
// Provides consistent posts and a scriptable backend across test files

#![allow(dead_code)]

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use post_calendar::models::scheduled_item::{PostStatus, ScheduledItem};
use post_calendar::services::posts::{ApiError, PostApi};
use std::sync::Mutex;

/// Sample dates for testing
pub mod dates {
    use super::*;

    pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    pub fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        day(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    /// March 2024, the month most tests look at
    pub fn march_2024() -> NaiveDate {
        day(2024, 3, 1)
    }
}

/// Sample posts for testing
pub mod posts {
    use super::*;

    /// Scheduled for 2024-03-10 14:30
    pub fn launch() -> ScheduledItem {
        ScheduledItem::builder()
            .id("launch")
            .title("Product launch")
            .status(PostStatus::Scheduled)
            .scheduled_at(dates::local(2024, 3, 10, 14, 30))
            .platform("instagram")
            .platform("linkedin")
            .build()
            .unwrap()
    }

    /// Never scheduled
    pub fn draft() -> ScheduledItem {
        ScheduledItem::builder()
            .id("draft")
            .title("Behind the scenes")
            .platform("tiktok")
            .build()
            .unwrap()
    }

    /// `count` posts on the same day, an hour apart from 08:00
    pub fn busy_day(count: usize, d: u32) -> Vec<ScheduledItem> {
        (0..count)
            .map(|i| {
                ScheduledItem::builder()
                    .id(format!("busy-{}", i))
                    .title(format!("Busy {}", i))
                    .status(PostStatus::Scheduled)
                    .scheduled_at(dates::local(2024, 3, d, 8 + i as u32, 0))
                    .build()
                    .unwrap()
            })
            .collect()
    }
}

/// How the fake backend answers reschedule calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Ok,
    OkWithBody,
    HttpError(u16),
}

/// In-memory backend that records every reschedule call
pub struct FakePostApi {
    posts: Vec<ScheduledItem>,
    reply: Reply,
    calls: Mutex<Vec<(String, DateTime<Local>)>>,
}

impl FakePostApi {
    pub fn new(posts: Vec<ScheduledItem>, reply: Reply) -> Self {
        Self {
            posts,
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, DateTime<Local>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl PostApi for FakePostApi {
    fn list_posts(&self) -> Result<Vec<ScheduledItem>, ApiError> {
        Ok(self.posts.clone())
    }

    fn reschedule(
        &self,
        id: &str,
        scheduled_at: DateTime<Local>,
    ) -> Result<Option<ScheduledItem>, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push((id.to_string(), scheduled_at));

        match self.reply {
            Reply::Ok => Ok(None),
            Reply::OkWithBody => {
                let mut post = self
                    .posts
                    .iter()
                    .find(|post| post.id == id)
                    .cloned()
                    .ok_or_else(|| ApiError::Status {
                        status: 404,
                        body: "not found".to_string(),
                    })?;
                post.scheduled_at = Some(scheduled_at);
                post.status = PostStatus::Scheduled;
                Ok(Some(post))
            }
            Reply::HttpError(status) => Err(ApiError::Status {
                status,
                body: "backend unavailable".to_string(),
            }),
        }
    }
}
