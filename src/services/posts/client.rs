use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};
use reqwest::blocking::{Client, Response};
use std::time::Duration;

use super::payload::{parse_post_list, parse_updated_post, RescheduleBody};
use super::{ApiError, PostApi};
use crate::models::scheduled_item::ScheduledItem;
use crate::models::settings::Settings;

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Blocking HTTP client for the posts backend
pub struct HttpPostApi {
    client: Client,
    base_url: String,
}

impl HttpPostApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(anyhow!("API base URL must use http or https: {}", base_url));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build posts API HTTP client")?;

        Ok(Self { client, base_url })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            &settings.api_base_url,
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    fn posts_url(&self) -> String {
        format!("{}/api/posts", self.base_url)
    }

    fn post_url(&self, id: &str) -> String {
        format!("{}/api/posts/{}", self.base_url, urlencoding::encode(id))
    }

    fn read_success_body(response: Response) -> Result<String, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body: String = response
                .text()
                .unwrap_or_default()
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.text()?)
    }
}

impl PostApi for HttpPostApi {
    fn list_posts(&self) -> Result<Vec<ScheduledItem>, ApiError> {
        let url = self.posts_url();
        log::debug!("Fetching posts from {}", url);

        let response = self.client.get(&url).send()?;
        let body = Self::read_success_body(response)?;
        let items = parse_post_list(&body)?;

        log::info!("Loaded {} posts", items.len());
        Ok(items)
    }

    fn reschedule(
        &self,
        id: &str,
        scheduled_at: DateTime<Local>,
    ) -> Result<Option<ScheduledItem>, ApiError> {
        if id.trim().is_empty() {
            return Err(ApiError::InvalidRequest("Post id cannot be empty".to_string()));
        }

        let url = self.post_url(id);
        log::debug!("Rescheduling post {} to {}", id, scheduled_at.to_rfc3339());

        let response = self
            .client
            .patch(&url)
            .json(&RescheduleBody::new(scheduled_at))
            .send()?;
        let body = Self::read_success_body(response)?;

        Ok(parse_updated_post(&body))
    }
}
