// Settings module
// Calendar board configuration, persisted as TOML

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the posts backend, e.g. `https://app.example.com`
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Time of day given to posts that had no schedule before being dropped
    pub default_hour: u32,
    pub default_minute: u32,
    /// Pointer travel (px) before a press turns into a drag
    pub activation_distance_px: f32,
    /// Items shown per day cell before the "+N more" indicator
    pub max_cell_previews: usize,
    pub first_day_of_week: u8, // 0 = Sunday
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            request_timeout_secs: 15,
            default_hour: 9,
            default_minute: 0,
            activation_distance_px: 8.0,
            max_cell_previews: 3,
            first_day_of_week: 0,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        if self.api_base_url.trim().is_empty() {
            return Err("API base URL cannot be empty".to_string());
        }

        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err("API base URL must start with http:// or https://".to_string());
        }

        if self.request_timeout_secs == 0 {
            return Err("Request timeout must be at least one second".to_string());
        }

        if self.default_hour > 23 {
            return Err("Default hour must be between 0 and 23".to_string());
        }

        if self.default_minute > 59 {
            return Err("Default minute must be between 0 and 59".to_string());
        }

        if !self.activation_distance_px.is_finite() || self.activation_distance_px < 0.0 {
            return Err("Activation distance must be a non-negative number".to_string());
        }

        if self.max_cell_previews == 0 {
            return Err("At least one preview per cell is required".to_string());
        }

        if self.first_day_of_week > 6 {
            return Err("First day of week must be between 0 (Sunday) and 6".to_string());
        }

        Ok(())
    }

    /// Time of day for posts dropped without an existing schedule
    pub fn default_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.default_hour, self.default_minute, 0)
            .unwrap_or(NaiveTime::MIN)
    }

    pub fn week_start(&self) -> Weekday {
        match self.first_day_of_week {
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            6 => Weekday::Sat,
            _ => Weekday::Sun,
        }
    }
}
