//! Visible date ranges and the day cells derived from the post list.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use super::day_cell::DayCell;
use crate::models::scheduled_item::ScheduledItem;
use crate::utils::date::{first_of_month, last_of_month, start_of_week};

/// Whole weeks covering the month of `anchor`
pub fn month_dates(anchor: NaiveDate, week_start: Weekday) -> Vec<NaiveDate> {
    let first = start_of_week(first_of_month(anchor), week_start);
    let last = last_of_month(anchor);

    let mut dates = Vec::with_capacity(42);
    let mut day = first;
    while day <= last || dates.len() % 7 != 0 {
        dates.push(day);
        day += Duration::days(1);
    }
    dates
}

pub fn week_dates(anchor: NaiveDate, week_start: Weekday) -> Vec<NaiveDate> {
    let first = start_of_week(anchor, week_start);
    (0..7).map(|offset| first + Duration::days(offset)).collect()
}

/// Flags that depend on the view rather than on the posts
#[derive(Debug, Clone, Copy)]
pub struct CellFlags {
    /// Any date in the month being shown; `None` marks every cell in-month
    pub visible_month: Option<NaiveDate>,
    pub selected: Option<NaiveDate>,
    pub today: NaiveDate,
}

/// Bucket posts into one cell per date.
///
/// A post lands in the cell of its local scheduled date and nowhere else;
/// unscheduled posts and posts outside `dates` appear in no cell.
pub fn build_cells<'a, I>(dates: &[NaiveDate], items: I, flags: CellFlags) -> Vec<DayCell>
where
    I: IntoIterator<Item = &'a ScheduledItem>,
{
    let mut buckets: HashMap<NaiveDate, Vec<ScheduledItem>> = HashMap::new();
    for item in items {
        if let Some(date) = item.scheduled_date() {
            buckets.entry(date).or_default().push(item.clone());
        }
    }

    dates
        .iter()
        .map(|&date| {
            let mut items = buckets.remove(&date).unwrap_or_default();
            items.sort_by(|a, b| {
                a.scheduled_at
                    .cmp(&b.scheduled_at)
                    .then_with(|| a.title.cmp(&b.title))
                    .then_with(|| a.id.cmp(&b.id))
            });

            DayCell {
                date,
                items,
                in_current_month: flags.visible_month.map_or(true, |month| {
                    month.year() == date.year() && month.month() == date.month()
                }),
                selected: flags.selected == Some(date),
                today: flags.today == date,
            }
        })
        .collect()
}
