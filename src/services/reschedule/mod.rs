// Reschedule service
// Computes where a dropped post lands in time

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Timelike};

use crate::models::scheduled_item::ScheduledItem;

/// A move the calendar wants the backend to apply
#[derive(Debug, Clone, PartialEq)]
pub struct RescheduleRequest {
    pub item_id: String,
    pub target_date: NaiveDate,
    pub scheduled_at: DateTime<Local>,
    pub previous: Option<DateTime<Local>>,
}

impl RescheduleRequest {
    /// Build the request for dropping `item` on `target_date`.
    ///
    /// Returns `None` when the resulting wall-clock time does not exist in the
    /// local time zone (a DST gap).
    pub fn for_drop(
        item: &ScheduledItem,
        target_date: NaiveDate,
        default_time: NaiveTime,
    ) -> Option<Self> {
        let scheduled_at = rescheduled_time(item.scheduled_at, target_date, default_time)?;
        Some(Self {
            item_id: item.id.clone(),
            target_date,
            scheduled_at,
            previous: item.scheduled_at,
        })
    }
}

/// Time of day a post keeps when it moves to another date.
///
/// Hour and minute come from the existing schedule; unscheduled posts get
/// `default_time`.
pub fn preserved_time_of_day(
    existing: Option<DateTime<Local>>,
    default_time: NaiveTime,
) -> NaiveTime {
    existing
        .and_then(|at| NaiveTime::from_hms_opt(at.hour(), at.minute(), 0))
        .unwrap_or(default_time)
}

pub fn rescheduled_time(
    existing: Option<DateTime<Local>>,
    target_date: NaiveDate,
    default_time: NaiveTime,
) -> Option<DateTime<Local>> {
    let time = preserved_time_of_day(existing, default_time);
    let resolved = target_date.and_time(time).and_local_timezone(Local).earliest();

    if resolved.is_none() {
        log::warn!(
            "{} {} does not exist in the local time zone",
            target_date,
            time.format("%H:%M")
        );
    }

    resolved
}
