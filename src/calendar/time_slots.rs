//! Hour buckets for a single-day view.

use chrono::{NaiveDate, Timelike};

use crate::models::scheduled_item::ScheduledItem;

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSlot<'a> {
    pub hour: u32,
    pub items: Vec<&'a ScheduledItem>,
}

impl TimeSlot<'_> {
    pub fn label(&self) -> String {
        format!("{:02}:00", self.hour)
    }
}

/// 24 hourly slots for `date`. Posts without a schedule are skipped.
pub fn hourly_slots<'a, I>(date: NaiveDate, items: I) -> Vec<TimeSlot<'a>>
where
    I: IntoIterator<Item = &'a ScheduledItem>,
{
    let mut slots: Vec<TimeSlot<'a>> = (0..24)
        .map(|hour| TimeSlot {
            hour,
            items: Vec::new(),
        })
        .collect();

    for item in items {
        let Some(at) = item.scheduled_at else {
            continue;
        };
        if at.date_naive() != date {
            continue;
        }
        slots[at.hour() as usize].items.push(item);
    }

    for slot in &mut slots {
        slot.items.sort_by_key(|item| item.scheduled_at);
    }
    slots
}

/// Posts with no schedule yet, e.g. for a drafts tray
pub fn unscheduled<'a, I>(items: I) -> Vec<&'a ScheduledItem>
where
    I: IntoIterator<Item = &'a ScheduledItem>,
{
    items
        .into_iter()
        .filter(|item| item.scheduled_at.is_none())
        .collect()
}
