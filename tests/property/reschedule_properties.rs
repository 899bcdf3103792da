// Property-based tests for rescheduling and cell derivation

use chrono::{Duration, Local, NaiveDate, NaiveTime, TimeZone, Timelike, Weekday};
use post_calendar::calendar::day_cell::DayCell;
use post_calendar::calendar::grid::{build_cells, month_dates, CellFlags};
use post_calendar::models::scheduled_item::ScheduledItem;
use post_calendar::services::reschedule::rescheduled_time;
use proptest::prelude::*;

fn nine() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap()
}

proptest! {
    /// Property: a moved post keeps its hour and minute and lands on the target date
    #[test]
    fn prop_time_of_day_is_preserved(
        day_offset in 0i64..3650,
        target_offset in -400i64..400,
        // Stay clear of the hours DST transitions use
        hour in 4u32..23,
        minute in 0u32..60,
    ) {
        let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(day_offset);
        let existing = Local
            .from_local_datetime(&base.and_hms_opt(hour, minute, 0).unwrap())
            .earliest();
        prop_assume!(existing.is_some());

        let target = base + Duration::days(target_offset);
        let moved = rescheduled_time(existing, target, nine()).unwrap();

        prop_assert_eq!(moved.date_naive(), target);
        prop_assert_eq!(moved.hour(), hour);
        prop_assert_eq!(moved.minute(), minute);
    }

    /// Property: unscheduled posts always get the default time
    #[test]
    fn prop_default_time_for_unscheduled(day_offset in 0i64..3650) {
        let target = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(day_offset);
        let moved = rescheduled_time(None, target, nine()).unwrap();
        prop_assert_eq!(moved.naive_local(), target.and_time(nine()));
    }

    /// Property: every scheduled post in range is in exactly one cell
    #[test]
    fn prop_posts_appear_in_one_cell(
        days in prop::collection::vec(proptest::option::of(1u32..=31), 0..40),
    ) {
        let items: Vec<ScheduledItem> = days
            .iter()
            .enumerate()
            .map(|(i, day)| {
                let mut builder = ScheduledItem::builder().id(format!("p{}", i)).title("Post");
                if let Some(day) = day {
                    builder = builder.scheduled_at(Local.with_ymd_and_hms(2024, 3, *day, 12, 0, 0).unwrap());
                }
                builder.build().unwrap()
            })
            .collect();

        let dates = month_dates(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), Weekday::Sun);
        let cells = build_cells(&dates, &items, CellFlags {
            visible_month: None,
            selected: None,
            today: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        });

        for (i, day) in days.iter().enumerate() {
            let id = format!("p{}", i);
            let holders = cells
                .iter()
                .filter(|cell| cell.items.iter().any(|item| item.id == id))
                .count();
            prop_assert_eq!(holders, usize::from(day.is_some()));
        }
    }

    /// Property: a cell shows min(N, limit) previews and "+{N-limit} more" only past the limit
    #[test]
    fn prop_overflow_budget(count in 0usize..30, limit in 1usize..6) {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let mut cell = DayCell::new(date);
        cell.items = (0..count)
            .map(|i| ScheduledItem::new(format!("p{}", i), "Post").unwrap())
            .collect();

        let preview = cell.previews(limit);
        prop_assert_eq!(preview.items.len(), count.min(limit));
        if count > limit {
            let expected = format!("+{} more", count - limit);
            prop_assert_eq!(preview.overflow.as_deref(), Some(expected.as_str()));
        } else {
            prop_assert_eq!(preview.overflow, None);
        }
        prop_assert_eq!(cell.items.len(), count);
    }
}
