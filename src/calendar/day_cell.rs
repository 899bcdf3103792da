//! One calendar day as a drop target.

use chrono::NaiveDate;
use egui::Rect;

use super::drag::DragCoordinator;
use crate::models::scheduled_item::ScheduledItem;
use crate::utils::date::date_key;

/// Number of posts shown in a cell before the overflow indicator
pub const DEFAULT_PREVIEW_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub items: Vec<ScheduledItem>,
    pub in_current_month: bool,
    pub selected: bool,
    pub today: bool,
}

/// What a cell displays: a bounded slice of its posts plus an overflow label
#[derive(Debug, Clone, PartialEq)]
pub struct CellPreview<'a> {
    pub items: &'a [ScheduledItem],
    pub hidden: usize,
    pub overflow: Option<String>,
}

impl DayCell {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            items: Vec::new(),
            in_current_month: true,
            selected: false,
            today: false,
        }
    }

    /// Drop-target id: the ISO date
    pub fn id(&self) -> String {
        date_key(self.date)
    }

    pub fn day_number(&self) -> u32 {
        chrono::Datelike::day(&self.date)
    }

    pub fn register(&self, coordinator: &mut DragCoordinator, rect: Rect) {
        coordinator.register_droppable(self.id(), rect);
    }

    pub fn is_highlighted(&self, coordinator: &DragCoordinator) -> bool {
        coordinator.hovered_cell() == Some(self.id().as_str())
    }

    /// Date to select on a plain click; clicks during a drag select nothing
    pub fn click(&self, coordinator: &DragCoordinator) -> Option<NaiveDate> {
        coordinator.is_idle().then_some(self.date)
    }

    pub fn previews(&self, limit: usize) -> CellPreview<'_> {
        let shown = self.items.len().min(limit);
        let hidden = self.items.len() - shown;
        CellPreview {
            items: &self.items[..shown],
            hidden,
            overflow: (hidden > 0).then(|| format!("+{} more", hidden)),
        }
    }
}
