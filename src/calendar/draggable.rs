//! Card wrapper that lets a post be picked up.

use egui::{Rect, Vec2};

use super::drag::DragCoordinator;
use crate::models::scheduled_item::ScheduledItem;

/// Opacity of a card while it is being dragged
pub const DRAGGING_OPACITY: f32 = 0.5;

/// How a card should be painted this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragVisual {
    pub offset: Vec2,
    pub opacity: f32,
    pub dragging: bool,
}

impl DragVisual {
    pub const IDLE: DragVisual = DragVisual {
        offset: Vec2::ZERO,
        opacity: 1.0,
        dragging: false,
    };
}

pub struct DraggableItem<'a> {
    pub item: &'a ScheduledItem,
    pub compact: bool,
}

impl<'a> DraggableItem<'a> {
    pub fn new(item: &'a ScheduledItem) -> Self {
        Self {
            item,
            compact: false,
        }
    }

    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Register the card's hit area under the post id
    pub fn register(&self, coordinator: &mut DragCoordinator, rect: Rect) {
        coordinator.register_draggable(self.item.id.clone(), rect);
    }

    pub fn visual(&self, coordinator: &DragCoordinator) -> DragVisual {
        match coordinator.session() {
            Some(session) if session.item_id() == self.item.id => DragVisual {
                offset: session.delta(),
                opacity: DRAGGING_OPACITY,
                dragging: true,
            },
            _ => DragVisual::IDLE,
        }
    }

    /// Card text: title only when compact, otherwise time, title and platforms
    pub fn label(&self) -> String {
        if self.compact {
            return self.item.title.clone();
        }

        let mut label = String::new();
        if let Some(at) = self.item.scheduled_at {
            label.push_str(&at.format("%H:%M ").to_string());
        }
        label.push_str(&self.item.title);
        if !self.item.platforms.is_empty() {
            label.push_str(&format!(" [{}]", self.item.platforms.join(", ")));
        }
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use egui::Pos2;

    fn post(id: &str) -> ScheduledItem {
        ScheduledItem::builder()
            .id(id)
            .title("Spring sale")
            .scheduled_at(Local.with_ymd_and_hms(2024, 3, 10, 14, 30, 0).unwrap())
            .platform("instagram")
            .platform("x")
            .build()
            .unwrap()
    }

    #[test]
    fn test_labels() {
        let item = post("a");
        assert_eq!(DraggableItem::new(&item).label(), "14:30 Spring sale [instagram, x]");
        assert_eq!(DraggableItem::new(&item).compact(true).label(), "Spring sale");

        let draft = ScheduledItem::new("d", "Idea").unwrap();
        assert_eq!(DraggableItem::new(&draft).label(), "Idea");
    }

    #[test]
    fn test_visual_follows_active_drag_only() {
        let dragged = post("a");
        let other = post("b");
        let mut coordinator = DragCoordinator::new();

        let card = DraggableItem::new(&dragged);
        card.register(&mut coordinator, Rect::from_min_size(Pos2::ZERO, Vec2::splat(40.0)));
        assert_eq!(card.visual(&coordinator), DragVisual::IDLE);

        coordinator.pointer_down(&dragged, Pos2::new(10.0, 10.0));
        coordinator.pointer_move(Pos2::new(40.0, 30.0));

        let visual = card.visual(&coordinator);
        assert!(visual.dragging);
        assert_eq!(visual.offset, Vec2::new(30.0, 20.0));
        assert_eq!(visual.opacity, DRAGGING_OPACITY);
        assert_eq!(DraggableItem::new(&other).visual(&coordinator), DragVisual::IDLE);
    }

    #[test]
    fn test_pressed_card_is_not_yet_dragging() {
        let item = post("a");
        let mut coordinator = DragCoordinator::new();
        coordinator.pointer_down(&item, Pos2::ZERO);
        coordinator.pointer_move(Pos2::new(3.0, 0.0));
        assert_eq!(DraggableItem::new(&item).visual(&coordinator), DragVisual::IDLE);
    }
}
