//! The calendar board: ties drag input, the post cache and the backend
//! together.
//!
//! A UI layer owns one [`CalendarBoard`], registers cells and cards each
//! frame through [`CalendarBoard::coordinator_mut`], forwards pointer and
//! keyboard events, and calls [`CalendarBoard::poll`] once per frame to apply
//! finished backend calls.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use egui::Pos2;

use super::collision::CollisionStrategy;
use super::day_cell::DayCell;
use super::drag::{DragCoordinator, DropOutcome, KeyMove};
use super::grid::{build_cells, month_dates, week_dates, CellFlags};
use super::time_slots::{self, hourly_slots, TimeSlot};
use super::toast::ToastManager;
use crate::models::scheduled_item::ScheduledItem;
use crate::models::settings::Settings;
use crate::services::dispatcher::{RescheduleDispatcher, RescheduleOutcome};
use crate::services::posts::{ApiError, PostApi};
use crate::services::reschedule::RescheduleRequest;
use crate::services::store::{ItemStore, StoreAction};
use crate::utils::date::shift_month;

pub struct CalendarBoard {
    api: Arc<dyn PostApi>,
    store: ItemStore,
    coordinator: DragCoordinator,
    dispatcher: RescheduleDispatcher,
    toasts: ToastManager,
    settings: Settings,
    anchor: NaiveDate,
    selected: Option<NaiveDate>,
}

impl CalendarBoard {
    pub fn new(api: Arc<dyn PostApi>, settings: Settings, anchor: NaiveDate) -> Self {
        let coordinator = DragCoordinator::new()
            .with_activation_distance(settings.activation_distance_px)
            .with_default_time(settings.default_time());

        Self {
            dispatcher: RescheduleDispatcher::new(Arc::clone(&api)),
            api,
            store: ItemStore::new(),
            coordinator,
            toasts: ToastManager::new(),
            settings,
            anchor,
            selected: None,
        }
    }

    pub fn with_strategy(mut self, strategy: impl CollisionStrategy + 'static) -> Self {
        self.coordinator = self.coordinator.with_strategy(strategy);
        self
    }

    /// Fetch posts from the backend into the cache
    pub fn load(&mut self) -> Result<usize, ApiError> {
        let items = self.api.list_posts()?;
        self.store.dispatch(StoreAction::Loaded(items));
        Ok(self.store.len())
    }

    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ItemStore {
        &mut self.store
    }

    pub fn coordinator(&self) -> &DragCoordinator {
        &self.coordinator
    }

    /// For per-frame registration of cells and cards
    pub fn coordinator_mut(&mut self) -> &mut DragCoordinator {
        &mut self.coordinator
    }

    pub fn toasts(&self) -> &ToastManager {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut ToastManager {
        &mut self.toasts
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn preview_limit(&self) -> usize {
        self.settings.max_cell_previews
    }

    pub fn in_flight(&self) -> usize {
        self.dispatcher.in_flight()
    }

    // ---- navigation ----

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    pub fn next_month(&mut self) {
        self.anchor = shift_month(self.anchor, 1);
    }

    pub fn previous_month(&mut self) {
        self.anchor = shift_month(self.anchor, -1);
    }

    /// Click on a day cell; selection only changes when no drag is active
    pub fn click_cell(&mut self, cell: &DayCell) -> Option<NaiveDate> {
        let date = cell.click(&self.coordinator)?;
        self.selected = Some(date);
        Some(date)
    }

    pub fn month_cells(&self, today: NaiveDate) -> Vec<DayCell> {
        let dates = month_dates(self.anchor, self.settings.week_start());
        build_cells(
            &dates,
            self.store.items(),
            CellFlags {
                visible_month: Some(self.anchor),
                selected: self.selected,
                today,
            },
        )
    }

    pub fn week_cells(&self, today: NaiveDate) -> Vec<DayCell> {
        let dates = week_dates(self.selected.unwrap_or(self.anchor), self.settings.week_start());
        build_cells(
            &dates,
            self.store.items(),
            CellFlags {
                visible_month: None,
                selected: self.selected,
                today,
            },
        )
    }

    /// Hourly buckets for a day view of `date`
    pub fn day_slots(&self, date: NaiveDate) -> Vec<TimeSlot<'_>> {
        hourly_slots(date, self.store.items())
    }

    /// Posts with no schedule, for a tray beside the grid
    pub fn unscheduled(&self) -> Vec<&ScheduledItem> {
        time_slots::unscheduled(self.store.items())
    }

    // ---- input ----

    /// Press at `pos`; starts a gesture when a movable card is under it
    pub fn pointer_down(&mut self, pos: Pos2) -> bool {
        let Some(item_id) = self.coordinator.draggable_at(pos).map(str::to_string) else {
            return false;
        };
        if self.store.is_pending(&item_id) {
            log::debug!("Post {} is still saving, not starting a drag", item_id);
            return false;
        }
        let Some(item) = self.store.get(&item_id).cloned() else {
            log::warn!("Card {} has no post in the cache", item_id);
            return false;
        };
        self.coordinator.pointer_down(&item, pos)
    }

    pub fn pointer_move(&mut self, pos: Pos2) {
        self.coordinator.pointer_move(pos);
    }

    pub fn pointer_up(&mut self, pos: Pos2) -> Option<DropOutcome> {
        let outcome = self.coordinator.pointer_up(pos)?;
        self.handle_drop(&outcome);
        Some(outcome)
    }

    pub fn cancel(&mut self) -> Option<DropOutcome> {
        self.coordinator.cancel()
    }

    pub fn keyboard_pick_up(&mut self, item_id: &str) -> bool {
        if self.store.is_pending(item_id) {
            return false;
        }
        let Some(item) = self.store.get(item_id).cloned() else {
            return false;
        };
        self.coordinator.keyboard_pick_up_near(&item, self.selected)
    }

    pub fn keyboard_move(&mut self, step: KeyMove) -> bool {
        self.coordinator.keyboard_move(step)
    }

    pub fn keyboard_drop(&mut self) -> Option<DropOutcome> {
        let outcome = self.coordinator.keyboard_drop()?;
        self.handle_drop(&outcome);
        Some(outcome)
    }

    fn handle_drop(&mut self, outcome: &DropOutcome) {
        match outcome {
            DropOutcome::Reschedule(request) => self.submit(request),
            DropOutcome::Rejected { item_id, reason } => {
                log::warn!("Drop of post {} rejected: {}", item_id, reason);
                self.toasts.warning(reason.clone());
            }
            DropOutcome::Click { .. }
            | DropOutcome::Cancelled { .. }
            | DropOutcome::NoTarget { .. }
            | DropOutcome::SameCell { .. } => {}
        }
    }

    fn submit(&mut self, request: &RescheduleRequest) {
        if self.store.get(&request.item_id).is_none() || self.store.is_pending(&request.item_id) {
            log::warn!("Not rescheduling post {}: unknown or busy", request.item_id);
            return;
        }

        let token = self.dispatcher.submit(&request.item_id, request.scheduled_at);
        self.store.dispatch(StoreAction::RescheduleRequested {
            token,
            item_id: request.item_id.clone(),
            scheduled_at: request.scheduled_at,
        });
    }

    // ---- backend results ----

    /// Apply every finished backend call. Returns how many were applied.
    pub fn poll(&mut self) -> usize {
        let finished = self.dispatcher.poll();
        let count = finished.len();
        for outcome in finished {
            self.apply(outcome);
        }
        count
    }

    /// Block until nothing is in flight or `timeout` passes without a result
    pub fn wait_for_pending(&mut self, timeout: Duration) -> usize {
        let mut applied = 0;
        while let Some(outcome) = self.dispatcher.wait_next(timeout) {
            self.apply(outcome);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, outcome: RescheduleOutcome) {
        let title = self
            .store
            .get(&outcome.item_id)
            .map(|item| item.title.clone())
            .unwrap_or_else(|| outcome.item_id.clone());

        match outcome.result {
            Ok(server_item) => {
                log::info!("Post {} rescheduled", outcome.item_id);
                let applied = self.store.dispatch(StoreAction::RescheduleConfirmed {
                    token: outcome.token,
                    item_id: outcome.item_id,
                    server_item,
                });
                if applied {
                    self.toasts.success(format!("Moved \"{}\"", title));
                }
            }
            Err(err) => {
                log::error!("Failed to reschedule post {}: {}", outcome.item_id, err);
                let applied = self.store.dispatch(StoreAction::RescheduleFailed {
                    token: outcome.token,
                    item_id: outcome.item_id,
                    reason: err.to_string(),
                });
                if applied {
                    self.toasts
                        .error(format!("Could not move \"{}\": {}", title, err.user_message()));
                }
            }
        }
    }

    /// Drop the current gesture and abandon in-flight calls.
    ///
    /// Abandoned moves are rolled back, since their outcome is unknown; the
    /// board stays usable and the next [`load`](Self::load) shows what the
    /// backend actually holds.
    pub fn shutdown(&mut self) {
        self.coordinator.cancel();
        for job in self.dispatcher.abandon_all() {
            log::warn!("Rolling back abandoned move of post {}", job.item_id);
            self.store.dispatch(StoreAction::RescheduleFailed {
                token: job.token,
                item_id: job.item_id,
                reason: "Abandoned before the backend answered".to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::draggable::DraggableItem;
    use crate::models::scheduled_item::PostStatus;
    use crate::services::posts::MockPostApi;
    use crate::services::store::SyncState;
    use chrono::{Local, TimeZone};
    use egui::{Rect, Vec2};

    const WAIT: Duration = Duration::from_secs(5);

    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn post() -> ScheduledItem {
        ScheduledItem::builder()
            .id("p-1")
            .title("Launch")
            .status(PostStatus::Scheduled)
            .scheduled_at(Local.with_ymd_and_hms(2024, 3, 10, 14, 30, 0).unwrap())
            .build()
            .unwrap()
    }

    /// Lay out the month as 100px squares and register every cell and card
    fn layout(board: &mut CalendarBoard) -> Vec<(DayCell, Rect)> {
        let cells = board.month_cells(anchor());
        let coordinator = board.coordinator_mut();
        coordinator.begin_frame();

        let mut placed = Vec::new();
        for (index, cell) in cells.into_iter().enumerate() {
            let rect = Rect::from_min_size(
                Pos2::new((index % 7) as f32 * 100.0, (index / 7) as f32 * 100.0),
                Vec2::splat(100.0),
            );
            cell.register(coordinator, rect);
            for (slot, item) in cell.items.iter().enumerate() {
                let card = Rect::from_min_size(
                    rect.min + Vec2::new(5.0, 20.0 + slot as f32 * 20.0),
                    Vec2::new(90.0, 18.0),
                );
                DraggableItem::new(item).register(coordinator, card);
            }
            placed.push((cell, rect));
        }
        placed
    }

    fn rect_for(placed: &[(DayCell, Rect)], day: u32) -> Rect {
        let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        placed.iter().find(|(cell, _)| cell.date == date).unwrap().1
    }

    fn board_with(api: MockPostApi) -> CalendarBoard {
        let mut board = CalendarBoard::new(Arc::new(api), Settings::default(), anchor());
        board.store_mut().dispatch(StoreAction::Loaded(vec![post()]));
        board
    }

    fn drag(board: &mut CalendarBoard, from_day: u32, to_day: u32) -> Option<DropOutcome> {
        let placed = layout(board);
        let card = rect_for(&placed, from_day).min + Vec2::new(10.0, 25.0);
        assert!(board.pointer_down(card));
        board.pointer_move(rect_for(&placed, to_day).center());
        board.pointer_up(rect_for(&placed, to_day).center())
    }

    #[test]
    fn test_same_cell_drop_makes_no_call() {
        let mut api = MockPostApi::new();
        api.expect_reschedule().never();
        let mut board = board_with(api);

        let outcome = drag(&mut board, 10, 10);
        assert!(matches!(outcome, Some(DropOutcome::SameCell { .. })));
        assert_eq!(board.in_flight(), 0);
        assert_eq!(board.store().get("p-1").unwrap(), &post());
    }

    #[test]
    fn test_successful_drop_moves_optimistically_then_confirms() {
        let mut api = MockPostApi::new();
        api.expect_reschedule().times(1).returning(|_, _| Ok(None));
        let mut board = board_with(api);

        drag(&mut board, 10, 15);
        assert!(board.store().is_pending("p-1"));
        let moved = board.store().get("p-1").unwrap().scheduled_date();
        assert_eq!(moved, NaiveDate::from_ymd_opt(2024, 3, 15));

        assert_eq!(board.wait_for_pending(WAIT), 1);
        assert_eq!(board.store().sync_state("p-1"), Some(&SyncState::Confirmed));
        assert_eq!(board.toasts().toasts()[0].message, "Moved \"Launch\"");
    }

    #[test]
    fn test_failed_drop_rolls_back_and_reports() {
        let mut api = MockPostApi::new();
        api.expect_reschedule().times(1).returning(|_, _| {
            Err(ApiError::Status {
                status: 500,
                body: "boom".to_string(),
            })
        });
        let mut board = board_with(api);

        drag(&mut board, 10, 15);
        board.wait_for_pending(WAIT);

        assert_eq!(board.store().get("p-1").unwrap(), &post());
        assert!(matches!(
            board.store().sync_state("p-1"),
            Some(SyncState::RolledBack { .. })
        ));
        let toast = &board.toasts().toasts()[0];
        assert_eq!(toast.level, crate::calendar::toast::ToastLevel::Error);
        assert!(toast.message.contains("HTTP 500"));
    }

    #[test]
    fn test_pending_post_cannot_be_picked_up_again() {
        let mut api = MockPostApi::new();
        let gate = Arc::new(std::sync::Mutex::new(()));
        let held = gate.lock().unwrap();
        let worker_gate = Arc::clone(&gate);
        api.expect_reschedule().times(1).returning(move |_, _| {
            let _wait = worker_gate.lock().unwrap();
            Ok(None)
        });
        let mut board = board_with(api);

        drag(&mut board, 10, 15);
        let placed = layout(&mut board);
        let card = rect_for(&placed, 15).min + Vec2::new(10.0, 25.0);
        assert!(!board.pointer_down(card));
        assert!(!board.keyboard_pick_up("p-1"));

        drop(held);
        board.wait_for_pending(WAIT);
        assert!(board.keyboard_pick_up("p-1"));
    }

    #[test]
    fn test_click_selects_only_when_idle() {
        let mut board = board_with(MockPostApi::new());
        let placed = layout(&mut board);
        let (cell, _) = placed
            .iter()
            .find(|(cell, _)| cell.date == NaiveDate::from_ymd_opt(2024, 3, 12).unwrap())
            .unwrap();

        assert_eq!(board.click_cell(cell), Some(cell.date));
        assert_eq!(board.selected(), Some(cell.date));

        board.keyboard_pick_up("p-1");
        assert_eq!(board.click_cell(cell), None);
    }

    #[test]
    fn test_keyboard_places_draft_near_selected_day() {
        let mut api = MockPostApi::new();
        api.expect_reschedule().times(1).returning(|_, _| Ok(None));
        let mut board = board_with(api);
        board
            .store_mut()
            .dispatch(StoreAction::Loaded(vec![post(), ScheduledItem::new("d", "Idea").unwrap()]));

        let placed = layout(&mut board);
        let (cell, _) = placed
            .iter()
            .find(|(cell, _)| cell.date == NaiveDate::from_ymd_opt(2024, 3, 20).unwrap())
            .unwrap();
        board.click_cell(cell);

        assert!(board.keyboard_pick_up("d"));
        assert!(board.keyboard_move(KeyMove::NextDay));
        assert!(matches!(board.keyboard_drop(), Some(DropOutcome::Reschedule(_))));

        let placed = board.store().get("d").unwrap();
        assert_eq!(placed.scheduled_date(), NaiveDate::from_ymd_opt(2024, 3, 21));
        assert_eq!(board.wait_for_pending(WAIT), 1);
    }

    #[test]
    fn test_shutdown_rolls_back_abandoned_moves() {
        let mut api = MockPostApi::new();
        let gate = Arc::new(std::sync::Mutex::new(()));
        let held = gate.lock().unwrap();
        let worker_gate = Arc::clone(&gate);
        api.expect_reschedule().times(1).returning(move |_, _| {
            let _wait = worker_gate.lock().unwrap();
            Ok(None)
        });
        let mut board = board_with(api);

        drag(&mut board, 10, 15);
        board.shutdown();
        drop(held);

        assert_eq!(board.in_flight(), 0);
        assert_eq!(board.store().get("p-1").unwrap(), &post());
        assert!(matches!(
            board.store().sync_state("p-1"),
            Some(SyncState::RolledBack { .. })
        ));
        assert_eq!(board.wait_for_pending(Duration::from_millis(100)), 0);
        assert!(board.keyboard_pick_up("p-1"));
    }

    #[test]
    fn test_day_view_and_tray() {
        let mut board = board_with(MockPostApi::new());
        board
            .store_mut()
            .dispatch(StoreAction::Loaded(vec![post(), ScheduledItem::new("d", "Idea").unwrap()]));

        let slots = board.day_slots(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(slots[14].items.len(), 1);
        assert_eq!(slots[14].items[0].id, "p-1");

        let tray: Vec<&str> = board.unscheduled().iter().map(|item| item.id.as_str()).collect();
        assert_eq!(tray, vec!["d"]);
    }

    #[test]
    fn test_month_navigation() {
        let mut board = board_with(MockPostApi::new());
        board.next_month();
        assert_eq!(board.anchor(), NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        board.previous_month();
        board.previous_month();
        assert_eq!(board.anchor(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn test_load_replaces_cache() {
        let mut api = MockPostApi::new();
        api.expect_list_posts()
            .times(1)
            .returning(|| Ok(vec![ScheduledItem::new("n", "New").unwrap()]));
        let mut board = board_with(api);

        assert_eq!(board.load().unwrap(), 1);
        assert!(board.store().get("p-1").is_none());
    }
}
