use chrono::{Duration, NaiveDate, NaiveTime};
use egui::{Pos2, Rect, Vec2};

use super::collision::{ClosestCenter, CollisionStrategy, DropCandidate};
use crate::models::scheduled_item::ScheduledItem;
use crate::services::reschedule::RescheduleRequest;
use crate::utils::date::{date_key, parse_date_key};

pub const DEFAULT_ACTIVATION_DISTANCE: f32 = 8.0;

/// The item being moved and where the pointer is
#[derive(Clone, Debug)]
pub struct DragSession {
    pub item: ScheduledItem,
    /// Cell the item sat in when the drag began (`None` if unscheduled)
    pub origin_cell: Option<String>,
    pub origin: Pos2,
    pub pointer: Pos2,
    pub hovered_cell: Option<String>,
}

impl DragSession {
    fn new(item: &ScheduledItem, origin: Pos2) -> Self {
        Self {
            origin_cell: item.scheduled_date().map(date_key),
            item: item.clone(),
            origin,
            pointer: origin,
            hovered_cell: None,
        }
    }

    pub fn item_id(&self) -> &str {
        &self.item.id
    }

    /// Pointer travel since the press
    pub fn delta(&self) -> Vec2 {
        self.pointer - self.origin
    }
}

#[derive(Clone, Debug)]
enum DragPhase {
    Idle,
    /// Pressed but not yet past the activation distance
    Pressed(DragSession),
    Dragging(DragSession),
}

/// How a gesture ended
#[derive(Clone, Debug, PartialEq)]
pub enum DropOutcome {
    /// Released before the activation distance: a plain click on the card
    Click { item_id: String },
    Cancelled { item_id: String },
    NoTarget { item_id: String },
    SameCell { item_id: String },
    /// Target exists but the new time cannot be represented locally
    Rejected { item_id: String, reason: String },
    Reschedule(RescheduleRequest),
}

/// Arrow-key movement while a card is picked up with the keyboard
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyMove {
    PreviousDay,
    NextDay,
    PreviousWeek,
    NextWeek,
}

impl KeyMove {
    fn days(self) -> i64 {
        match self {
            KeyMove::PreviousDay => -1,
            KeyMove::NextDay => 1,
            KeyMove::PreviousWeek => -7,
            KeyMove::NextWeek => 7,
        }
    }
}

/// Owns the single drag session of a calendar grid.
///
/// Cells and cards register their rects every frame; pointer and keyboard
/// events drive the state machine. Only one session exists at a time.
pub struct DragCoordinator {
    phase: DragPhase,
    droppables: Vec<DropCandidate>,
    draggables: Vec<(String, Rect)>,
    strategy: Box<dyn CollisionStrategy>,
    activation_distance: f32,
    default_time: NaiveTime,
}

impl Default for DragCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl DragCoordinator {
    pub fn new() -> Self {
        Self {
            phase: DragPhase::Idle,
            droppables: Vec::new(),
            draggables: Vec::new(),
            strategy: Box::new(ClosestCenter),
            activation_distance: DEFAULT_ACTIVATION_DISTANCE,
            default_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }

    pub fn with_strategy(mut self, strategy: impl CollisionStrategy + 'static) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    pub fn with_activation_distance(mut self, distance: f32) -> Self {
        self.activation_distance = distance.max(0.0);
        self
    }

    pub fn with_default_time(mut self, time: NaiveTime) -> Self {
        self.default_time = time;
        self
    }

    /// Forget last frame's registrations
    pub fn begin_frame(&mut self) {
        self.droppables.clear();
        self.draggables.clear();
    }

    pub fn register_droppable(&mut self, id: impl Into<String>, rect: Rect) {
        let id = id.into();
        self.droppables.retain(|candidate| candidate.id != id);
        self.droppables.push(DropCandidate::new(id, rect));
    }

    pub fn register_draggable(&mut self, item_id: impl Into<String>, rect: Rect) {
        let item_id = item_id.into();
        self.draggables.retain(|(id, _)| *id != item_id);
        self.draggables.push((item_id, rect));
    }

    /// Topmost registered card under `pos`
    pub fn draggable_at(&self, pos: Pos2) -> Option<&str> {
        self.draggables
            .iter()
            .rev()
            .find(|(_, rect)| rect.contains(pos))
            .map(|(id, _)| id.as_str())
    }

    fn droppable_rect(&self, id: &str) -> Option<Rect> {
        self.droppables
            .iter()
            .find(|candidate| candidate.id == id)
            .map(|candidate| candidate.rect)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, DragPhase::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging(_))
    }

    /// Active session, once the press has turned into a drag
    pub fn session(&self) -> Option<&DragSession> {
        match &self.phase {
            DragPhase::Dragging(session) => Some(session),
            _ => None,
        }
    }

    pub fn active_item(&self) -> Option<&str> {
        self.session().map(DragSession::item_id)
    }

    pub fn hovered_cell(&self) -> Option<&str> {
        self.session().and_then(|session| session.hovered_cell.as_deref())
    }

    /// Press on a card. Ignored while another gesture is in progress.
    pub fn pointer_down(&mut self, item: &ScheduledItem, pos: Pos2) -> bool {
        if !self.is_idle() {
            log::debug!("Ignoring press on {} while a drag is active", item.id);
            return false;
        }

        let session = DragSession::new(item, pos);
        self.phase = if self.activation_distance <= 0.0 {
            self.start_dragging(session, pos)
        } else {
            DragPhase::Pressed(session)
        };
        true
    }

    fn start_dragging(&self, mut session: DragSession, pos: Pos2) -> DragPhase {
        log::debug!("Drag started for post {}", session.item.id);
        session.pointer = pos;
        session.hovered_cell = self.strategy.resolve_drop_target(pos, &self.droppables);
        DragPhase::Dragging(session)
    }

    pub fn pointer_move(&mut self, pos: Pos2) {
        match std::mem::replace(&mut self.phase, DragPhase::Idle) {
            DragPhase::Idle => {}
            DragPhase::Pressed(mut session) => {
                if session.origin.distance(pos) >= self.activation_distance {
                    self.phase = self.start_dragging(session, pos);
                } else {
                    session.pointer = pos;
                    self.phase = DragPhase::Pressed(session);
                }
            }
            DragPhase::Dragging(mut session) => {
                session.pointer = pos;
                session.hovered_cell = self.strategy.resolve_drop_target(pos, &self.droppables);
                self.phase = DragPhase::Dragging(session);
            }
        }
    }

    pub fn pointer_up(&mut self, pos: Pos2) -> Option<DropOutcome> {
        self.pointer_move(pos);
        match std::mem::replace(&mut self.phase, DragPhase::Idle) {
            DragPhase::Idle => None,
            DragPhase::Pressed(session) => Some(DropOutcome::Click {
                item_id: session.item.id,
            }),
            DragPhase::Dragging(session) => Some(self.finish(session)),
        }
    }

    /// End any gesture without dropping (Escape, focus loss)
    pub fn cancel(&mut self) -> Option<DropOutcome> {
        match std::mem::replace(&mut self.phase, DragPhase::Idle) {
            DragPhase::Idle => None,
            DragPhase::Pressed(session) | DragPhase::Dragging(session) => {
                log::debug!("Drag cancelled for post {}", session.item.id);
                Some(DropOutcome::Cancelled {
                    item_id: session.item.id,
                })
            }
        }
    }

    /// Pick a card up with the keyboard; hovering starts on its own cell
    pub fn keyboard_pick_up(&mut self, item: &ScheduledItem) -> bool {
        self.keyboard_pick_up_near(item, None)
    }

    /// Pick a card up with the keyboard.
    ///
    /// Hovering starts on the card's own cell, else on `near` (typically the
    /// selected day), else on the first registered cell. Refused when no cell
    /// is registered at all.
    pub fn keyboard_pick_up_near(&mut self, item: &ScheduledItem, near: Option<NaiveDate>) -> bool {
        if !self.is_idle() {
            return false;
        }

        let origin_cell = item.scheduled_date().map(date_key);
        let start = origin_cell
            .iter()
            .cloned()
            .chain(near.map(date_key))
            .find_map(|id| self.droppable_rect(&id).map(|rect| (id, rect)))
            .or_else(|| {
                self.droppables
                    .first()
                    .map(|candidate| (candidate.id.clone(), candidate.rect))
            });

        let Some((cell, rect)) = start else {
            log::debug!("No cells registered, cannot pick up post {}", item.id);
            return false;
        };

        let mut session = DragSession::new(item, rect.center());
        session.hovered_cell = Some(cell);

        log::debug!("Keyboard drag started for post {}", item.id);
        self.phase = DragPhase::Dragging(session);
        true
    }

    /// Move the hover target by a day or a week. Returns whether it moved.
    pub fn keyboard_move(&mut self, step: KeyMove) -> bool {
        let DragPhase::Dragging(session) = &self.phase else {
            return false;
        };

        let Some(from) = session.hovered_cell.as_deref().and_then(parse_date_key)
        else {
            return false;
        };

        let target = date_key(from + Duration::days(step.days()));
        let Some(rect) = self.droppable_rect(&target) else {
            return false;
        };

        if let DragPhase::Dragging(session) = &mut self.phase {
            session.pointer = rect.center();
            session.hovered_cell = Some(target);
        }
        true
    }

    pub fn keyboard_drop(&mut self) -> Option<DropOutcome> {
        match std::mem::replace(&mut self.phase, DragPhase::Idle) {
            DragPhase::Dragging(session) => Some(self.finish(session)),
            other => {
                self.phase = other;
                None
            }
        }
    }

    fn finish(&self, session: DragSession) -> DropOutcome {
        let item_id = session.item.id.clone();

        let Some(target) = session.hovered_cell.as_deref() else {
            return DropOutcome::NoTarget { item_id };
        };

        if session.origin_cell.as_deref() == Some(target) {
            return DropOutcome::SameCell { item_id };
        }

        let Some(target_date) = parse_date_key(target) else {
            log::warn!("Drop target {} is not a calendar day", target);
            return DropOutcome::NoTarget { item_id };
        };

        match RescheduleRequest::for_drop(&session.item, target_date, self.default_time) {
            Some(request) => {
                log::debug!("Post {} dropped on {}", item_id, target);
                DropOutcome::Reschedule(request)
            }
            None => DropOutcome::Rejected {
                item_id,
                reason: format!("That time does not exist on {}", target_date),
            },
        }
    }
}
