// Headless calendar board: drag-and-drop rescheduling of posts

pub mod board;
pub mod collision;
pub mod day_cell;
pub mod drag;
pub mod draggable;
pub mod grid;
pub mod time_slots;
pub mod toast;

pub use board::CalendarBoard;
