// Module exports for models

pub mod scheduled_item;
pub mod settings;
