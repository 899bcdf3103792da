// Service module exports

pub mod dispatcher;
pub mod posts;
pub mod reschedule;
pub mod settings;
pub mod store;
