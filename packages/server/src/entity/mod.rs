pub mod drone;
pub mod event_log;
pub mod medication;
