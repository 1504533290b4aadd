pub mod config;
pub mod drone;
pub mod retry;

pub use config::MonitorConfig;
pub use drone::{
    DroneModel, DroneState, MAX_BATTERY, MAX_WEIGHT, MIN_LOADING_BATTERY, SERIAL_NUMBER_MAX_LEN,
};
