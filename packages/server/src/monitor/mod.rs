pub mod battery;
pub mod scheduler;

pub use battery::{
    BatteryMonitor, BatteryReading, DroneFailure, SweepError, TickReport, next_battery_level,
};
pub use scheduler::run_battery_monitor;
