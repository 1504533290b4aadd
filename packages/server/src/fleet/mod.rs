//! Drone fleet domain: the store over drones, medications and the battery
//! audit log, the per-drone lock registry and the load planner.

pub mod locks;
pub mod planner;
pub mod store;

pub use locks::DroneLocks;
pub use planner::LoadPlanner;
pub use store::{DroneAggregate, FleetStore};
