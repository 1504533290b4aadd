pub mod drone;
pub mod shared;
