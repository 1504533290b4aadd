pub mod drone;
