//! Process lifecycle: discovery watch plus broadcast loop

pub mod config;
pub mod runner;

pub use config::BeaconConfig;
pub use runner::Beacon;
