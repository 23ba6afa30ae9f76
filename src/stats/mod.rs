//! Runtime statistics

pub mod metrics;

pub use metrics::{BeaconStats, StatsSnapshot};
