//! Core domain types and logic: simulation, trend analysis, and the per-symbol facade.

pub mod ohlcv;
pub mod quote;
pub mod stats;
pub mod indicator;
pub mod random;
pub mod simulation;
pub mod trend;
pub mod calendar;
pub mod analysis;
pub mod holdings;
pub mod portfolio;
pub mod settings;
pub mod error;
