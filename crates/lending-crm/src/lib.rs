pub mod config;
pub mod deals;
pub mod engine;
pub mod error;
pub mod telemetry;
