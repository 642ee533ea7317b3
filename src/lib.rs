pub mod cli;
pub mod collectors;
pub mod config;
pub mod core;
pub mod engine;
pub mod exit;
pub mod logs;
pub mod pipeline;
pub mod platform;
pub mod telemetry;
pub mod ui;
