pub mod comparison;
pub mod config;
pub mod recognition;
pub mod report;
