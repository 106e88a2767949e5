//! Publication trends pipeline: load a tidy publication-count table, filter
//! it, reshape it into per-(topic, strategy) series, scale it for display and
//! export it back to CSV.

pub mod config;
pub mod data;
