//! Row-set reduction for visualization
//!
//! Charts only need a few hundred or thousand points. These helpers shrink an
//! already materialized row set while keeping its shape: evenly spaced
//! selections, per-category proportions, or pinned first/last rows.

pub mod chart;
pub mod methods;
pub mod smart;

use thiserror::Error;

// Re-exports
pub use chart::{optimal_sample_size, ChartKind};
pub use methods::{
    random_sample, random_sample_with, stratified_sample, stratified_sample_by, uniform_indices,
    uniform_sample,
};
pub use smart::{smart_sample, smart_sample_with_rng, SampleMethod, SamplingOptions};

/// Errors from sampling configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SamplingError {
    #[error("Unknown chart type: {0}")]
    UnknownChart(String),
}
