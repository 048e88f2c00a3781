//! Sampling that pins the first and last rows of a series

use ds_core::Row;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::methods::{random_sample_with, stratified_sample, uniform_sample};

/// How the middle section is reduced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SampleMethod {
    #[default]
    Uniform,
    Random,
    Stratified { column: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SamplingOptions {
    /// Rows kept verbatim from the start
    pub preserve_first: usize,
    /// Rows kept verbatim from the end
    pub preserve_last: usize,
    pub method: SampleMethod,
}

impl SamplingOptions {
    pub fn with_preserve_first(mut self, rows: usize) -> Self {
        self.preserve_first = rows;
        self
    }

    pub fn with_preserve_last(mut self, rows: usize) -> Self {
        self.preserve_last = rows;
        self
    }

    pub fn with_method(mut self, method: SampleMethod) -> Self {
        self.method = method;
        self
    }
}

/// Reduce `rows` to `target`, keeping the configured head and tail intact
pub fn smart_sample(rows: &[Row], target: usize, options: &SamplingOptions) -> Vec<Row> {
    smart_sample_with_rng(rows, target, options, &mut rand::thread_rng())
}

/// Same as [`smart_sample`] with a caller-provided generator for the random method
pub fn smart_sample_with_rng<R: Rng + ?Sized>(
    rows: &[Row],
    target: usize,
    options: &SamplingOptions,
    rng: &mut R,
) -> Vec<Row> {
    if rows.len() <= target {
        return rows.to_vec();
    }

    // Head and tail never exceed the budget between them
    let head_len = options.preserve_first.min(target);
    let tail_len = options.preserve_last.min(target - head_len);
    let budget = target - head_len - tail_len;
    let middle = &rows[head_len..rows.len() - tail_len];

    let sampled = match &options.method {
        SampleMethod::Uniform => uniform_sample(middle, budget),
        SampleMethod::Random => random_sample_with(middle, budget, rng),
        SampleMethod::Stratified { column } => stratified_sample(middle, budget, column),
    };

    debug!(
        head = head_len,
        middle = sampled.len(),
        tail = tail_len,
        method = ?options.method,
        "Smart sample"
    );

    let mut out = Vec::with_capacity(target);
    out.extend_from_slice(&rows[..head_len]);
    out.extend(sampled);
    out.extend_from_slice(&rows[rows.len() - tail_len..]);
    out
}
