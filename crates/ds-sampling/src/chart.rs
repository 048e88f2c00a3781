//! Per-chart point budgets

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SamplingError;

/// Viewport width the base budgets are tuned for
pub const REFERENCE_WIDTH: f64 = 1280.0;

/// Largest multiplier applied for wide viewports
pub const MAX_WIDTH_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Area,
    Scatter,
    Pie,
    Heatmap,
    Histogram,
    Table,
}

impl ChartKind {
    pub const ALL: [ChartKind; 8] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Area,
        ChartKind::Scatter,
        ChartKind::Pie,
        ChartKind::Heatmap,
        ChartKind::Histogram,
        ChartKind::Table,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Area => "area",
            ChartKind::Scatter => "scatter",
            ChartKind::Pie => "pie",
            ChartKind::Heatmap => "heatmap",
            ChartKind::Histogram => "histogram",
            ChartKind::Table => "table",
        }
    }

    /// Points a chart of this kind can show usefully at the reference width
    pub fn base_budget(self) -> usize {
        match self {
            ChartKind::Bar => 100,
            ChartKind::Line | ChartKind::Area => 500,
            ChartKind::Scatter => 1000,
            ChartKind::Pie => 20,
            ChartKind::Heatmap => 10_000,
            ChartKind::Histogram => 5000,
            ChartKind::Table => 1000,
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = SamplingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        ChartKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lowered)
            .ok_or_else(|| SamplingError::UnknownChart(s.to_string()))
    }
}

/// Number of rows worth drawing for `chart`.
///
/// Never more than `total_rows`. A known screen width scales the budget
/// linearly up to [`MAX_WIDTH_FACTOR`].
pub fn optimal_sample_size(total_rows: usize, chart: ChartKind, screen_width: Option<u32>) -> usize {
    let base = chart.base_budget();
    let budget = match screen_width {
        Some(width) => {
            let factor = (f64::from(width) / REFERENCE_WIDTH).min(MAX_WIDTH_FACTOR);
            ((base as f64 * factor).floor() as usize).max(1)
        }
        None => base,
    };
    total_rows.min(budget)
}
