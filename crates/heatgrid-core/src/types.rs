//! Shared types used across heatgrid crates.

use serde::{Deserialize, Serialize};

/// A time series table for a single context.
///
/// `rows[i][j]` is the value of `columns[j]` at `times[i]`; `None` marks a
/// missing sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesTable {
    pub columns: Vec<String>,
    pub times: Vec<i64>,
    pub rows: Vec<Vec<Option<f64>>>,
}

impl TimeSeriesTable {
    /// Create an empty table with the given value columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            times: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Append one row. Short rows are padded with missing values and long
    /// rows are truncated to the column count.
    pub fn push_row(&mut self, time: i64, mut values: Vec<Option<f64>>) {
        values.resize(self.columns.len(), None);
        self.times.push(time);
        self.rows.push(values);
    }

    pub fn num_rows(&self) -> usize {
        self.times.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.times.is_empty()
    }

    /// Namespace every column as `<prefix>.<column>`.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        for column in &mut self.columns {
            *column = format!("{prefix}.{column}");
        }
        self
    }

    /// Values of column `j` in row order.
    pub fn column(&self, j: usize) -> impl Iterator<Item = Option<f64>> + '_ {
        self.rows.iter().map(move |row| row.get(j).copied().flatten())
    }
}

/// Parameters of a single heatmap request.
///
/// Mirrors the user-adjustable inputs of the dashboard form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapParams {
    pub space_id: String,
    pub room_id: String,
    pub contexts_regex: String,
    /// Start of the window, seconds relative to now (usually negative).
    pub after: i64,
    /// End of the window, seconds relative to now.
    pub before: i64,
    pub freq: String,
    pub n_clusters: usize,
}

/// One metric row of the final heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapRow {
    /// Metric identifier, `<context>.<dimension>`.
    pub metric: String,
    pub cluster: usize,
    /// Display label, `<metric> (<cluster>)`.
    pub label: String,
    /// Normalized, gap-filled values aligned with `ClusteredHeatmap::times`.
    pub values: Vec<f64>,
}

/// Result of a full pipeline run, ready for rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusteredHeatmap {
    /// Time axis in epoch seconds, ascending.
    pub times: Vec<i64>,
    /// Rows ordered by ascending cluster label.
    pub rows: Vec<HeatmapRow>,
    pub n_clusters: usize,
    /// Contexts that matched the selection pattern.
    pub contexts: Vec<String>,
    /// Contexts whose fetch failed and were skipped.
    pub failed_contexts: Vec<String>,
}

impl ClusteredHeatmap {
    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.label.as_str()).collect()
    }

    pub fn metrics(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.metric.as_str()).collect()
    }
}
