//! The assembled metrics matrix.

use heatgrid_core::TimeSeriesTable;
use tracing::warn;

/// Time × metric matrix built by outer-joining per-context tables.
///
/// Invariants: `times` is strictly ascending, column names are unique and
/// every column holds exactly `times.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricMatrix {
    times: Vec<i64>,
    columns: Vec<String>,
    /// Column-major: `values[c][r]` is column `c` at `times[r]`.
    values: Vec<Vec<Option<f64>>>,
}

impl MetricMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a matrix from named columns aligned with `times`.
    ///
    /// Columns shorter than `times` are padded with missing cells.
    pub fn from_columns(times: Vec<i64>, columns: Vec<(String, Vec<Option<f64>>)>) -> Self {
        let mut matrix = Self::new();
        let mut table = TimeSeriesTable::new(columns.iter().map(|(n, _)| n.clone()).collect());
        for (r, time) in times.iter().enumerate() {
            let row = columns
                .iter()
                .map(|(_, values)| values.get(r).copied().flatten())
                .collect();
            table.push_row(*time, row);
        }
        matrix.outer_join(&table);
        matrix
    }

    pub fn times(&self) -> &[i64] {
        &self.times
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn num_rows(&self) -> usize {
        self.times.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.values[i].as_slice())
    }

    pub(crate) fn columns_mut(&mut self) -> impl Iterator<Item = (&str, &mut Vec<Option<f64>>)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter_mut())
    }

    /// Full outer join on time: the row set becomes the union of both time
    /// axes, and the table's columns are appended. A column whose name is
    /// already present is skipped.
    pub fn outer_join(&mut self, table: &TimeSeriesTable) {
        let mut times: Vec<i64> = self.times.iter().chain(&table.times).copied().collect();
        times.sort_unstable();
        times.dedup();

        if times.len() != self.times.len() {
            for column in &mut self.values {
                let mut reindexed = vec![None; times.len()];
                for (old, value) in self.times.iter().zip(column.iter()) {
                    reindexed[position(&times, *old)] = *value;
                }
                *column = reindexed;
            }
            self.times = times;
        }

        for (j, name) in table.columns.iter().enumerate() {
            if self.columns.contains(name) {
                warn!(column = %name, "duplicate column in join, keeping the first");
                continue;
            }
            let mut column = vec![None; self.times.len()];
            for (time, value) in table.times.iter().zip(table.column(j)) {
                if value.is_some() {
                    column[position(&self.times, *time)] = value;
                }
            }
            self.columns.push(name.clone());
            self.values.push(column);
        }
    }

    /// Drop every column with no values; returns the dropped names.
    pub fn drop_empty_columns(&mut self) -> Vec<String> {
        let mut dropped = Vec::new();
        let mut kept_columns = Vec::with_capacity(self.columns.len());
        let mut kept_values = Vec::with_capacity(self.values.len());
        for (name, values) in self.columns.drain(..).zip(self.values.drain(..)) {
            if values.iter().all(Option::is_none) {
                dropped.push(name);
            } else {
                kept_columns.push(name);
                kept_values.push(values);
            }
        }
        self.columns = kept_columns;
        self.values = kept_values;
        dropped
    }

    /// Transpose into one row per metric, skipping any metric that still
    /// has missing cells.
    pub fn dense_rows(&self) -> Vec<(String, Vec<f64>)> {
        self.columns
            .iter()
            .zip(&self.values)
            .filter_map(|(name, values)| {
                values
                    .iter()
                    .copied()
                    .collect::<Option<Vec<f64>>>()
                    .map(|dense| (name.clone(), dense))
            })
            .collect()
    }
}

fn position(times: &[i64], time: i64) -> usize {
    match times.binary_search(&time) {
        Ok(i) | Err(i) => i,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[(i64, Vec<Option<f64>>)]) -> TimeSeriesTable {
        let mut t = TimeSeriesTable::new(columns.iter().map(|c| c.to_string()).collect());
        for (time, values) in rows {
            t.push_row(*time, values.clone());
        }
        t
    }

    #[test]
    fn join_into_empty_matrix() {
        let mut matrix = MetricMatrix::new();
        matrix.outer_join(&table(&["cpu.user"], &[(0, vec![Some(1.0)]), (10, vec![Some(2.0)])]));

        assert_eq!(matrix.times(), [0, 10]);
        assert_eq!(matrix.columns(), ["cpu.user"]);
        assert_eq!(matrix.column("cpu.user").unwrap(), [Some(1.0), Some(2.0)]);
    }

    #[test]
    fn join_unions_time_axes() {
        let mut matrix = MetricMatrix::new();
        matrix.outer_join(&table(&["a.x"], &[(0, vec![Some(1.0)]), (20, vec![Some(3.0)])]));
        matrix.outer_join(&table(&["b.y"], &[(10, vec![Some(5.0)]), (20, vec![Some(6.0)])]));

        assert_eq!(matrix.times(), [0, 10, 20]);
        assert_eq!(matrix.column("a.x").unwrap(), [Some(1.0), None, Some(3.0)]);
        assert_eq!(matrix.column("b.y").unwrap(), [None, Some(5.0), Some(6.0)]);
    }

    #[test]
    fn join_of_columnless_table_only_adds_times() {
        let mut matrix = MetricMatrix::new();
        matrix.outer_join(&table(&["a.x"], &[(0, vec![Some(1.0)])]));
        matrix.outer_join(&table(&[], &[(5, vec![])]));

        assert_eq!(matrix.times(), [0, 5]);
        assert_eq!(matrix.num_columns(), 1);
        assert_eq!(matrix.column("a.x").unwrap(), [Some(1.0), None]);
    }

    #[test]
    fn duplicate_column_keeps_first() {
        let mut matrix = MetricMatrix::new();
        matrix.outer_join(&table(&["a.x"], &[(0, vec![Some(1.0)])]));
        matrix.outer_join(&table(&["a.x"], &[(0, vec![Some(9.0)])]));

        assert_eq!(matrix.num_columns(), 1);
        assert_eq!(matrix.column("a.x").unwrap(), [Some(1.0)]);
    }

    #[test]
    fn unsorted_table_times_are_placed_correctly() {
        let mut matrix = MetricMatrix::new();
        matrix.outer_join(&table(&["a.x"], &[(20, vec![Some(2.0)]), (10, vec![Some(1.0)])]));
        assert_eq!(matrix.times(), [10, 20]);
        assert_eq!(matrix.column("a.x").unwrap(), [Some(1.0), Some(2.0)]);
    }

    #[test]
    fn drop_empty_columns_reports_names() {
        let mut matrix = MetricMatrix::from_columns(
            vec![0, 1],
            vec![
                ("keep".into(), vec![None, Some(1.0)]),
                ("drop".into(), vec![None, None]),
            ],
        );
        assert_eq!(matrix.drop_empty_columns(), vec!["drop"]);
        assert_eq!(matrix.columns(), ["keep"]);
    }

    #[test]
    fn dense_rows_skip_incomplete_metrics() {
        let matrix = MetricMatrix::from_columns(
            vec![0, 1],
            vec![
                ("full".into(), vec![Some(0.0), Some(1.0)]),
                ("gappy".into(), vec![Some(0.5), None]),
            ],
        );
        let rows = matrix.dense_rows();
        assert_eq!(rows, vec![("full".to_string(), vec![0.0, 1.0])]);
    }
}
