//! Resampling a table onto a fixed frequency grid.

use std::collections::BTreeMap;

use heatgrid_core::TimeSeriesTable;

/// Bucket rows into `freq_secs`-wide windows (timestamps floored to a
/// multiple of `freq_secs`) and average the present values in each bucket.
///
/// A bucket whose samples are all missing keeps its timestamp with missing
/// values, so an observed time never disappears from the axis.
pub fn resample(table: &TimeSeriesTable, freq_secs: i64) -> TimeSeriesTable {
    let freq = freq_secs.max(1);
    let width = table.num_columns();
    let mut buckets: BTreeMap<i64, (Vec<f64>, Vec<u32>)> = BTreeMap::new();

    for (time, row) in table.times.iter().zip(&table.rows) {
        let bucket = time.div_euclid(freq).saturating_mul(freq);
        let (sums, counts) = buckets
            .entry(bucket)
            .or_insert_with(|| (vec![0.0; width], vec![0; width]));
        for (j, value) in row.iter().enumerate().take(width) {
            if let Some(v) = value {
                sums[j] += v;
                counts[j] += 1;
            }
        }
    }

    let mut out = TimeSeriesTable::new(table.columns.clone());
    for (time, (sums, counts)) in buckets {
        let row = sums
            .iter()
            .zip(&counts)
            .map(|(sum, &count)| (count > 0).then(|| sum / count as f64))
            .collect();
        out.push_row(time, row);
    }
    out
}
