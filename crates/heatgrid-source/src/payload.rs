//! The `{labels, data}` series payload shared by the Netdata API and the
//! fixture format.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use heatgrid_core::{SourceError, SourceResult, TimeSeriesTable};

/// Timestamps above this are taken to be milliseconds.
const MILLIS_THRESHOLD: f64 = 100_000_000_000.0;

/// A series payload: `labels[0]` names the time column, the remaining
/// labels name the dimensions, and each `data` row is `[time, v1, v2, ...]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesPayload {
    pub labels: Vec<String>,
    #[serde(default)]
    pub data: Vec<Vec<Value>>,
}

impl SeriesPayload {
    /// Convert into a table. `null` cells become missing values.
    pub fn into_table(self) -> SourceResult<TimeSeriesTable> {
        let mut labels = self.labels.into_iter();
        if labels.next().is_none() {
            return Err(SourceError::Decode("payload has no labels".into()));
        }

        let mut table = TimeSeriesTable::new(labels.collect());
        for (i, row) in self.data.into_iter().enumerate() {
            let mut cells = row.into_iter();
            let time = match cells.next() {
                Some(v) => parse_time(&v)
                    .ok_or_else(|| SourceError::Decode(format!("row {i}: bad timestamp {v}")))?,
                None => continue,
            };
            let values = cells
                .enumerate()
                .map(|(j, v)| parse_value(&v).map_err(|_| {
                    SourceError::Decode(format!("row {i}, column {j}: non-numeric value {v}"))
                }))
                .collect::<SourceResult<Vec<_>>>()?;
            table.push_row(time, values);
        }
        Ok(table)
    }
}

fn parse_time(v: &Value) -> Option<i64> {
    let t = v.as_f64()?;
    let secs = if t.abs() >= MILLIS_THRESHOLD { t / 1000.0 } else { t };
    Some(secs.floor() as i64)
}

fn parse_value(v: &Value) -> Result<Option<f64>, ()> {
    match v {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64().filter(|f| f.is_finite())),
        _ => Err(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> SeriesPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn decodes_labels_and_rows() {
        let table = payload(json!({
            "labels": ["time", "user", "system"],
            "data": [[100, 1.5, 2.0], [115, null, 3]]
        }))
        .into_table()
        .unwrap();

        assert_eq!(table.columns, vec!["user", "system"]);
        assert_eq!(table.times, vec![100, 115]);
        assert_eq!(table.rows[1], vec![None, Some(3.0)]);
    }

    #[test]
    fn millisecond_timestamps_are_scaled() {
        let table = payload(json!({
            "labels": ["time", "v"],
            "data": [[1_700_000_000_000i64, 1.0]]
        }))
        .into_table()
        .unwrap();
        assert_eq!(table.times, vec![1_700_000_000]);
    }

    #[test]
    fn missing_labels_is_an_error() {
        let err = payload(json!({"labels": [], "data": []})).into_table();
        assert!(matches!(err, Err(SourceError::Decode(_))));
    }

    #[test]
    fn string_cell_is_an_error() {
        let err = payload(json!({
            "labels": ["time", "v"],
            "data": [[1, "oops"]]
        }))
        .into_table();
        assert!(matches!(err, Err(SourceError::Decode(_))));
    }

    #[test]
    fn empty_rows_are_skipped() {
        let table = payload(json!({
            "labels": ["time", "v"],
            "data": [[], [5, 2.0]]
        }))
        .into_table()
        .unwrap();
        assert_eq!(table.times, vec![5]);
    }
}
