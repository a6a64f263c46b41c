//! Tabular exports.

use std::fmt::Write;

use heatgrid_core::ClusteredHeatmap;

/// CSV with a `metric,cluster,<t1>,<t2>,...` header and one line per row,
/// in heatmap order.
pub fn render_csv(heatmap: &ClusteredHeatmap) -> String {
    let mut out = String::from("metric,cluster");
    for t in &heatmap.times {
        let _ = write!(out, ",{t}");
    }
    out.push('\n');

    for row in &heatmap.rows {
        out.push_str(&csv_field(&row.metric));
        let _ = write!(out, ",{}", row.cluster);
        for v in &row.values {
            let _ = write!(out, ",{v}");
        }
        out.push('\n');
    }
    out
}

/// Pretty-printed JSON of the whole result.
pub fn render_json(heatmap: &ClusteredHeatmap) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(heatmap)
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatgrid_core::HeatmapRow;

    fn heatmap() -> ClusteredHeatmap {
        ClusteredHeatmap {
            times: vec![0, 15],
            rows: vec![
                HeatmapRow {
                    metric: "system.cpu.user".into(),
                    cluster: 0,
                    label: "system.cpu.user (0)".into(),
                    values: vec![0.0, 1.0],
                },
                HeatmapRow {
                    metric: "apps.cpu.a,b".into(),
                    cluster: 1,
                    label: "apps.cpu.a,b (1)".into(),
                    values: vec![0.25, 0.75],
                },
            ],
            n_clusters: 2,
            contexts: vec!["apps.cpu".into(), "system.cpu".into()],
            failed_contexts: vec!["system.ram".into()],
        }
    }

    #[test]
    fn csv_layout() {
        let csv = render_csv(&heatmap());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "metric,cluster,0,15");
        assert_eq!(lines[1], "system.cpu.user,0,0,1");
        assert_eq!(lines[2], "\"apps.cpu.a,b\",1,0.25,0.75");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn csv_of_empty_heatmap_is_header_only() {
        assert_eq!(render_csv(&ClusteredHeatmap::default()), "metric,cluster\n");
    }

    #[test]
    fn json_carries_failed_contexts() {
        let json = render_json(&heatmap()).unwrap();
        let back: ClusteredHeatmap = serde_json::from_str(&json).unwrap();
        assert_eq!(back.failed_contexts, vec!["system.ram"]);
        assert_eq!(back.rows[1].cluster, 1);
    }
}
