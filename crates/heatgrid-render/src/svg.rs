//! SVG heatmap renderer.
//!
//! One row per metric, one column per timestamp. Row labels on the left,
//! a handful of UTC time ticks along the bottom.

use std::fmt::Write;

use chrono::DateTime;
use heatgrid_core::ClusteredHeatmap;

use crate::colorscale::ColorScale;

const TOP: u32 = 10;
const BOTTOM: u32 = 40;
const RIGHT: u32 = 10;
const CHAR_WIDTH: u32 = 7;
const MAX_TICKS: usize = 6;

/// Largest accepted figure width in pixels.
pub const MAX_FIG_W: u32 = 10_000;
/// Largest accepted row height in pixels.
pub const MAX_FIG_H: u32 = 500;

/// Figure dimensions. `fig_h` is the height of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub fig_w: u32,
    pub fig_h: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { fig_w: 900, fig_h: 25 }
    }
}

impl RenderOptions {
    /// Total image height for `rows` metric rows.
    pub fn height(&self, rows: usize) -> u32 {
        row_offset(rows, self.fig_h.max(1)).saturating_add(TOP + BOTTOM)
    }

    /// Reject dimensions outside `1..=MAX_FIG_W` and `1..=MAX_FIG_H`.
    pub fn check(&self) -> Result<(), String> {
        if !(1..=MAX_FIG_W).contains(&self.fig_w) {
            return Err(format!("fig_w must be between 1 and {MAX_FIG_W}, got {}", self.fig_w));
        }
        if !(1..=MAX_FIG_H).contains(&self.fig_h) {
            return Err(format!("fig_h must be between 1 and {MAX_FIG_H}, got {}", self.fig_h));
        }
        Ok(())
    }
}

/// Render the heatmap as a standalone SVG document.
pub fn render_svg(heatmap: &ClusteredHeatmap, options: RenderOptions) -> String {
    let scale = ColorScale::greens();
    let width = options.fig_w.max(1);
    let row_h = options.fig_h.max(1);
    let height = options.height(heatmap.rows.len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="sans-serif">"#
    );
    let _ = writeln!(out, r#"<rect width="{width}" height="{height}" fill="white"/>"#);

    if heatmap.rows.is_empty() || heatmap.times.is_empty() {
        let _ = writeln!(
            out,
            r#"<text x="{}" y="{}" text-anchor="middle" font-size="12">no data</text>"#,
            width / 2,
            height / 2
        );
        out.push_str("</svg>\n");
        return out;
    }

    let longest = heatmap
        .rows
        .iter()
        .map(|r| r.label.chars().count())
        .max()
        .unwrap_or(0);
    let label_w = row_offset(longest, CHAR_WIDTH)
        .saturating_add(10)
        .min(width / 2);
    let plot_w = width.saturating_sub(label_w + RIGHT).max(1) as f64;
    let cell_w = plot_w / heatmap.times.len() as f64;
    let font_size = (row_h as f64 * 0.6).min(12.0);

    out.push_str(r#"<g shape-rendering="crispEdges">"#);
    out.push('\n');
    for (i, row) in heatmap.rows.iter().enumerate() {
        let y = TOP.saturating_add(row_offset(i, row_h));
        let _ = writeln!(
            out,
            r#"<text x="{}" y="{:.1}" text-anchor="end" dominant-baseline="middle" font-size="{font_size:.1}">{}</text>"#,
            label_w.saturating_sub(6),
            y as f64 + row_h as f64 / 2.0,
            escape(&row.label)
        );
        for (j, value) in row.values.iter().enumerate() {
            let x = label_w as f64 + j as f64 * cell_w;
            let _ = writeln!(
                out,
                r#"<rect x="{x:.2}" y="{y}" width="{:.2}" height="{row_h}" fill="{}"><title>{} @ {}: {value:.3}</title></rect>"#,
                cell_w + 0.5,
                scale.hex(*value),
                escape(&row.metric),
                heatmap.times.get(j).copied().unwrap_or_default()
            );
        }
    }
    out.push_str("</g>\n");

    let axis_y = TOP.saturating_add(row_offset(heatmap.rows.len(), row_h));
    for j in tick_indices(heatmap.times.len()) {
        let x = label_w as f64 + (j as f64 + 0.5) * cell_w;
        let _ = writeln!(
            out,
            r##"<line x1="{x:.2}" y1="{axis_y}" x2="{x:.2}" y2="{}" stroke="#444"/>"##,
            axis_y.saturating_add(4)
        );
        let _ = writeln!(
            out,
            r#"<text x="{x:.2}" y="{}" text-anchor="middle" font-size="10">{}</text>"#,
            axis_y.saturating_add(16),
            tick_label(heatmap.times[j])
        );
    }

    out.push_str("</svg>\n");
    out
}

/// `n * size` in pixels, saturating at `u32::MAX`.
fn row_offset(n: usize, size: u32) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX).saturating_mul(size)
}

/// Evenly spaced column indices for axis ticks, always including the first.
fn tick_indices(n: usize) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let step = n.div_ceil(MAX_TICKS).max(1);
    (0..n).step_by(step).collect()
}

fn tick_label(epoch: i64) -> String {
    match DateTime::from_timestamp(epoch, 0) {
        Some(t) => t.format("%H:%M:%S").to_string(),
        None => epoch.to_string(),
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatgrid_core::HeatmapRow;

    fn heatmap() -> ClusteredHeatmap {
        ClusteredHeatmap {
            times: vec![1_700_000_000, 1_700_000_015, 1_700_000_030],
            rows: vec![
                HeatmapRow {
                    metric: "system.cpu.user".into(),
                    cluster: 0,
                    label: "system.cpu.user (0)".into(),
                    values: vec![0.0, 0.5, 1.0],
                },
                HeatmapRow {
                    metric: "apps.mem.<db>".into(),
                    cluster: 1,
                    label: "apps.mem.<db> (1)".into(),
                    values: vec![1.0, 0.0, 0.0],
                },
            ],
            n_clusters: 2,
            contexts: vec!["apps.mem".into(), "system.cpu".into()],
            failed_contexts: vec![],
        }
    }

    #[test]
    fn one_cell_per_value() {
        let svg = render_svg(&heatmap(), RenderOptions::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<title>").count(), 6);
    }

    #[test]
    fn height_follows_rows() {
        let options = RenderOptions { fig_w: 600, fig_h: 20 };
        let svg = render_svg(&heatmap(), options);
        assert!(svg.contains(r#"width="600" height="90""#));
    }

    #[test]
    fn labels_are_escaped() {
        let svg = render_svg(&heatmap(), RenderOptions::default());
        assert!(svg.contains("apps.mem.&lt;db&gt; (1)"));
        assert!(!svg.contains("<db>"));
    }

    #[test]
    fn uses_scale_endpoints() {
        let svg = render_svg(&heatmap(), RenderOptions::default());
        assert!(svg.contains("#f7fcf5"));
        assert!(svg.contains("#00441b"));
    }

    #[test]
    fn time_ticks_are_utc() {
        let svg = render_svg(&heatmap(), RenderOptions::default());
        // 1_700_000_000 is 22:13:20 UTC.
        assert!(svg.contains(">22:13:20<"));
    }

    #[test]
    fn empty_heatmap_says_so() {
        let svg = render_svg(&ClusteredHeatmap::default(), RenderOptions::default());
        assert!(svg.contains("no data"));
        assert!(!svg.contains("<title>"));
    }

    #[test]
    fn oversized_rows_saturate() {
        let options = RenderOptions {
            fig_w: 900,
            fig_h: u32::MAX,
        };
        assert_eq!(options.height(2), u32::MAX);
        let svg = render_svg(&heatmap(), options);
        assert!(svg.contains(&format!(r#"height="{}""#, u32::MAX)));
    }

    #[test]
    fn check_bounds_dimensions() {
        assert!(RenderOptions::default().check().is_ok());
        let tall = RenderOptions {
            fig_w: 900,
            fig_h: MAX_FIG_H + 1,
        };
        assert!(tall.check().unwrap_err().contains("fig_h"));
        let narrow = RenderOptions { fig_w: 0, fig_h: 25 };
        assert!(narrow.check().unwrap_err().contains("fig_w"));
    }

    #[test]
    fn tick_spacing() {
        assert!(tick_indices(0).is_empty());
        assert_eq!(tick_indices(3), vec![0, 1, 2]);
        assert_eq!(tick_indices(60), vec![0, 10, 20, 30, 40, 50]);
    }
}
