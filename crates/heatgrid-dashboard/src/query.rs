//! Query-string parameters shared by the page and API handlers.
//!
//! Every field is optional and arrives as a string: HTML forms submit
//! empty inputs as `field=`, which falls back to the configured default.

use std::str::FromStr;

use serde::Deserialize;

use heatgrid_core::HeatmapParams;
use heatgrid_render::RenderOptions;

#[derive(Debug, Default, Deserialize)]
pub struct HeatmapQuery {
    pub space_id: Option<String>,
    pub room_id: Option<String>,
    pub contexts_regex: Option<String>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub freq: Option<String>,
    pub n_clusters: Option<String>,
    pub fig_w: Option<String>,
    pub fig_h: Option<String>,
}

impl HeatmapQuery {
    /// Overlay the query on `defaults`. Fails on a non-numeric value in a
    /// numeric field or on figure dimensions out of range.
    pub fn resolve(
        &self,
        defaults: &HeatmapParams,
        render: RenderOptions,
    ) -> Result<(HeatmapParams, RenderOptions), String> {
        let params = HeatmapParams {
            space_id: text(&self.space_id).unwrap_or(&defaults.space_id).to_string(),
            room_id: text(&self.room_id).unwrap_or(&defaults.room_id).to_string(),
            contexts_regex: text(&self.contexts_regex)
                .unwrap_or(&defaults.contexts_regex)
                .to_string(),
            after: number("after", &self.after)?.unwrap_or(defaults.after),
            before: number("before", &self.before)?.unwrap_or(defaults.before),
            freq: text(&self.freq).unwrap_or(&defaults.freq).to_string(),
            n_clusters: number("n_clusters", &self.n_clusters)?.unwrap_or(defaults.n_clusters),
        };
        let render = RenderOptions {
            fig_w: number("fig_w", &self.fig_w)?.unwrap_or(render.fig_w),
            fig_h: number("fig_h", &self.fig_h)?.unwrap_or(render.fig_h),
        };
        render.check()?;
        Ok((params, render))
    }
}

fn text(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn number<T: FromStr>(name: &str, field: &Option<String>) -> Result<Option<T>, String> {
    match text(field) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| format!("invalid value for {name}: {raw:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> HeatmapParams {
        HeatmapParams {
            space_id: "space".into(),
            room_id: "room".into(),
            contexts_regex: "system".into(),
            after: -900,
            before: 0,
            freq: "15s".into(),
            n_clusters: 15,
        }
    }

    #[test]
    fn empty_query_keeps_defaults() {
        let (params, render) = HeatmapQuery::default()
            .resolve(&defaults(), RenderOptions::default())
            .unwrap();
        assert_eq!(params, defaults());
        assert_eq!(render, RenderOptions::default());
    }

    #[test]
    fn blank_fields_fall_back() {
        let query = HeatmapQuery {
            after: Some("".into()),
            contexts_regex: Some("  ".into()),
            ..Default::default()
        };
        let (params, _) = query.resolve(&defaults(), RenderOptions::default()).unwrap();
        assert_eq!(params.after, -900);
        assert_eq!(params.contexts_regex, "system");
    }

    #[test]
    fn values_override() {
        let query = HeatmapQuery {
            after: Some("-300".into()),
            n_clusters: Some("4".into()),
            freq: Some("1m".into()),
            fig_h: Some("12".into()),
            ..Default::default()
        };
        let (params, render) = query.resolve(&defaults(), RenderOptions::default()).unwrap();
        assert_eq!(params.after, -300);
        assert_eq!(params.n_clusters, 4);
        assert_eq!(params.freq, "1m");
        assert_eq!(render.fig_h, 12);
        assert_eq!(render.fig_w, 900);
    }

    #[test]
    fn bad_number_is_reported() {
        let query = HeatmapQuery {
            n_clusters: Some("many".into()),
            ..Default::default()
        };
        let err = query
            .resolve(&defaults(), RenderOptions::default())
            .unwrap_err();
        assert!(err.contains("n_clusters"));
    }

    #[test]
    fn oversized_figure_is_rejected() {
        let query = HeatmapQuery {
            fig_h: Some(u32::MAX.to_string()),
            ..Default::default()
        };
        let err = query
            .resolve(&defaults(), RenderOptions::default())
            .unwrap_err();
        assert!(err.contains("fig_h"));
    }
}
