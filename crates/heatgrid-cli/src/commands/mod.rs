pub mod contexts;
pub mod heatmap;
pub mod serve;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tracing::info;

use heatgrid_core::{HeatgridConfig, SourceResult, TimeSeriesTable};
use heatgrid_pipeline::{Pipeline, PipelineOptions};
use heatgrid_render::{MAX_FIG_H, MAX_FIG_W};
use heatgrid_source::{MetricsSource, NetdataCloudClient, SeriesRequest, StaticSource};

const DEFAULT_CONFIG: &str = "heatgrid.toml";

/// Overrides for the `[query]`, `[cluster]` and `[render]` config sections.
#[derive(Args, Debug, Default)]
pub struct QueryArgs {
    #[arg(long)]
    pub space_id: Option<String>,
    #[arg(long)]
    pub room_id: Option<String>,
    /// Regex selecting contexts by prefix
    #[arg(long)]
    pub contexts_regex: Option<String>,
    /// Window start, seconds relative to now
    #[arg(long, allow_negative_numbers = true)]
    pub after: Option<i64>,
    /// Window end, seconds relative to now
    #[arg(long, allow_negative_numbers = true)]
    pub before: Option<i64>,
    /// Resampling frequency, e.g. 15s or 1m
    #[arg(long)]
    pub freq: Option<String>,
    #[arg(long)]
    pub n_clusters: Option<usize>,
    /// Heatmap width in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_FIG_W as i64))]
    pub fig_w: Option<u32>,
    /// Height of one metric row in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_FIG_H as i64))]
    pub fig_h: Option<u32>,
    /// Seed for reproducible clustering
    #[arg(long)]
    pub seed: Option<u64>,
    /// Serve metrics from a JSON fixture instead of Netdata Cloud
    #[arg(long)]
    pub fixture: Option<PathBuf>,
}

impl QueryArgs {
    pub fn apply(&self, config: &mut HeatgridConfig) {
        if let Some(v) = &self.space_id {
            config.query.space_id = v.clone();
        }
        if let Some(v) = &self.room_id {
            config.query.room_id = v.clone();
        }
        if let Some(v) = &self.contexts_regex {
            config.query.contexts_regex = v.clone();
        }
        if let Some(v) = self.after {
            config.query.after = v;
        }
        if let Some(v) = self.before {
            config.query.before = v;
        }
        if let Some(v) = &self.freq {
            config.query.freq = v.clone();
        }
        if let Some(v) = self.n_clusters {
            config.cluster.n_clusters = v;
        }
        if let Some(v) = self.fig_w {
            config.render.fig_w = v;
        }
        if let Some(v) = self.fig_h {
            config.render.fig_h = v;
        }
        if self.seed.is_some() {
            config.cluster.seed = self.seed;
        }
    }
}

/// Load `path`, or `./heatgrid.toml` when present, then apply overrides.
pub fn load_config(path: Option<&Path>, query: &QueryArgs) -> anyhow::Result<HeatgridConfig> {
    let mut config = match path {
        Some(path) => HeatgridConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG).exists() => {
            HeatgridConfig::from_file(Path::new(DEFAULT_CONFIG))
                .with_context(|| format!("failed to load {DEFAULT_CONFIG}"))?
        }
        None => HeatgridConfig::default(),
    };
    query.apply(&mut config);
    Ok(config)
}

/// The metrics source selected on the command line.
pub enum CliSource {
    Netdata(NetdataCloudClient),
    Fixture(StaticSource),
}

impl MetricsSource for CliSource {
    async fn list_contexts(&self, space_id: &str, room_id: &str) -> SourceResult<BTreeSet<String>> {
        match self {
            CliSource::Netdata(client) => client.list_contexts(space_id, room_id).await,
            CliSource::Fixture(source) => source.list_contexts(space_id, room_id).await,
        }
    }

    async fn fetch_series(&self, request: &SeriesRequest) -> SourceResult<TimeSeriesTable> {
        match self {
            CliSource::Netdata(client) => client.fetch_series(request).await,
            CliSource::Fixture(source) => source.fetch_series(request).await,
        }
    }
}

pub fn build_pipeline(
    config: &HeatgridConfig,
    fixture: Option<&Path>,
) -> anyhow::Result<Pipeline<CliSource>> {
    let source = match fixture {
        Some(path) => {
            info!(fixture = %path.display(), "using fixture source");
            CliSource::Fixture(
                StaticSource::from_file(path)
                    .with_context(|| format!("failed to load fixture {}", path.display()))?,
            )
        }
        None => CliSource::Netdata(NetdataCloudClient::from_config(config)?),
    };
    Ok(Pipeline::new(
        Arc::new(source),
        PipelineOptions::from_config(config),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_config() {
        let mut config = HeatgridConfig::default();
        let query = QueryArgs {
            contexts_regex: Some("apps".into()),
            before: Some(-60),
            n_clusters: Some(3),
            fig_w: Some(1200),
            seed: Some(9),
            ..Default::default()
        };
        query.apply(&mut config);
        assert_eq!(config.query.contexts_regex, "apps");
        assert_eq!(config.query.before, -60);
        assert_eq!(config.cluster.n_clusters, 3);
        assert_eq!(config.render.fig_w, 1200);
        assert_eq!(config.cluster.seed, Some(9));
        // Untouched fields keep their defaults.
        assert_eq!(config.query.freq, "15s");
        assert_eq!(config.render.fig_h, 25);
    }

    #[test]
    fn explicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heatgrid.toml");
        std::fs::write(&path, "[query]\nfreq = \"1m\"\n\n[cluster]\nn_clusters = 6\n").unwrap();

        let query = QueryArgs {
            n_clusters: Some(2),
            ..Default::default()
        };
        let config = load_config(Some(&path), &query).unwrap();
        assert_eq!(config.query.freq, "1m");
        assert_eq!(config.cluster.n_clusters, 2);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = load_config(Some(&path), &QueryArgs::default()).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn netdata_source_needs_token() {
        let mut config = HeatgridConfig::default();
        config.netdata.api_token = None;
        // SAFETY: no other test in this binary reads the token variable.
        unsafe { std::env::remove_var(heatgrid_core::config::API_TOKEN_ENV) };
        assert!(build_pipeline(&config, None).is_err());
    }

    #[test]
    fn fixture_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.json");
        std::fs::write(
            &path,
            r#"{"contexts": {"system.cpu": {"labels": ["time", "user"], "data": [[0, 1.0]]}}}"#,
        )
        .unwrap();
        assert!(build_pipeline(&HeatgridConfig::default(), Some(&path)).is_ok());
    }
}
