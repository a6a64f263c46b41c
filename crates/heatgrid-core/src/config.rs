//! heatgrid.toml configuration parser.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the same parameters the dashboard starts with.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::freq::parse_duration;
use crate::types::HeatmapParams;

/// Environment variable consulted when no API token is configured.
pub const API_TOKEN_ENV: &str = "NETDATA_API_TOKEN";

pub const DEFAULT_BASE_URL: &str = "https://app.netdata.cloud/api/v2";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatgridConfig {
    pub netdata: NetdataConfig,
    pub query: QueryConfig,
    pub cluster: ClusterConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetdataConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    /// Per-request timeout, e.g. `"30s"`.
    pub timeout: String,
    /// Upper bound on concurrent context fetches.
    pub max_concurrency: usize,
}

impl Default for NetdataConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            timeout: "30s".to_string(),
            max_concurrency: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub space_id: String,
    pub room_id: String,
    pub contexts_regex: String,
    pub after: i64,
    pub before: i64,
    pub freq: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            space_id: String::new(),
            room_id: String::new(),
            contexts_regex: r"system|apps|users\..*".to_string(),
            after: -60 * 15,
            before: 0,
            freq: "15s".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub n_clusters: usize,
    /// Number of k-means initializations; the lowest-inertia run wins.
    pub n_init: usize,
    pub max_iter: usize,
    pub seed: Option<u64>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            n_clusters: 15,
            n_init: 5,
            max_iter: 300,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Heatmap width in pixels.
    pub fig_w: u32,
    /// Height of one metric row in pixels.
    pub fig_h: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fig_w: 900,
            fig_h: 25,
        }
    }
}

impl HeatgridConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The configured API token, falling back to `NETDATA_API_TOKEN`.
    pub fn api_token(&self) -> Option<String> {
        self.netdata
            .api_token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var(API_TOKEN_ENV).ok().filter(|t| !t.is_empty()))
    }

    /// Per-request timeout, defaulting to 30 seconds when unparseable.
    pub fn fetch_timeout(&self) -> Duration {
        parse_duration(&self.netdata.timeout).unwrap_or(Duration::from_secs(30))
    }

    /// Request parameters derived from the `[query]` and `[cluster]` sections.
    pub fn params(&self) -> HeatmapParams {
        HeatmapParams {
            space_id: self.query.space_id.clone(),
            room_id: self.query.room_id.clone(),
            contexts_regex: self.query.contexts_regex.clone(),
            after: self.query.after,
            before: self.query.before,
            freq: self.query.freq.clone(),
            n_clusters: self.cluster.n_clusters,
        }
    }
}
