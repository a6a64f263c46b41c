//! Netdata Cloud REST client.
//!
//! Lists chart contexts for a space/room and fetches per-context data
//! grouped by dimension. Authentication is a bearer API token.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use heatgrid_core::{HeatgridConfig, SourceError, SourceResult, TimeSeriesTable};

use crate::payload::SeriesPayload;
use crate::{MetricsSource, SeriesRequest};

#[derive(Debug, Deserialize)]
struct ChartsResponse {
    #[serde(default)]
    results: HashMap<String, ChartInfo>,
}

#[derive(Debug, Deserialize)]
struct ChartInfo {
    context: Option<String>,
}

/// The data endpoint answers either with the payload itself or wrapped
/// in a `result` object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DataResponse {
    Wrapped { result: SeriesPayload },
    Plain(SeriesPayload),
}

impl DataResponse {
    fn into_payload(self) -> SeriesPayload {
        match self {
            DataResponse::Wrapped { result } => result,
            DataResponse::Plain(payload) => payload,
        }
    }
}

/// Client for the Netdata Cloud v2 API.
#[derive(Debug, Clone)]
pub struct NetdataCloudClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    timeout: Duration,
}

impl NetdataCloudClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> SourceResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("heatgrid/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::Request(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            timeout,
        })
    }

    /// Build a client from `[netdata]`, requiring an API token either in
    /// the file or in `NETDATA_API_TOKEN`.
    pub fn from_config(config: &HeatgridConfig) -> SourceResult<Self> {
        let token = config.api_token().ok_or_else(|| {
            SourceError::Config(format!(
                "no API token; set [netdata].api_token or {}",
                heatgrid_core::config::API_TOKEN_ENV
            ))
        })?;
        Self::new(&config.netdata.base_url, &token, config.fetch_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn room_url(&self, space_id: &str, room_id: &str, leaf: &str) -> SourceResult<String> {
        if space_id.is_empty() || room_id.is_empty() {
            return Err(SourceError::Config("space_id and room_id are required".into()));
        }
        Ok(format!(
            "{}/spaces/{space_id}/rooms/{room_id}/{leaf}",
            self.base_url
        ))
    }

    fn map_transport(&self, e: reqwest::Error) -> SourceError {
        if e.is_timeout() {
            SourceError::Timeout(self.timeout)
        } else if e.is_decode() {
            SourceError::Decode(e.to_string())
        } else {
            SourceError::Request(e.to_string())
        }
    }

    fn check_status(
        &self,
        resp: reqwest::Response,
        url: &str,
        context: Option<&str>,
    ) -> SourceResult<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        debug!(%status, %url, "netdata request returned non-2xx");
        match (status, context) {
            (StatusCode::NOT_FOUND, Some(ctx)) => Err(SourceError::UnknownContext(ctx.to_string())),
            _ => Err(SourceError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }
}

impl MetricsSource for NetdataCloudClient {
    async fn list_contexts(&self, space_id: &str, room_id: &str) -> SourceResult<BTreeSet<String>> {
        let url = self.room_url(space_id, room_id, "charts")?;
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;
        let resp = self.check_status(resp, &url, None)?;
        let charts: ChartsResponse = resp.json().await.map_err(|e| self.map_transport(e))?;

        let contexts: BTreeSet<String> = charts
            .results
            .into_values()
            .filter_map(|c| c.context)
            .collect();
        debug!(%space_id, %room_id, contexts = contexts.len(), "listed contexts");
        Ok(contexts)
    }

    async fn fetch_series(&self, request: &SeriesRequest) -> SourceResult<TimeSeriesTable> {
        let url = self.room_url(&request.space_id, &request.room_id, "data")?;
        let body = json!({
            "scope": {
                "contexts": [request.context],
                "nodes": [],
            },
            "window": {
                "after": request.after,
                "before": request.before,
                "points": request.points(),
            },
            "aggregations": {
                "metric": [{"group_by": ["dimension"], "aggregation": "sum"}],
                "time": {"time_group": "average", "time_resampling": 0},
            },
            "format": "json",
            "options": ["seconds", "flip"],
        });

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;
        let resp = self.check_status(resp, &url, Some(&request.context))?;
        let data: DataResponse = resp.json().await.map_err(|e| self.map_transport(e))?;

        let table = data.into_payload().into_table()?;
        debug!(
            context = %request.context,
            rows = table.num_rows(),
            columns = table.num_columns(),
            "fetched series"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> NetdataCloudClient {
        NetdataCloudClient::new("https://example.invalid/api/v2/", "tok", Duration::from_secs(1))
            .unwrap()
    }

    #[test]
    fn base_url_is_trimmed() {
        assert_eq!(client().base_url(), "https://example.invalid/api/v2");
    }

    #[test]
    fn room_url_layout() {
        let url = client().room_url("space", "room", "charts").unwrap();
        assert_eq!(url, "https://example.invalid/api/v2/spaces/space/rooms/room/charts");
    }

    #[test]
    fn room_url_requires_ids() {
        assert!(matches!(
            client().room_url("", "room", "data"),
            Err(SourceError::Config(_))
        ));
    }

    #[test]
    fn from_config_uses_configured_token() {
        let mut config = HeatgridConfig::default();
        config.netdata.api_token = Some("abc".into());
        config.netdata.base_url = "http://localhost:1".into();
        let client = NetdataCloudClient::from_config(&config).unwrap();
        assert_eq!(client.token, "abc");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn charts_response_collects_contexts() {
        let resp: ChartsResponse = serde_json::from_str(
            r#"{"results": {
                "system.cpu": {"context": "system.cpu"},
                "cpu.cpu0": {"context": "cpu.cpu"},
                "cpu.cpu1": {"context": "cpu.cpu"},
                "broken": {}
            }}"#,
        )
        .unwrap();
        let contexts: BTreeSet<String> =
            resp.results.into_values().filter_map(|c| c.context).collect();
        assert_eq!(contexts.len(), 2);
        assert!(contexts.contains("cpu.cpu"));
    }

    #[test]
    fn data_response_accepts_both_shapes() {
        let wrapped: DataResponse =
            serde_json::from_str(r#"{"result": {"labels": ["time", "a"], "data": [[1, 2]]}}"#)
                .unwrap();
        let plain: DataResponse =
            serde_json::from_str(r#"{"labels": ["time", "a"], "data": [[1, 2]]}"#).unwrap();
        assert_eq!(wrapped.into_payload(), plain.into_payload());
    }

    #[tokio::test]
    async fn unreachable_host_is_a_source_error() {
        let client =
            NetdataCloudClient::new("http://127.0.0.1:9", "tok", Duration::from_millis(500))
                .unwrap();
        let err = client.list_contexts("s", "r").await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::Request(_) | SourceError::Timeout(_)
        ));
    }
}
