//! In-memory metrics source.
//!
//! Serves fixed tables per context, optionally failing chosen contexts.
//! Loadable from a JSON fixture so the pipeline can run offline:
//!
//! ```json
//! {
//!   "contexts": {
//!     "system.cpu": {"labels": ["time", "user"], "data": [[0, 1.0]]}
//!   },
//!   "failing": ["system.ram"]
//! }
//! ```
//!
//! The request window is ignored; fixture timestamps are served as-is.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use heatgrid_core::{SourceError, SourceResult, TimeSeriesTable};

use crate::payload::SeriesPayload;
use crate::{MetricsSource, SeriesRequest};

#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default)]
    contexts: BTreeMap<String, SeriesPayload>,
    #[serde(default)]
    failing: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    tables: BTreeMap<String, TimeSeriesTable>,
    failing: BTreeSet<String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `table` for `context`.
    pub fn with_table(mut self, context: &str, table: TimeSeriesTable) -> Self {
        self.tables.insert(context.to_string(), table);
        self
    }

    /// List `context` but fail every fetch for it.
    pub fn with_failure(mut self, context: &str) -> Self {
        self.failing.insert(context.to_string());
        self
    }

    pub fn from_json_str(content: &str) -> SourceResult<Self> {
        let fixture: Fixture =
            serde_json::from_str(content).map_err(|e| SourceError::Decode(e.to_string()))?;
        let mut source = Self::new();
        for (context, payload) in fixture.contexts {
            let table = payload.into_table()?;
            source = source.with_table(&context, table);
        }
        for context in fixture.failing {
            source = source.with_failure(&context);
        }
        Ok(source)
    }

    pub fn from_file(path: &Path) -> SourceResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SourceError::Config(format!("cannot read fixture {}: {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }
}

impl MetricsSource for StaticSource {
    async fn list_contexts(&self, _space_id: &str, _room_id: &str) -> SourceResult<BTreeSet<String>> {
        Ok(self
            .tables
            .keys()
            .chain(self.failing.iter())
            .cloned()
            .collect())
    }

    async fn fetch_series(&self, request: &SeriesRequest) -> SourceResult<TimeSeriesTable> {
        if self.failing.contains(&request.context) {
            debug!(context = %request.context, "static source failing on request");
            return Err(SourceError::Request(format!(
                "fetch failed for {}",
                request.context
            )));
        }
        self.tables
            .get(&request.context)
            .cloned()
            .ok_or_else(|| SourceError::UnknownContext(request.context.clone()))
    }
}
