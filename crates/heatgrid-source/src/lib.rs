//! heatgrid-source — where the time series come from.
//!
//! # Architecture
//!
//! ```text
//! MetricsSource (trait)
//!   ├── list_contexts()  → every context known to the space/room
//!   └── fetch_series()   → one context's table over a relative window
//!
//! NetdataCloudClient  ← Netdata Cloud REST API (bearer token)
//! StaticSource        ← in-memory tables / JSON fixture file
//! ```

pub mod netdata;
pub mod payload;
pub mod static_source;

use std::collections::BTreeSet;
use std::future::Future;

use heatgrid_core::{SourceResult, TimeSeriesTable};

pub use netdata::NetdataCloudClient;
pub use payload::SeriesPayload;
pub use static_source::StaticSource;

/// A request for one context's time series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub space_id: String,
    pub room_id: String,
    pub context: String,
    /// Window start, seconds relative to now.
    pub after: i64,
    /// Window end, seconds relative to now.
    pub before: i64,
    /// Sampling interval in seconds.
    pub freq_secs: i64,
}

impl SeriesRequest {
    /// Number of points to ask for so that samples land `freq_secs` apart.
    pub fn points(&self) -> i64 {
        (self.before.saturating_sub(self.after) / self.freq_secs.max(1)).max(1)
    }
}

/// A provider of metric contexts and their time series.
pub trait MetricsSource: Send + Sync {
    /// List every context available in the given space and room.
    fn list_contexts(
        &self,
        space_id: &str,
        room_id: &str,
    ) -> impl Future<Output = SourceResult<BTreeSet<String>>> + Send;

    /// Fetch one context's time series. Column names are the bare
    /// dimension names; namespacing happens during assembly.
    fn fetch_series(
        &self,
        request: &SeriesRequest,
    ) -> impl Future<Output = SourceResult<TimeSeriesTable>> + Send;
}
