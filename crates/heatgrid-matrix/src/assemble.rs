//! Matrix assembly: concurrent per-context fetch folded into one matrix.
//!
//! Each context is fetched as its own task under a concurrency limit and a
//! per-request timeout. A failed context is logged, recorded and skipped;
//! it never aborts the assembly. Successful tables are folded in context
//! order regardless of which fetch finished first.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use heatgrid_core::{SourceError, SourceResult, TimeSeriesTable};
use heatgrid_source::{MetricsSource, SeriesRequest};

use crate::matrix::MetricMatrix;
use crate::resample::resample;

#[derive(Debug, Clone)]
pub struct AssemblyOptions {
    pub space_id: String,
    pub room_id: String,
    pub after: i64,
    pub before: i64,
    pub freq_secs: i64,
    pub fetch_timeout: Duration,
    pub max_concurrency: usize,
}

/// A context whose fetch failed and was skipped.
#[derive(Debug)]
pub struct ContextFailure {
    pub context: String,
    pub error: SourceError,
}

#[derive(Debug, Default)]
pub struct Assembly {
    pub matrix: MetricMatrix,
    pub failures: Vec<ContextFailure>,
}

impl Assembly {
    pub fn failed_contexts(&self) -> Vec<String> {
        self.failures.iter().map(|f| f.context.clone()).collect()
    }
}

/// Fetch every context and outer-join the results on time.
///
/// Columns are namespaced as `<context>.<dimension>`. Zero contexts yield
/// an empty matrix.
pub async fn assemble<S>(source: Arc<S>, contexts: &[String], options: &AssemblyOptions) -> Assembly
where
    S: MetricsSource + 'static,
{
    let semaphore = Arc::new(Semaphore::new(options.max_concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for (idx, context) in contexts.iter().enumerate() {
        let source = Arc::clone(&source);
        let semaphore = Arc::clone(&semaphore);
        let timeout = options.fetch_timeout;
        let request = SeriesRequest {
            space_id: options.space_id.clone(),
            room_id: options.room_id.clone(),
            context: context.clone(),
            after: options.after,
            before: options.before,
            freq_secs: options.freq_secs,
        };

        tasks.spawn(async move {
            // The semaphore is never closed, so a failed acquire only means
            // running without a permit.
            let _permit = semaphore.acquire_owned().await.ok();
            let result = match tokio::time::timeout(timeout, source.fetch_series(&request)).await {
                Ok(result) => result,
                Err(_) => Err(SourceError::Timeout(timeout)),
            };
            (idx, result)
        });
    }

    let mut results: Vec<Option<SourceResult<TimeSeriesTable>>> =
        contexts.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, result)) => results[idx] = Some(result),
            Err(e) => warn!(error = %e, "context fetch task aborted"),
        }
    }

    let mut assembly = Assembly::default();
    for (context, result) in contexts.iter().zip(results) {
        let result = result
            .unwrap_or_else(|| Err(SourceError::Request("fetch task aborted".to_string())));
        match result {
            Ok(table) => {
                let table = resample(&table, options.freq_secs).with_prefix(context);
                debug!(
                    %context,
                    rows = table.num_rows(),
                    columns = table.num_columns(),
                    "merging context"
                );
                assembly.matrix.outer_join(&table);
            }
            Err(error) => {
                warn!(%context, error = %error, "error on context, skipping");
                assembly.failures.push(ContextFailure {
                    context: context.clone(),
                    error,
                });
            }
        }
    }

    info!(
        contexts = contexts.len(),
        failed = assembly.failures.len(),
        rows = assembly.matrix.num_rows(),
        columns = assembly.matrix.num_columns(),
        "matrix assembled"
    );
    assembly
}
