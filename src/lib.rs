//! Reprocess crash reports matching a SuperSearch query.
//!
//! A run pages through SuperSearch to collect every matching crash id, then
//! submits the ids to the Reprocessing API in fixed-size batches. Both stages
//! are strictly sequential and any failure aborts the whole run.

pub mod api;
pub mod config;
pub mod error;
pub mod query;
pub mod reprocess;
pub mod search;

use std::num::NonZeroUsize;

use log::info;

pub use api::{CrashStatsApi, HttpApi};
pub use error::{Error, Result};
pub use query::{build_query, Query};

pub const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(500) {
    Some(n) => n,
    None => unreachable!(),
};

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub query: Query,
    /// Page size for searching and chunk size for reprocessing.
    pub batch_size: NonZeroUsize,
    pub auth_token: String,
    /// Collect only; nothing is sent for reprocessing.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub crash_ids: Vec<String>,
    pub reprocessed: usize,
}

pub async fn run<A>(api: &A, settings: &RunSettings) -> Result<RunSummary>
where
    A: CrashStatsApi + ?Sized,
{
    info!("Query: {}", settings.query);

    let crash_ids = search::collect_crash_ids(api, &settings.query, settings.batch_size).await?;

    if settings.dry_run {
        info!("Dry run: skipping reprocessing of {} crash reports", crash_ids.len());
        return Ok(RunSummary {
            crash_ids,
            reprocessed: 0,
        });
    }

    let reprocessed = reprocess::send_for_reprocessing(
        api,
        &crash_ids,
        settings.batch_size,
        &settings.auth_token,
    )
    .await?;

    Ok(RunSummary {
        crash_ids,
        reprocessed,
    })
}
