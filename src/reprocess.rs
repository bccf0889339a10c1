use std::num::NonZeroUsize;

use log::info;

use crate::api::CrashStatsApi;
use crate::error::{Error, Result};

/// Submits `crash_ids` for reprocessing in chunks of `batch_size`, one request
/// at a time. Stops at the first response that is not 200 or 201; chunks
/// already sent stay sent.
pub async fn send_for_reprocessing<A>(
    api: &A,
    crash_ids: &[String],
    batch_size: NonZeroUsize,
    auth_token: &str,
) -> Result<usize>
where
    A: CrashStatsApi + ?Sized,
{
    info!("Starting reprocessing");

    let mut submitted = 0;
    for chunk in crash_ids.chunks(batch_size.get()) {
        let status = api.reprocess(chunk, auth_token).await?;
        if !matches!(status, 200 | 201) {
            return Err(Error::Rejected {
                status,
                submitted,
                rejected: chunk.len(),
                remaining: crash_ids.len() - submitted - chunk.len(),
            });
        }

        submitted += chunk.len();
        info!("Reprocessed {} crash reports", chunk.len());
    }

    Ok(submitted)
}
