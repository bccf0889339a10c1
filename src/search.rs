use std::num::NonZeroUsize;

use log::{debug, info};

use crate::api::CrashStatsApi;
use crate::error::{Error, Result};
use crate::query::Query;

const FACETS_SIZE: &str = "_facets_size";
const RESULTS_NUMBER: &str = "_results_number";
const COLUMNS: &str = "_columns";
const RESULTS_OFFSET: &str = "_results_offset";

fn is_override(key: &str) -> bool {
    matches!(key, FACETS_SIZE | RESULTS_NUMBER | COLUMNS | RESULTS_OFFSET)
}

/// Query pairs for one page: the user's criteria plus the fixed paging
/// overrides, which replace any user-supplied value for the same key.
pub fn page_params(query: &Query, page_size: usize, offset: usize) -> Vec<(String, String)> {
    let mut params = query.pairs_except(is_override);
    params.push((FACETS_SIZE.to_string(), "0".to_string()));
    params.push((RESULTS_NUMBER.to_string(), page_size.to_string()));
    params.push((COLUMNS.to_string(), "uuid".to_string()));
    params.push((RESULTS_OFFSET.to_string(), offset.to_string()));
    params
}

/// Pages through SuperSearch until every crash id matching `query` is
/// collected.
///
/// `total` is re-read from every page, so the loop bound follows the dataset
/// if it changes while paging. The final count must equal the last reported
/// total; anything else fails the run.
pub async fn collect_crash_ids<A>(
    api: &A,
    query: &Query,
    page_size: NonZeroUsize,
) -> Result<Vec<String>>
where
    A: CrashStatsApi + ?Sized,
{
    let mut crash_ids: Vec<String> = Vec::new();
    let mut total_results = 1;

    while crash_ids.len() < total_results {
        let params = page_params(query, page_size.get(), crash_ids.len());
        let page = api.search(&params).await?;
        total_results = page.total;

        let pulled = page.hits.len();
        crash_ids.extend(page.hits.into_iter().map(|hit| hit.uuid));
        info!("Pulled {} results", pulled);
        debug!("{} of {} collected", crash_ids.len(), total_results);

        if pulled == 0 && crash_ids.len() < total_results {
            return Err(Error::StalledPagination {
                collected: crash_ids.len(),
                total: total_results,
            });
        }
    }

    if crash_ids.len() != total_results {
        return Err(Error::Inconsistent {
            collected: crash_ids.len(),
            total: total_results,
        });
    }

    info!("Received {} results from SuperSearch", crash_ids.len());
    Ok(crash_ids)
}
