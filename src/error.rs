use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every way a reprocessing run can fail. None of them are retried.
#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid search response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed query argument '{0}': expected key=value")]
    MalformedToken(String),

    #[error("Collected {collected} crash ids but SuperSearch reported {total}")]
    Inconsistent { collected: usize, total: usize },

    #[error("SuperSearch returned an empty page at offset {collected} of {total}")]
    StalledPagination { collected: usize, total: usize },

    #[error(
        "Reprocessing rejected with status {status} \
         ({submitted} accepted, {rejected} rejected, {remaining} never attempted)"
    )]
    Rejected {
        status: u16,
        submitted: usize,
        rejected: usize,
        remaining: usize,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
