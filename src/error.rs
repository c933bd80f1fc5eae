use crate::story::ItemId;

/// Failure talking to the item source.
#[derive(Debug, thiserror::Error)]
pub(crate) enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answers `null` for deleted or unknown items.
    #[error("item {0} does not exist")]
    Missing(ItemId),

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Only built by in-memory sources in tests.
    #[error("source unavailable: {0}")]
    #[cfg_attr(not(test), allow(unused))]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    /// Listing the ranked ids failed. Fatal for the current request.
    #[error("failed to load top stories")]
    SourceUnavailable(#[source] FetchError),

    /// A single item lookup failed. Absorbed by the batch fetcher.
    #[error("failed to fetch item {id}")]
    ItemFetchFailed {
        id: ItemId,
        #[source]
        source: FetchError,
    },
}
