use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, FetchError};
use crate::hn_api::ItemSource;
use crate::story::{Item, ItemId, Story};

/// Fetches every id concurrently and returns the story links among them, in the
/// order of `ids`.
///
/// Best effort: an item that fails to load (or exceeds `item_timeout`) is
/// dropped, it never fails the batch.
pub(crate) async fn fetch_batch(
    source: &Arc<dyn ItemSource>,
    ids: &[ItemId],
    item_timeout: Option<Duration>,
) -> Vec<Story> {
    let mut join_set: tokio::task::JoinSet<(usize, Result<Item, FetchError>)> =
        tokio::task::JoinSet::new();

    for (idx, &id) in ids.iter().enumerate() {
        let source = Arc::clone(source);
        join_set.spawn(async move {
            let result = match item_timeout {
                Some(limit) => tokio::time::timeout(limit, source.item(id))
                    .await
                    .unwrap_or(Err(FetchError::Timeout(limit))),
                None => source.item(id).await,
            };
            (idx, result)
        });
    }

    // Completion order is arbitrary, results go back into their request slot.
    let mut slots: Vec<Option<Item>> = vec![None; ids.len()];
    let mut received = 0;
    while let Some(res) = join_set.join_next().await {
        received += 1;
        match res {
            Ok((idx, Ok(item))) => slots[idx] = Some(item),
            Ok((idx, Err(source))) => {
                let error = Error::ItemFetchFailed {
                    id: ids[idx],
                    source,
                };
                tracing::debug!(error =? error, "Dropping item");
            }
            Err(e) => tracing::debug!(error =? e, "Item fetch task did not complete"),
        }
    }
    debug_assert_eq!(received, ids.len());

    slots
        .into_iter()
        .flatten()
        .filter_map(Story::from_item)
        .collect()
}
