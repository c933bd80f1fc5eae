use std::sync::Arc;
use std::time::Duration;

use crate::error::Error;
use crate::hn_api::ItemSource;
use crate::story::Story;

/// Returns the first `n` story links of the ranked list, in ranked order.
///
/// Roughly a fifth of the top items are not story links, so every round asks
/// for 25% more ids than are still missing. If the ranked list runs out first,
/// whatever was found is returned.
pub(crate) async fn top_stories(
    source: &Arc<dyn ItemSource>,
    n: usize,
    item_timeout: Option<Duration>,
) -> Result<Vec<Story>, Error> {
    let ids = source
        .top_story_ids()
        .await
        .map_err(Error::SourceUnavailable)?;

    let mut stories = Vec::with_capacity(n.min(ids.len()));
    let mut at = 0;
    let mut rounds = 0;

    while stories.len() < n && at < ids.len() {
        let missing = n - stories.len();
        let need = missing.saturating_add(missing / 4).max(1);
        let end = at + need.min(ids.len() - at);

        stories.extend(crate::fetcher::fetch_batch(source, &ids[at..end], item_timeout).await);
        at = end;
        rounds += 1;
    }

    if stories.len() < n {
        tracing::info!(
            requested = n,
            found = stories.len(),
            num_ids = ids.len(),
            "Ran out of ranked ids"
        );
    }
    tracing::debug!(rounds, ids_used = at, "Fetched top stories");

    stories.truncate(n);
    Ok(stories)
}
