use std::time::Duration;

use crate::error::FetchError;
use crate::story::{Item, ItemId};

pub(crate) const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// Where ranked ids and items come from.
#[async_trait::async_trait]
pub(crate) trait ItemSource: Send + Sync {
    async fn top_story_ids(&self) -> Result<Vec<ItemId>, FetchError>;

    async fn item(&self, id: ItemId) -> Result<Item, FetchError>;
}

/// Hacker News firebase API.
#[derive(Debug, Clone)]
pub(crate) struct HnClient {
    base_url: String,
    /// How long the ranked list request may be retried. `None` disables
    /// retries.
    retry_budget: Option<Duration>,
}

impl HnClient {
    pub(crate) fn new(base_url: &str, retry_budget: Option<Duration>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            retry_budget,
        }
    }

    async fn get_top_story_ids(&self) -> Result<Vec<ItemId>, FetchError> {
        let response = crate::CLIENT
            .get(format!("{}/topstories.json", self.base_url))
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<Vec<ItemId>>().await?)
    }
}

#[async_trait::async_trait]
impl ItemSource for HnClient {
    async fn top_story_ids(&self) -> Result<Vec<ItemId>, FetchError> {
        let Some(budget) = self.retry_budget else {
            return self.get_top_story_ids().await;
        };

        backoff::future::retry_notify(
            crate::backoff::backoff_within(budget),
            || async { Ok::<_, backoff::Error<FetchError>>(self.get_top_story_ids().await?) },
            |e: FetchError, wait: Duration| {
                tracing::warn!(error =? e, wait =? wait, "Retrying top stories request")
            },
        )
        .await
    }

    async fn item(&self, id: ItemId) -> Result<Item, FetchError> {
        let response = crate::CLIENT
            .get(format!("{}/item/{}.json", self.base_url, id))
            .send()
            .await?
            .error_for_status()?;

        response
            .json::<Option<Item>>()
            .await?
            .ok_or(FetchError::Missing(id))
    }
}
