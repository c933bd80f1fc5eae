//! In-memory item source for tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::FetchError;
use crate::hn_api::ItemSource;
use crate::story::{Item, ItemId};

#[derive(Debug, Default)]
pub(crate) struct StubSource {
    pub(crate) ids: Vec<ItemId>,
    pub(crate) comments: HashSet<ItemId>,
    pub(crate) without_url: HashSet<ItemId>,
    pub(crate) failing: HashSet<ItemId>,
    pub(crate) list_fails: AtomicBool,
    /// Base latency of a fetch. Each item gets a different jitter on top so
    /// completion order differs from request order.
    pub(crate) latency: Duration,

    /// Bumped by tests to make a recompute distinguishable from a cached result.
    pub(crate) version: AtomicUsize,
    pub(crate) list_calls: AtomicUsize,
    pub(crate) item_calls: AtomicUsize,
}

impl StubSource {
    /// `count` ranked ids `1..=count`, all story links.
    pub(crate) fn with_stories(count: u64) -> Self {
        Self {
            ids: (1..=count).collect(),
            ..Default::default()
        }
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn item_calls(&self) -> usize {
        self.item_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn bump_version(&self) {
        self.version.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl ItemSource for StubSource {
    async fn top_story_ids(&self) -> Result<Vec<ItemId>, FetchError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.list_fails.load(Ordering::SeqCst) {
            return Err(FetchError::Unavailable("stub is down".to_string()));
        }
        Ok(self.ids.clone())
    }

    async fn item(&self, id: ItemId) -> Result<Item, FetchError> {
        self.item_calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            let jitter = Duration::from_millis((id * 7919) % 13);
            tokio::time::sleep(self.latency + jitter).await;
        }
        if self.failing.contains(&id) {
            return Err(FetchError::Missing(id));
        }

        let item_type = if self.comments.contains(&id) {
            "comment"
        } else {
            "story"
        };
        let url = if self.without_url.contains(&id) {
            String::new()
        } else {
            format!("https://www.site{id}.com/post")
        };

        Ok(Item {
            id,
            item_type: item_type.to_string(),
            url,
            title: format!("story {id} v{}", self.version.load(Ordering::SeqCst)),
            author: "pg".to_string(),
            ..Default::default()
        })
    }
}
