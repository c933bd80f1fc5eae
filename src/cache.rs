//! Time-bounded cache of the top stories.
//!
//! Requests read the cached result set while it is fresh. On expiry the
//! request recomputes it while holding the lock, so concurrent misses wait for
//! a single recompute instead of each hitting the API. A background refresher
//! recomputes on a fixed interval outside the lock and only locks to swap the
//! new set in, which keeps requests on the fast path once warmed up.
//!
//! The refresher and an expired request can still race to recompute. Only the
//! result whose computation started last is kept.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::Error;
use crate::hn_api::ItemSource;
use crate::story::Story;

#[derive(Debug, Clone)]
pub(crate) struct CacheConfig {
    pub(crate) num_stories: usize,
    /// How long a result set is served before a request recomputes it.
    pub(crate) ttl: Duration,
    /// Should not exceed `ttl`, otherwise requests regularly pay for a
    /// recompute between two refreshes.
    pub(crate) refresh_interval: Duration,
    pub(crate) item_timeout: Option<Duration>,
}

struct Entry {
    stories: Arc<[Story]>,
    expires_at: Option<Instant>,
    /// When the computation of `stories` started.
    started_at: Option<Instant>,
}

impl Entry {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now < expires_at)
    }
}

pub(crate) struct StoryCache {
    source: Arc<dyn ItemSource>,
    config: CacheConfig,
    entry: tokio::sync::Mutex<Entry>,
}

impl StoryCache {
    pub(crate) fn new(source: Arc<dyn ItemSource>, config: CacheConfig) -> Self {
        if config.refresh_interval > config.ttl {
            tracing::warn!(
                refresh_interval =? config.refresh_interval,
                ttl =? config.ttl,
                "Refresh interval is longer than the cache ttl, requests will miss between refreshes"
            );
        }

        Self {
            source,
            config,
            entry: tokio::sync::Mutex::new(Entry {
                stories: Arc::from(Vec::<Story>::new()),
                expires_at: None,
                started_at: None,
            }),
        }
    }

    /// The current top stories. Only recomputes when the cached set expired.
    pub(crate) async fn get(&self) -> Result<Arc<[Story]>, Error> {
        let mut entry = self.entry.lock().await;
        if entry.is_fresh(Instant::now()) {
            return Ok(Arc::clone(&entry.stories));
        }

        let started_at = Instant::now();
        let stories = self.compute().await?;
        tracing::info!(
            num_stories = stories.len(),
            elapsed =? started_at.elapsed(),
            "Recomputed expired top stories"
        );

        entry.stories = stories.into();
        entry.expires_at = Some(Instant::now() + self.config.ttl);
        entry.started_at = Some(started_at);
        Ok(Arc::clone(&entry.stories))
    }

    /// Starts the background refresher. It runs until [`Refresher::stop`] is
    /// called or the handle is dropped.
    pub(crate) fn spawn_refresher(self: &Arc<Self>) -> Refresher {
        let cache = Arc::clone(self);
        let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(cache.config.refresh_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = async {
                        ticker.tick().await;
                        cache.refresh().await;
                    } => {}
                }
            }
            tracing::info!("Cache refresher stopped");
        });

        Refresher {
            shutdown: Some(shutdown_tx),
            task,
        }
    }

    async fn refresh(&self) {
        let started_at = Instant::now();
        match self.compute().await {
            Ok(stories) => {
                let num_stories = stories.len();
                if self.publish(stories, started_at).await {
                    tracing::info!(
                        num_stories,
                        elapsed =? started_at.elapsed(),
                        "Cache was refreshed"
                    );
                }
            }
            Err(e) => tracing::warn!(error =? e, "Cache refresh failed, serving stale stories"),
        }
    }

    /// Swaps in `stories` unless the cache already holds a set whose
    /// computation started later.
    async fn publish(&self, stories: Vec<Story>, started_at: Instant) -> bool {
        let mut entry = self.entry.lock().await;
        if entry.started_at.is_some_and(|current| current > started_at) {
            tracing::debug!("Discarding refresh older than the cached stories");
            return false;
        }

        entry.stories = stories.into();
        entry.expires_at = Some(Instant::now() + self.config.ttl);
        entry.started_at = Some(started_at);
        true
    }

    async fn compute(&self) -> Result<Vec<Story>, Error> {
        crate::top_stories::top_stories(
            &self.source,
            self.config.num_stories,
            self.config.item_timeout,
        )
        .await
    }
}

/// Handle to the background refresher.
pub(crate) struct Refresher {
    shutdown: Option<tokio::sync::oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<()>,
}

impl Refresher {
    /// Stops the refresher, abandoning a refresh in flight, and waits for it.
    pub(crate) async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Err(e) = (&mut self.task).await {
            tracing::error!(error =? e, "Cache refresher panicked");
        }
    }
}
