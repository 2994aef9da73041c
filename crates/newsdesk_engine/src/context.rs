use std::sync::Arc;

use newsdesk_core::FeedIndex;
use tokio::sync::OnceCell;

use crate::data::{DataStore, RecentMap};
use crate::FetchError;

/// Lazily loaded lookup tables shared by every command. A failed load is
/// not cached, so the next command retries it.
pub struct DispatchContext {
    store: DataStore,
    feed_index: OnceCell<Arc<FeedIndex>>,
    recent: OnceCell<Arc<RecentMap>>,
}

impl DispatchContext {
    pub fn new(store: DataStore) -> Self {
        Self {
            store,
            feed_index: OnceCell::new(),
            recent: OnceCell::new(),
        }
    }

    pub fn with_feed_index(self, index: FeedIndex) -> Self {
        Self {
            feed_index: OnceCell::new_with(Some(Arc::new(index))),
            ..self
        }
    }

    pub fn with_recent_map(self, recent: RecentMap) -> Self {
        Self {
            recent: OnceCell::new_with(Some(Arc::new(recent))),
            ..self
        }
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub async fn feed_index(&self) -> Result<Arc<FeedIndex>, FetchError> {
        self.feed_index
            .get_or_try_init(|| async { self.store.load_feed_index().await.map(Arc::new) })
            .await
            .cloned()
    }

    pub async fn recent_map(&self) -> Result<Arc<RecentMap>, FetchError> {
        self.recent
            .get_or_try_init(|| async { self.store.load_recent_map().await.map(Arc::new) })
            .await
            .cloned()
    }
}
