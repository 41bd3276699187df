//! Paged, searchable views over category lists
//!
//! Slices are served from a short-lived cache of unfiltered lists; search
//! filtering always happens after retrieval and is never cached. Each
//! cached list gets a one-shot deferred eviction, independent of the
//! store's own TTL.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::TtlCache;
use crate::catalog::Declaration;

pub const SLICE_TTL: Duration = Duration::from_secs(300);
pub const SLICE_EVICT_DELAY: Duration = Duration::from_secs(300);

/// Runs a one-shot eviction after a delay. Fire-and-forget: there is no
/// ordering guarantee relative to later reads or writes on the same key;
/// a read after eviction simply recomputes.
pub trait EvictionScheduler: Send + Sync {
    fn schedule(&self, delay: Duration, evict: Box<dyn FnOnce() + Send>);
}

/// Spawns the eviction on the tokio runtime.
pub struct TokioEvictionScheduler;

impl EvictionScheduler for TokioEvictionScheduler {
    fn schedule(&self, delay: Duration, evict: Box<dyn FnOnce() + Send>) {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            evict();
        });
    }
}

/// Never evicts; cached slices die by TTL alone.
pub struct NoopEvictionScheduler;

impl EvictionScheduler for NoopEvictionScheduler {
    fn schedule(&self, _delay: Duration, _evict: Box<dyn FnOnce() + Send>) {}
}

/// Evicts immediately, ignoring the delay. Test double.
pub struct InlineEvictionScheduler;

impl EvictionScheduler for InlineEvictionScheduler {
    fn schedule(&self, _delay: Duration, evict: Box<dyn FnOnce() + Send>) {
        evict();
    }
}

#[derive(Debug, Clone)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
    pub search: Option<String>,
    pub pagination_enabled: bool,
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page,
            page_size,
            search: None,
            pagination_enabled: true,
        }
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search = Some(query.into());
        self
    }

    pub fn unpaginated(mut self) -> Self {
        self.pagination_enabled = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub current_page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    pub items: Vec<Declaration>,
    pub pagination: PageInfo,
}

pub struct PaginationView {
    cache: TtlCache<Vec<Declaration>>,
    evictor: Arc<dyn EvictionScheduler>,
}

impl PaginationView {
    pub fn new(evictor: Arc<dyn EvictionScheduler>) -> Self {
        Self {
            cache: TtlCache::new(),
            evictor,
        }
    }

    /// Serves one page of the list behind `cache_key`, filling the slice
    /// cache from `provider` on a miss.
    pub fn paginate<F>(&self, cache_key: &str, provider: F, request: &PageRequest) -> PageResult
    where
        F: FnOnce() -> Vec<Declaration>,
    {
        let items = match self.cache.get(cache_key) {
            Some(items) => items,
            None => {
                let items = provider();
                self.cache.set(cache_key, items.clone(), SLICE_TTL);

                let cache = self.cache.clone();
                let key = cache_key.to_string();
                self.evictor.schedule(
                    SLICE_EVICT_DELAY,
                    Box::new(move || {
                        cache.delete(&key);
                    }),
                );
                items
            }
        };

        let filtered = match request.search.as_deref().filter(|q| !q.is_empty()) {
            Some(query) => {
                let needle = query.to_lowercase();
                items
                    .into_iter()
                    .filter(|d| {
                        d.name.to_lowercase().contains(&needle)
                            || d.path.to_lowercase().contains(&needle)
                    })
                    .collect()
            }
            None => items,
        };

        paginate_list(filtered, request)
    }

    pub fn cached_slices(&self) -> usize {
        self.cache.len()
    }
}

fn paginate_list(items: Vec<Declaration>, request: &PageRequest) -> PageResult {
    let page = request.page.max(1);
    let total_items = items.len();

    if total_items == 0 {
        return PageResult {
            items: Vec::new(),
            pagination: PageInfo {
                current_page: page,
                page_size: request.page_size,
                total_items: 0,
                total_pages: 0,
                has_next: false,
                has_prev: false,
            },
        };
    }

    if !request.pagination_enabled {
        return PageResult {
            pagination: PageInfo {
                current_page: 1,
                page_size: total_items,
                total_items,
                total_pages: 1,
                has_next: false,
                has_prev: false,
            },
            items,
        };
    }

    let page_size = request.page_size.max(1);
    let total_pages = total_items.div_ceil(page_size);
    let start = (page - 1) * page_size;
    let slice: Vec<Declaration> = items.into_iter().skip(start).take(page_size).collect();

    PageResult {
        items: slice,
        pagination: PageInfo {
            current_page: page,
            page_size,
            total_items,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        },
    }
}
