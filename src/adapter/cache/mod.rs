mod in_mem;

use std::boxed::Box;
use std::marker::{Send, Sync};
use std::result::Result as DefaultResult;

use async_trait::async_trait;

use crate::config::AppResultCacheCfg;
use crate::error::AppError;

pub use in_mem::InMemResultCache;

/// Opaque key / value store with tag-based invalidation. Payloads are
/// serialized by callers, the store never inspects them.
#[async_trait]
pub trait AbstractResultCache: Send + Sync {
    /// return `None` on cache miss, including entries which already expired
    async fn load(&self, key: &str) -> DefaultResult<Option<Vec<u8>>, AppError>;

    /// return `false` if the cache rejects the entry e.g. when running out of capacity
    async fn save(
        &self,
        key: &str,
        value: Vec<u8>,
        tags: Vec<String>,
        ttl_secs: u32,
    ) -> DefaultResult<bool, AppError>;

    /// discard all entries tagged with any of the given tags,
    /// return number of entries removed
    async fn clean_by_tags(&self, tags: Vec<String>) -> DefaultResult<usize, AppError>;
}

// TODO, switch to external cache e.g. Redis once the price index is shared
// between several catalog service nodes
pub fn app_cache_special_price(cfg: &AppResultCacheCfg) -> Option<Box<dyn AbstractResultCache>> {
    if cfg.enabled {
        let cch = InMemResultCache::new(cfg.max_items);
        Some(Box::new(cch))
    } else {
        None
    }
}
