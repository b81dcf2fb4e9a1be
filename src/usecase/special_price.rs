use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use crate::adapter::cache::AbstractResultCache;
use crate::error::AppError;
use crate::logging::{app_log_event, AppLogContext, AppLogLevel};
use crate::model::{special_price_cache_tags, ProductIdSet, SpecialPriceMap};
use crate::repository::{app_repo_price_index, AbsPriceIndexRepo};
use crate::AppSharedState;

type SharedResultCache = Arc<Box<dyn AbstractResultCache>>;

/// Determine whether each product in a batch has an active special price under
/// a sales channel. A configurable product is flagged when any of its children,
/// or the product itself, is indexed with a final price lower than the regular
/// price.
///
/// The returned map contains every requested product known to the catalog,
/// products without any price-index row are flagged `false`, IDs unknown to
/// the catalog are absent.
pub struct SpecialPriceBulkResolver {
    repo: Box<dyn AbsPriceIndexRepo>,
    cache: Option<(SharedResultCache, u32)>,
    logctx: Arc<AppLogContext>,
}

impl SpecialPriceBulkResolver {
    pub fn new(repo: Box<dyn AbsPriceIndexRepo>, logctx: Arc<AppLogContext>) -> Self {
        Self {
            repo,
            logctx,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: SharedResultCache, ttl_secs: u32) -> Self {
        self.cache = Some((cache, ttl_secs));
        self
    }

    pub async fn try_from_state(state: &AppSharedState) -> DefaultResult<Self, AppError> {
        let repo = app_repo_price_index(state.datastore()).await?;
        let obj = Self::new(repo, state.log_context().clone());
        let ttl_secs = state.config().service.cache.special_price.ttl_secs;
        let obj = if let Some(c) = state.special_price_cache() {
            obj.with_cache(c, ttl_secs)
        } else {
            obj
        };
        Ok(obj)
    }

    pub async fn generate_special_price_map(
        &self,
        channel_id: u32,
        product_ids: Option<Vec<u64>>,
    ) -> DefaultResult<SpecialPriceMap, AppError> {
        let ids = ProductIdSet::new(product_ids.unwrap_or_default());
        if ids.is_empty() {
            return Ok(SpecialPriceMap::default());
        }
        let cache_key = ids.cache_key(channel_id);
        if let Some(m) = self.load_cached(cache_key.as_str()).await {
            return Ok(m);
        }
        let num_ids = ids.as_slice().len();
        let rows = self
            .repo
            .fetch_special_price_flags(channel_id, ids.into_inner())
            .await
            .map_err(|e| {
                let logctx = &self.logctx;
                app_log_event!(
                    logctx,
                    AppLogLevel::ERROR,
                    "channel:{}, num-ids:{}, {}",
                    channel_id,
                    num_ids,
                    e
                );
                e
            })?;
        let out = SpecialPriceMap::from(rows.as_slice());
        let tags = special_price_cache_tags(&rows);
        self.save_cached(cache_key.as_str(), &out, tags).await;
        Ok(out)
    } // end of fn generate_special_price_map

    async fn load_cached(&self, key: &str) -> Option<SpecialPriceMap> {
        let logctx = &self.logctx;
        let (cache, _ttl) = self.cache.as_ref()?;
        match cache.load(key).await {
            Ok(Some(raw)) => match SpecialPriceMap::deserialize_bytes(&raw) {
                Ok(m) => {
                    app_log_event!(logctx, AppLogLevel::DEBUG, "cache-hit, key:{}", key);
                    Some(m)
                }
                Err(e) => {
                    app_log_event!(logctx, AppLogLevel::WARNING, "key:{}, {}", key, e);
                    None
                }
            },
            Ok(None) => {
                app_log_event!(logctx, AppLogLevel::DEBUG, "cache-miss, key:{}", key);
                None
            }
            Err(e) => {
                app_log_event!(logctx, AppLogLevel::WARNING, "key:{}, {}", key, e);
                None
            }
        }
    }

    // failure at this point does not discard the computed map
    async fn save_cached(&self, key: &str, data: &SpecialPriceMap, tags: Vec<String>) {
        let logctx = &self.logctx;
        let Some((cache, ttl_secs)) = self.cache.as_ref() else {
            return;
        };
        let result = match data.serialize_bytes() {
            Ok(serial) => cache.save(key, serial, tags, *ttl_secs).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(true) => {}
            Ok(false) => {
                app_log_event!(logctx, AppLogLevel::WARNING, "cache-rejected, key:{}", key);
            }
            Err(e) => {
                app_log_event!(logctx, AppLogLevel::WARNING, "key:{}, {}", key, e);
            }
        }
    }
} // end of impl SpecialPriceBulkResolver
