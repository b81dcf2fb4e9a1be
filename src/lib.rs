use std::boxed::Box;
use std::sync::Arc;

pub mod confidentiality;
pub mod constant;
pub mod error;
pub mod logging;
pub mod model;
pub mod repository;
pub mod usecase;

mod config;
pub use config::{
    AppBasepathCfg, AppCacheCfg, AppCfgHardLimit, AppCfgInitArgs, AppConfidentialCfg, AppConfig,
    AppDataStoreCfg, AppDbServerCfg, AppDbServerType, AppInMemoryDbCfg, AppLogHandlerCfg,
    AppLoggerCfg, AppLoggingCfg, AppResultCacheCfg, ServiceCfg,
};

mod adapter;
pub use adapter::{cache, datastore};

use cache::AbstractResultCache;
use confidentiality::AbstractConfidentiality;
use datastore::AppDataStoreContext;

// global state shared by all threads
pub struct AppSharedState {
    _cfg: Arc<AppConfig>,
    _log: Arc<logging::AppLogContext>,
    dstore: Arc<AppDataStoreContext>,
    _sp_cache: Option<Arc<Box<dyn AbstractResultCache>>>,
}

impl AppSharedState {
    pub fn new(
        cfg: AppConfig,
        log: logging::AppLogContext,
        confidential: Box<dyn AbstractConfidentiality>,
    ) -> Self {
        let confidential = Arc::new(confidential);
        let log = Arc::new(log);
        let ds_ctx = datastore::build_context(log.clone(), &cfg.service.data_store, confidential);
        let sp_cache = cache::app_cache_special_price(&cfg.service.cache.special_price).map(Arc::new);
        Self {
            _cfg: Arc::new(cfg),
            _log: log,
            dstore: Arc::new(ds_ctx),
            _sp_cache: sp_cache,
        }
    } // end of fn new

    pub fn config(&self) -> &Arc<AppConfig> {
        &self._cfg
    }

    pub fn log_context(&self) -> &Arc<logging::AppLogContext> {
        &self._log
    }

    pub fn datastore(&self) -> Arc<AppDataStoreContext> {
        self.dstore.clone()
    }

    /// return `None` if caching of special-price maps is disabled
    pub fn special_price_cache(&self) -> Option<Arc<Box<dyn AbstractResultCache>>> {
        self._sp_cache.clone()
    }
} // end of impl AppSharedState

impl Clone for AppSharedState {
    fn clone(&self) -> Self {
        Self {
            _cfg: self._cfg.clone(),
            _log: self._log.clone(),
            dstore: self.dstore.clone(),
            _sp_cache: self._sp_cache.clone(),
        }
    }
}
