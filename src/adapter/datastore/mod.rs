mod in_mem;
mod sql_db;

use std::boxed::Box;
use std::sync::Arc;

pub use in_mem::{
    AbsDStoreFilterKeyOp, AbstInMemoryDStore, AppInMemDeleteInfo, AppInMemFetchKeys,
    AppInMemFetchedData, AppInMemFetchedSingleRow, AppInMemFetchedSingleTable, AppInMemUpdateData,
    AppInMemoryDStore,
};
pub use sql_db::AppMariaDbStore;

use crate::config::AppDataStoreCfg;
use crate::confidentiality::AbstractConfidentiality;
use crate::logging::{app_log_event, AppLogContext, AppLogLevel};

pub struct AppDataStoreContext {
    pub in_mem: Option<Arc<Box<dyn AbstInMemoryDStore>>>,
    pub sql_dbs: Option<Vec<Arc<AppMariaDbStore>>>,
}

pub(crate) fn build_context(
    logctx: Arc<AppLogContext>,
    cfg: &[AppDataStoreCfg],
    confidential: Arc<Box<dyn AbstractConfidentiality>>,
) -> AppDataStoreContext {
    let mut in_mem = None;
    let mut sql_dbs = None;
    for c in cfg {
        match c {
            AppDataStoreCfg::InMemory(d) => {
                let item: Box<dyn AbstInMemoryDStore> = Box::new(AppInMemoryDStore::new(d));
                in_mem = Some(Arc::new(item));
            }
            AppDataStoreCfg::DbServer(d) => {
                match AppMariaDbStore::try_build(d, confidential.clone()) {
                    Ok(item) => {
                        sql_dbs.get_or_insert_with(Vec::new).push(Arc::new(item));
                    }
                    Err(e) => {
                        app_log_event!(logctx, AppLogLevel::ERROR, "alias:{}, {}", d.alias, e);
                    }
                }
            }
        }
    }
    AppDataStoreContext { in_mem, sql_dbs }
}
