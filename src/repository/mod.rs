use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;

use crate::datastore::AppDataStoreContext;
use crate::error::{AppError, AppErrorCode};
use crate::model::SpecialPriceFlagRow;

mod in_mem;
pub use in_mem::price_index::PriceIndexInMemRepo;

#[cfg(feature = "mariadb")]
mod mariadb;

#[cfg(feature = "mariadb")]
use mariadb::price_index::PriceIndexMariaDbRepo;

// held across await points of callers running on multi-threaded runtime
#[async_trait]
pub trait AbsPriceIndexRepo: Sync + Send {
    /// Single batched read joining product entities, their configurable-product
    /// children and the price index of the given channel (anonymous customer
    /// segment only). Every known entity in `ids` yields at least one row,
    /// unknown IDs yield nothing.
    async fn fetch_special_price_flags(
        &self,
        channel_id: u32,
        ids: Vec<u64>,
    ) -> DefaultResult<Vec<SpecialPriceFlagRow>, AppError>;
}

#[cfg(feature = "mariadb")]
async fn build_repo(ds: &AppDataStoreContext) -> DefaultResult<Box<dyn AbsPriceIndexRepo>, AppError> {
    let dbs = ds.sql_dbs.as_deref().ok_or_else(|| AppError {
        code: AppErrorCode::MissingDataStore,
        detail: Some("mariadb".to_string()),
    })?;
    Ok(Box::new(PriceIndexMariaDbRepo::new(dbs)?))
}

#[cfg(not(feature = "mariadb"))]
async fn build_repo(ds: &AppDataStoreContext) -> DefaultResult<Box<dyn AbsPriceIndexRepo>, AppError> {
    let m = ds.in_mem.as_ref().ok_or_else(|| AppError {
        code: AppErrorCode::MissingDataStore,
        detail: Some("in-memory".to_string()),
    })?;
    Ok(Box::new(PriceIndexInMemRepo::new(m.clone()).await?))
}

/// price-index repository on top of the SQL database when feature `mariadb`
/// is enabled, otherwise on top of the in-memory store
pub async fn app_repo_price_index(
    ds: Arc<AppDataStoreContext>,
) -> DefaultResult<Box<dyn AbsPriceIndexRepo>, AppError> {
    build_repo(ds.as_ref()).await
}
