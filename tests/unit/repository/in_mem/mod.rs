mod price_index;

use std::boxed::Box;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use catalog_price::datastore::{
    AbsDStoreFilterKeyOp, AbstInMemoryDStore, AppDataStoreContext, AppInMemDeleteInfo,
    AppInMemFetchKeys, AppInMemFetchedData, AppInMemUpdateData,
};
use catalog_price::error::{AppError, AppErrorCode};
use catalog_price::model::{PriceIndexRow, ProductLinkModel, ProductRef};
use catalog_price::repository::PriceIndexInMemRepo;
use catalog_price::AppInMemoryDbCfg;

fn in_mem_ds_ctx_setup<T: AbstInMemoryDStore + 'static>(max_items: u32) -> Arc<AppDataStoreContext> {
    let d = AppInMemoryDbCfg {
        alias: "utest".to_string(),
        max_items,
    };
    let obj: Box<dyn AbstInMemoryDStore> = Box::new(T::new(&d));
    Arc::new(AppDataStoreContext {
        sql_dbs: None,
        in_mem: Some(Arc::new(obj)),
    })
}

struct MockInMemDeadDataStore {}

#[async_trait]
impl AbstInMemoryDStore for MockInMemDeadDataStore {
    fn new(_cfg: &AppInMemoryDbCfg) -> Self
    where
        Self: Sized,
    {
        Self {}
    }
    async fn create_table(&self, _label: &str) -> Result<(), AppError> {
        Ok(())
    }
    async fn save(&self, _data: AppInMemUpdateData) -> Result<usize, AppError> {
        Err(AppError {
            code: AppErrorCode::DataTableNotExist,
            detail: Some("utest".to_string()),
        })
    }
    async fn delete(&self, _info: AppInMemDeleteInfo) -> Result<usize, AppError> {
        Err(AppError {
            code: AppErrorCode::NotImplemented,
            detail: Some("utest".to_string()),
        })
    }
    async fn fetch(&self, _info: AppInMemFetchKeys) -> Result<AppInMemFetchedData, AppError> {
        Err(AppError {
            code: AppErrorCode::AcquireLockFailure,
            detail: Some("utest".to_string()),
        })
    }
    async fn filter_keys(
        &self,
        _tbl_label: String,
        _op: &dyn AbsDStoreFilterKeyOp,
    ) -> Result<Vec<String>, AppError> {
        Err(AppError {
            code: AppErrorCode::NotImplemented,
            detail: Some("utest".to_string()),
        })
    }
}

// catalog of the unit tests, all prices indexed under channel 1 unless
// specified :
// - 10, simple product, special price
// - 20, simple product, final price equal to regular price, a special price
//   for another customer segment is ignored
// - 30, configurable product, one of its children at special price
// - 40, configurable product, none of its children at special price,
//   the parent itself is indexed with a special price
// - 50, configurable product, no special price at all
// - 60, simple product without any indexed price
pub(crate) async fn ut_seed_price_index(repo: &PriceIndexInMemRepo) {
    let entities = [(10, 10), (20, 20), (30, 31), (40, 41), (50, 51), (60, 60)]
        .into_iter()
        .map(|(entity_id, link_id)| ProductRef { entity_id, link_id })
        .collect::<Vec<_>>();
    let result = repo.save_entities(entities).await;
    assert_eq!(result.unwrap(), 6);
    let links = [(31, 301), (31, 302), (41, 401), (41, 402), (51, 501), (51, 502)]
        .into_iter()
        .map(|(parent_link_id, child_id)| ProductLinkModel {
            parent_link_id,
            child_id,
        })
        .collect::<Vec<_>>();
    let result = repo.save_links(links).await;
    assert_eq!(result.unwrap(), 6);
    #[rustfmt::skip]
    let rows = [
        (10, 1, 0, 800, 1000),
        (20, 1, 0, 1000, 1000),
        (20, 1, 1, 500, 1000),
        (301, 1, 0, 1000, 1000),
        (302, 1, 0, 700, 900),
        (40, 1, 0, 500, 900),
        (401, 1, 0, 1000, 1000),
        (501, 1, 0, 1000, 1000),
        (502, 1, 0, 1200, 1200),
        (10, 2, 0, 1000, 1000),
    ];
    let rows = rows
        .into_iter()
        .map(|(product_id, channel_id, customer_segment, fprice, rprice)| PriceIndexRow {
            product_id,
            channel_id,
            customer_segment,
            final_price: Decimal::new(fprice, 2),
            regular_price: Decimal::new(rprice, 2),
        })
        .collect::<Vec<_>>();
    let result = repo.save_index_rows(rows).await;
    assert_eq!(result.unwrap(), 10);
} // end of ut_seed_price_index
