use std::boxed::Box;
use std::sync::Arc;

use catalog_price::datastore::{AbstInMemoryDStore, AppDataStoreContext, AppInMemoryDStore};
use catalog_price::error::AppErrorCode;
use catalog_price::model::{PriceIndexRow, ProductRef, SpecialPriceFlagRow, SpecialPriceMap};
use catalog_price::repository::{app_repo_price_index, AbsPriceIndexRepo, PriceIndexInMemRepo};
use rust_decimal::Decimal;

use super::{in_mem_ds_ctx_setup, ut_seed_price_index, MockInMemDeadDataStore};

async fn in_mem_repo_ds_setup<T: AbstInMemoryDStore + 'static>(max_items: u32) -> PriceIndexInMemRepo {
    let ds_ctx = in_mem_ds_ctx_setup::<T>(max_items);
    let inmem = ds_ctx.in_mem.as_ref().unwrap().clone();
    let result = PriceIndexInMemRepo::new(inmem).await;
    assert!(result.is_ok());
    result.unwrap()
}

async fn ut_fetch_flag_map(repo: &dyn AbsPriceIndexRepo, channel_id: u32, ids: Vec<u64>) -> SpecialPriceMap {
    let result = repo.fetch_special_price_flags(channel_id, ids).await;
    assert!(result.is_ok());
    SpecialPriceMap::from(result.unwrap().as_slice())
}

#[tokio::test]
async fn fetch_simple_products_ok() {
    let repo = in_mem_repo_ds_setup::<AppInMemoryDStore>(30).await;
    ut_seed_price_index(&repo).await;
    let actual = ut_fetch_flag_map(&repo, 1, vec![10, 20]).await;
    assert_eq!(actual, SpecialPriceMap::from([(10, true), (20, false)]));
    let result = repo.fetch_special_price_flags(1, vec![20, 10]).await;
    let rows = result.unwrap();
    let expect = [(10u64, true), (20, false)]
        .into_iter()
        .map(|(id_, flag)| SpecialPriceFlagRow {
            entity_id: id_,
            identifier: id_,
            child_id: None,
            has_special_price: flag,
        })
        .collect::<Vec<_>>();
    assert_eq!(rows, expect);
}

#[tokio::test]
async fn fetch_configurable_products_ok() {
    let repo = in_mem_repo_ds_setup::<AppInMemoryDStore>(30).await;
    ut_seed_price_index(&repo).await;
    let result = repo.fetch_special_price_flags(1, vec![30]).await;
    let rows = result.unwrap();
    assert_eq!(rows.len(), 2);
    let children = rows.iter().map(|r| r.child_id).collect::<Vec<_>>();
    assert_eq!(children, vec![Some(301), Some(302)]);
    assert!(rows.iter().all(|r| r.entity_id == 30 && r.identifier == 31));
    assert_eq!(
        rows.iter().map(|r| r.has_special_price).collect::<Vec<_>>(),
        vec![false, true]
    );
    let actual = ut_fetch_flag_map(&repo, 1, vec![30, 40, 50]).await;
    let expect = SpecialPriceMap::from([(30, true), (40, true), (50, false)]);
    assert_eq!(actual, expect);
}

#[tokio::test]
async fn fetch_missing_price_row() {
    let repo = in_mem_repo_ds_setup::<AppInMemoryDStore>(30).await;
    ut_seed_price_index(&repo).await;
    let actual = ut_fetch_flag_map(&repo, 1, vec![60, 999, 10]).await;
    assert_eq!(actual, SpecialPriceMap::from([(10, true), (60, false)]));
    assert_eq!(actual.get(999), None);
    let actual = ut_fetch_flag_map(&repo, 1, vec![998, 999]).await;
    assert!(actual.is_empty());
    let actual = ut_fetch_flag_map(&repo, 1, Vec::new()).await;
    assert!(actual.is_empty());
}

#[tokio::test]
async fn fetch_other_channel() {
    let repo = in_mem_repo_ds_setup::<AppInMemoryDStore>(30).await;
    ut_seed_price_index(&repo).await;
    let actual = ut_fetch_flag_map(&repo, 2, vec![10, 20, 30]).await;
    let expect = SpecialPriceMap::from([(10, false), (20, false), (30, false)]);
    assert_eq!(actual, expect);
    // channel without any indexed price
    let actual = ut_fetch_flag_map(&repo, 7, vec![10, 40]).await;
    assert_eq!(actual, SpecialPriceMap::from([(10, false), (40, false)]));
}

#[tokio::test]
async fn fetch_after_price_update() {
    let repo = in_mem_repo_ds_setup::<AppInMemoryDStore>(30).await;
    ut_seed_price_index(&repo).await;
    let actual = ut_fetch_flag_map(&repo, 1, vec![50]).await;
    assert_eq!(actual.get(50), Some(false));
    let updated = PriceIndexRow {
        product_id: 502,
        channel_id: 1,
        customer_segment: 0,
        final_price: Decimal::new(1100, 2),
        regular_price: Decimal::new(1200, 2),
    };
    let result = repo.save_index_rows(vec![updated]).await;
    assert_eq!(result.unwrap(), 1);
    let actual = ut_fetch_flag_map(&repo, 1, vec![50]).await;
    assert_eq!(actual.get(50), Some(true));
}

#[tokio::test]
async fn save_empty_input_error() {
    let repo = in_mem_repo_ds_setup::<AppInMemoryDStore>(30).await;
    let result = repo.save_entities(Vec::new()).await;
    assert_eq!(result.err().unwrap().code, AppErrorCode::EmptyInputData);
    let result = repo.save_links(Vec::new()).await;
    assert_eq!(result.err().unwrap().code, AppErrorCode::EmptyInputData);
    let result = repo.save_index_rows(Vec::new()).await;
    assert_eq!(result.err().unwrap().code, AppErrorCode::EmptyInputData);
}

#[tokio::test]
async fn save_exceed_limit() {
    let repo = in_mem_repo_ds_setup::<AppInMemoryDStore>(3).await;
    let entities = (1..=4)
        .map(|entity_id| ProductRef {
            entity_id,
            link_id: entity_id,
        })
        .collect();
    let result = repo.save_entities(entities).await;
    assert_eq!(result.err().unwrap().code, AppErrorCode::ExceedingMaxLimit);
}

#[tokio::test]
async fn datastore_fetch_error() {
    let repo = in_mem_repo_ds_setup::<MockInMemDeadDataStore>(30).await;
    let result = repo.fetch_special_price_flags(1, vec![10, 20]).await;
    assert!(result.is_err());
    let error = result.unwrap_err();
    assert_eq!(error.code, AppErrorCode::AcquireLockFailure);
}

#[cfg(not(feature = "mariadb"))]
#[tokio::test]
async fn repo_factory() {
    let ds_ctx = in_mem_ds_ctx_setup::<AppInMemoryDStore>(30);
    let result = app_repo_price_index(ds_ctx).await;
    assert!(result.is_ok());
    let repo: Box<dyn AbsPriceIndexRepo> = result.unwrap();
    let actual = ut_fetch_flag_map(repo.as_ref(), 1, vec![10]).await;
    assert!(actual.is_empty());
    let ds_ctx = Arc::new(AppDataStoreContext {
        in_mem: None,
        sql_dbs: None,
    });
    let result = app_repo_price_index(ds_ctx).await;
    assert_eq!(result.err().unwrap().code, AppErrorCode::MissingDataStore);
}
