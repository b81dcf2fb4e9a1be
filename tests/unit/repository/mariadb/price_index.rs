use catalog_price::model::{SpecialPriceFlagRow, SpecialPriceMap};
use catalog_price::repository::app_repo_price_index;
use catalog_price::usecase::SpecialPriceBulkResolver;

use super::{dstore_ctx_setup, ut_mariadb_state, ut_seed_catalog, UtCatalogSeed};

#[cfg(feature = "mariadb")]
#[tokio::test]
async fn resolve_simple_products_ok() {
    let state = ut_mariadb_state();
    let seed = UtCatalogSeed {
        entities: vec![(10, 10), (20, 20)],
        links: Vec::new(),
        prices: vec![(10, 1, "8.00", "10.00"), (20, 1, "10.00", "10.00")],
    };
    ut_seed_catalog(state.datastore().as_ref(), seed).await;
    let uc = SpecialPriceBulkResolver::try_from_state(&state).await.unwrap();
    let result = uc.generate_special_price_map(1, Some(vec![20, 10, 10])).await;
    assert!(result.is_ok());
    let actual = result.unwrap();
    assert_eq!(actual, SpecialPriceMap::from([(10, true), (20, false)]));
}

#[cfg(feature = "mariadb")]
#[tokio::test]
async fn fetch_configurable_products_ok() {
    let ds = dstore_ctx_setup();
    let seed = UtCatalogSeed {
        entities: vec![(7130, 7131), (7140, 7141)],
        links: vec![(7131, 7132), (7131, 7133), (7141, 7142)],
        prices: vec![
            (7132, 1, "9.00", "9.00"),
            (7133, 1, "7.50", "9.00"),
            (7142, 1, "4.00", "4.00"),
            // parent row only, none of its children is special
            (7140, 1, "5.00", "9.00"),
        ],
    };
    ut_seed_catalog(ds.as_ref(), seed).await;
    let repo = app_repo_price_index(ds).await.unwrap();
    let result = repo.fetch_special_price_flags(1, vec![7130]).await;
    assert!(result.is_ok());
    let mut rows = result.unwrap();
    rows.sort_by_key(|r| r.child_id);
    let expect = [(7132u64, false), (7133, true)]
        .into_iter()
        .map(|(child, flag)| SpecialPriceFlagRow {
            entity_id: 7130,
            identifier: 7131,
            child_id: Some(child),
            has_special_price: flag,
        })
        .collect::<Vec<_>>();
    assert_eq!(rows, expect);
    let rows = repo.fetch_special_price_flags(1, vec![7130, 7140]).await.unwrap();
    let actual = SpecialPriceMap::from(rows.as_slice());
    assert_eq!(actual, SpecialPriceMap::from([(7130, true), (7140, true)]));
}

#[cfg(feature = "mariadb")]
#[tokio::test]
async fn fetch_equal_prices_not_special() {
    let ds = dstore_ctx_setup();
    let seed = UtCatalogSeed {
        entities: vec![(7150, 7150), (7151, 7151)],
        links: Vec::new(),
        prices: vec![(7150, 1, "12.50", "12.50"), (7151, 1, "13.00", "12.50")],
    };
    ut_seed_catalog(ds.as_ref(), seed).await;
    let repo = app_repo_price_index(ds).await.unwrap();
    let rows = repo.fetch_special_price_flags(1, vec![7150, 7151]).await.unwrap();
    let actual = SpecialPriceMap::from(rows.as_slice());
    assert_eq!(actual, SpecialPriceMap::from([(7150, false), (7151, false)]));
}

#[cfg(feature = "mariadb")]
#[tokio::test]
async fn fetch_missing_price_row() {
    let ds = dstore_ctx_setup();
    let seed = UtCatalogSeed {
        entities: vec![(7160, 7160), (7170, 7170)],
        links: Vec::new(),
        // special price under another channel only
        prices: vec![(7170, 2, "1.00", "3.00")],
    };
    ut_seed_catalog(ds.as_ref(), seed).await;
    let repo = app_repo_price_index(ds).await.unwrap();
    let result = repo.fetch_special_price_flags(1, vec![7160, 7169, 7170]).await;
    assert!(result.is_ok());
    let rows = result.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.child_id.is_none() && !r.has_special_price));
    let actual = SpecialPriceMap::from(rows.as_slice());
    assert_eq!(actual, SpecialPriceMap::from([(7160, false), (7170, false)]));
    assert_eq!(actual.get(7169), None);
    let rows = repo.fetch_special_price_flags(2, vec![7170]).await.unwrap();
    assert_eq!(SpecialPriceMap::from(rows.as_slice()).get(7170), Some(true));
}
