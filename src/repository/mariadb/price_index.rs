use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::{Arguments, Executor, Row, Statement};

use crate::constant::price_index::DEFAULT_CUSTOMER_SEGMENT;
use crate::datastore::AppMariaDbStore;
use crate::error::{AppError, AppErrorCode};
use crate::model::SpecialPriceFlagRow;
use crate::repository::AbsPriceIndexRepo;

struct FetchSpecialPriceArg(u32, Vec<u64>);

impl FetchSpecialPriceArg {
    // - `price` follows the child of a configurable product, or the entity itself
    //   when it has no child, `own_price` always follows the entity itself.
    // - the comparisons evaluate to NULL when no price-index row is joined
    fn sql_pattern(num_batch: usize) -> String {
        let id_placeholders = (0..num_batch).map(|_| "?").collect::<Vec<_>>().join(",");
        format!(
            "SELECT `e`.`entity_id`, `e`.`link_id`, `link`.`product_id`, \
             (`price`.`final_price` < `price`.`price`) AS `child_flag`, \
             (`own_price`.`final_price` < `own_price`.`price`) AS `own_flag` \
             FROM `product_entity` AS `e` \
             LEFT JOIN `product_super_link` AS `link` ON `link`.`parent_id` = `e`.`link_id` \
             LEFT JOIN `product_index_price` AS `price` ON \
             `price`.`entity_id` = COALESCE(`link`.`product_id`, `e`.`entity_id`) \
             AND `price`.`channel_id` = ? AND `price`.`customer_segment` = ? \
             LEFT JOIN `product_index_price` AS `own_price` ON \
             `own_price`.`entity_id` = `e`.`entity_id` \
             AND `own_price`.`channel_id` = ? AND `own_price`.`customer_segment` = ? \
             WHERE `e`.`entity_id` IN ({id_placeholders})"
        )
    }
}

impl TryFrom<FetchSpecialPriceArg> for (String, MySqlArguments) {
    type Error = AppError;
    fn try_from(value: FetchSpecialPriceArg) -> DefaultResult<Self, Self::Error> {
        let FetchSpecialPriceArg(channel_id, ids) = value;
        if ids.is_empty() {
            return Err(AppError {
                code: AppErrorCode::EmptyInputData,
                detail: Some("special-price-product-ids".to_string()),
            });
        }
        let sql_patt = FetchSpecialPriceArg::sql_pattern(ids.len());
        let mut args = MySqlArguments::default();
        let add_err = |e: sqlx::error::BoxDynError| AppError {
            code: AppErrorCode::InvalidInput,
            detail: Some(e.to_string() + ", special-price-query-arg"),
        };
        for _ in 0..2 {
            args.add(channel_id).map_err(add_err)?;
            args.add(DEFAULT_CUSTOMER_SEGMENT).map_err(add_err)?;
        }
        for id_ in ids {
            args.add(id_).map_err(add_err)?;
        }
        Ok((sql_patt, args))
    }
}

impl TryFrom<MySqlRow> for SpecialPriceFlagRow {
    type Error = AppError;
    fn try_from(value: MySqlRow) -> DefaultResult<Self, Self::Error> {
        let entity_id = value.try_get::<u64, usize>(0)?;
        let identifier = value.try_get::<u64, usize>(1)?;
        let child_id = value.try_get::<Option<u64>, usize>(2)?;
        let child_flag = value.try_get::<Option<i64>, usize>(3)?.unwrap_or(0);
        let own_flag = value.try_get::<Option<i64>, usize>(4)?.unwrap_or(0);
        Ok(Self {
            entity_id,
            identifier,
            child_id,
            has_special_price: child_flag != 0 || own_flag != 0,
        })
    }
}

pub struct PriceIndexMariaDbRepo {
    db: Arc<AppMariaDbStore>,
}

impl PriceIndexMariaDbRepo {
    pub fn new(dbs: &[Arc<AppMariaDbStore>]) -> DefaultResult<Self, AppError> {
        // TODO, currently this repo always grabs the first db pool,
        // read replicas of the price index should be balanced once configured
        let db = dbs.first().cloned().ok_or_else(|| AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("mariadb".to_string()),
        })?;
        Ok(Self { db })
    }
}

#[async_trait]
impl AbsPriceIndexRepo for PriceIndexMariaDbRepo {
    async fn fetch_special_price_flags(
        &self,
        channel_id: u32,
        ids: Vec<u64>,
    ) -> DefaultResult<Vec<SpecialPriceFlagRow>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let (sql_patt, args) = FetchSpecialPriceArg(channel_id, ids).try_into()?;
        let mut conn = self.db.acquire().await?;
        let stmt = conn.prepare(sql_patt.as_str()).await?;
        let query = stmt.query_with(args);
        let exec = conn.as_mut();
        let rows = query.fetch_all(exec).await?;
        rows.into_iter().map(SpecialPriceFlagRow::try_from).collect()
    }
}

#[test]
fn verify_special_price_sql_pattern() {
    let actual = FetchSpecialPriceArg::sql_pattern(3);
    assert!(actual.ends_with("WHERE `e`.`entity_id` IN (?,?,?)"));
    assert_eq!(actual.matches('?').count(), 4 + 3);
    assert!(actual.contains("COALESCE(`link`.`product_id`, `e`.`entity_id`)"));
    let result: DefaultResult<(String, MySqlArguments), AppError> =
        FetchSpecialPriceArg(1, Vec::new()).try_into();
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.code, AppErrorCode::EmptyInputData);
    }
}
