use std::boxed::Box;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::result::Result as DefaultResult;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::constant::price_index::DEFAULT_CUSTOMER_SEGMENT;
use crate::datastore::{
    AbsDStoreFilterKeyOp, AbstInMemoryDStore, AppInMemFetchedSingleRow, AppInMemFetchedSingleTable,
};
use crate::error::{AppError, AppErrorCode};
use crate::model::{PriceIndexRow, ProductLinkModel, ProductRef, SpecialPriceFlagRow};
use crate::repository::AbsPriceIndexRepo;

mod _entity {
    pub(super) const TABLE_LABEL: &str = "product_entity";
    pub(super) enum InMemColIdx {
        EntityId,
        LinkId,
        TotNumColumns,
    }
    impl From<InMemColIdx> for usize {
        fn from(value: InMemColIdx) -> usize {
            match value {
                InMemColIdx::EntityId => 0,
                InMemColIdx::LinkId => 1,
                InMemColIdx::TotNumColumns => 2,
            }
        }
    }
}

mod _super_link {
    pub(super) const TABLE_LABEL: &str = "product_super_link";
    pub(super) enum InMemColIdx {
        ParentLinkId,
        ChildId,
        TotNumColumns,
    }
    impl From<InMemColIdx> for usize {
        fn from(value: InMemColIdx) -> usize {
            match value {
                InMemColIdx::ParentLinkId => 0,
                InMemColIdx::ChildId => 1,
                InMemColIdx::TotNumColumns => 2,
            }
        }
    }
}

mod _index_price {
    pub(super) const TABLE_LABEL: &str = "product_index_price";
    pub(super) enum InMemColIdx {
        ProductId,
        ChannelId,
        CustomerSegment,
        FinalPrice,
        RegularPrice,
        TotNumColumns,
    }
    impl From<InMemColIdx> for usize {
        fn from(value: InMemColIdx) -> usize {
            match value {
                InMemColIdx::ProductId => 0,
                InMemColIdx::ChannelId => 1,
                InMemColIdx::CustomerSegment => 2,
                InMemColIdx::FinalPrice => 3,
                InMemColIdx::RegularPrice => 4,
                InMemColIdx::TotNumColumns => 5,
            }
        }
    }
    pub(super) fn pkey(channel_id: u32, segment: u32, product_id: u64) -> String {
        format!("{channel_id}-{segment}-{product_id}")
    }
}

struct ParentLinkFilterKeyOp {
    parents: HashSet<String>,
}

impl AbsDStoreFilterKeyOp for ParentLinkFilterKeyOp {
    fn filter(&self, _k: &str, v: &[String]) -> bool {
        let idx: usize = _super_link::InMemColIdx::ParentLinkId.into();
        v.get(idx).is_some_and(|p| self.parents.contains(p))
    }
}

fn parse_column<T: FromStr>(
    row: &AppInMemFetchedSingleRow,
    idx: usize,
    label: &str,
) -> DefaultResult<T, AppError> {
    row.get(idx)
        .and_then(|raw| raw.parse::<T>().ok())
        .ok_or_else(|| AppError {
            code: AppErrorCode::DataCorruption,
            detail: Some(format!("table:{label}, column-idx:{idx}")),
        })
}

fn new_row(num_columns: usize, cols: Vec<(usize, String)>) -> Vec<String> {
    let mut row = vec![String::new(); num_columns];
    for (idx, val) in cols {
        row[idx] = val;
    }
    row
}

/// In-memory rendition of the price index, it performs the joins of the
/// batched special-price query on three tables : product entities,
/// configurable-product links and indexed prices.
pub struct PriceIndexInMemRepo {
    datastore: Arc<Box<dyn AbstInMemoryDStore>>,
}

impl PriceIndexInMemRepo {
    pub async fn new(m: Arc<Box<dyn AbstInMemoryDStore>>) -> DefaultResult<Self, AppError> {
        m.create_table(_entity::TABLE_LABEL).await?;
        m.create_table(_super_link::TABLE_LABEL).await?;
        m.create_table(_index_price::TABLE_LABEL).await?;
        Ok(Self { datastore: m })
    }

    async fn _save_common(
        &self,
        label: &str,
        rows: Vec<(String, Vec<String>)>,
    ) -> DefaultResult<usize, AppError> {
        if rows.is_empty() {
            return Err(AppError {
                code: AppErrorCode::EmptyInputData,
                detail: Some(format!("save-{label}")),
            });
        }
        let table = HashMap::from_iter(rows);
        let data = HashMap::from([(label.to_string(), table)]);
        self.datastore.save(data).await
    }

    pub async fn save_entities(&self, items: Vec<ProductRef>) -> DefaultResult<usize, AppError> {
        use _entity::InMemColIdx;
        let rows = items
            .into_iter()
            .map(|m| {
                let cols: Vec<(usize, String)> = vec![
                    (InMemColIdx::EntityId.into(), m.entity_id.to_string()),
                    (InMemColIdx::LinkId.into(), m.link_id.to_string()),
                ];
                let row = new_row(InMemColIdx::TotNumColumns.into(), cols);
                (m.entity_id.to_string(), row)
            })
            .collect();
        self._save_common(_entity::TABLE_LABEL, rows).await
    }

    pub async fn save_links(&self, items: Vec<ProductLinkModel>) -> DefaultResult<usize, AppError> {
        use _super_link::InMemColIdx;
        let rows = items
            .into_iter()
            .map(|m| {
                let pkey = format!("{}-{}", m.parent_link_id, m.child_id);
                let cols: Vec<(usize, String)> = vec![
                    (InMemColIdx::ParentLinkId.into(), m.parent_link_id.to_string()),
                    (InMemColIdx::ChildId.into(), m.child_id.to_string()),
                ];
                (pkey, new_row(InMemColIdx::TotNumColumns.into(), cols))
            })
            .collect();
        self._save_common(_super_link::TABLE_LABEL, rows).await
    }

    pub async fn save_index_rows(&self, items: Vec<PriceIndexRow>) -> DefaultResult<usize, AppError> {
        use _index_price::InMemColIdx;
        let rows = items
            .into_iter()
            .map(|m| {
                let pkey = _index_price::pkey(m.channel_id, m.customer_segment, m.product_id);
                let cols: Vec<(usize, String)> = vec![
                    (InMemColIdx::ProductId.into(), m.product_id.to_string()),
                    (InMemColIdx::ChannelId.into(), m.channel_id.to_string()),
                    (InMemColIdx::CustomerSegment.into(), m.customer_segment.to_string()),
                    (InMemColIdx::FinalPrice.into(), m.final_price.to_string()),
                    (InMemColIdx::RegularPrice.into(), m.regular_price.to_string()),
                ];
                (pkey, new_row(InMemColIdx::TotNumColumns.into(), cols))
            })
            .collect();
        self._save_common(_index_price::TABLE_LABEL, rows).await
    }

    async fn _fetch_table(
        &self,
        label: &str,
        keys: Vec<String>,
    ) -> DefaultResult<AppInMemFetchedSingleTable, AppError> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        let info = HashMap::from([(label.to_string(), keys)]);
        let mut result_raw = self.datastore.fetch(info).await?;
        Ok(result_raw.remove(label).unwrap_or_default())
    }

    async fn fetch_entities(&self, ids: &[u64]) -> DefaultResult<Vec<ProductRef>, AppError> {
        use _entity::InMemColIdx;
        let keys = ids.iter().map(u64::to_string).collect();
        let table = self._fetch_table(_entity::TABLE_LABEL, keys).await?;
        let mut out = table
            .values()
            .map(|row| -> DefaultResult<ProductRef, AppError> {
                Ok(ProductRef {
                    entity_id: parse_column(row, InMemColIdx::EntityId.into(), _entity::TABLE_LABEL)?,
                    link_id: parse_column(row, InMemColIdx::LinkId.into(), _entity::TABLE_LABEL)?,
                })
            })
            .collect::<DefaultResult<Vec<_>, AppError>>()?;
        out.sort_by_key(|e| e.entity_id);
        Ok(out)
    }

    /// children of configurable products, grouped by link ID of the parent
    async fn fetch_children(
        &self,
        entities: &[ProductRef],
    ) -> DefaultResult<BTreeMap<u64, Vec<u64>>, AppError> {
        use _super_link::InMemColIdx;
        let op = ParentLinkFilterKeyOp {
            parents: entities.iter().map(|e| e.link_id.to_string()).collect(),
        };
        let label = _super_link::TABLE_LABEL;
        let keys = self.datastore.filter_keys(label.to_string(), &op).await?;
        let table = self._fetch_table(label, keys).await?;
        let mut out: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
        for row in table.values() {
            let parent = parse_column::<u64>(row, InMemColIdx::ParentLinkId.into(), label)?;
            let child = parse_column::<u64>(row, InMemColIdx::ChildId.into(), label)?;
            out.entry(parent).or_default().push(child);
        }
        out.values_mut().for_each(|children| children.sort_unstable());
        Ok(out)
    }

    async fn fetch_index_rows(
        &self,
        channel_id: u32,
        product_ids: HashSet<u64>,
    ) -> DefaultResult<HashMap<u64, PriceIndexRow>, AppError> {
        use _index_price::InMemColIdx;
        let label = _index_price::TABLE_LABEL;
        let segment = DEFAULT_CUSTOMER_SEGMENT;
        let keys = product_ids
            .into_iter()
            .map(|id| _index_price::pkey(channel_id, segment, id))
            .collect();
        let table = self._fetch_table(label, keys).await?;
        table
            .values()
            .map(|row| -> DefaultResult<(u64, PriceIndexRow), AppError> {
                let m = PriceIndexRow {
                    product_id: parse_column(row, InMemColIdx::ProductId.into(), label)?,
                    channel_id: parse_column(row, InMemColIdx::ChannelId.into(), label)?,
                    customer_segment: parse_column(row, InMemColIdx::CustomerSegment.into(), label)?,
                    final_price: parse_column::<Decimal>(row, InMemColIdx::FinalPrice.into(), label)?,
                    regular_price: parse_column::<Decimal>(row, InMemColIdx::RegularPrice.into(), label)?,
                };
                Ok((m.product_id, m))
            })
            .collect()
    }
} // end of impl PriceIndexInMemRepo

#[async_trait]
impl AbsPriceIndexRepo for PriceIndexInMemRepo {
    async fn fetch_special_price_flags(
        &self,
        channel_id: u32,
        ids: Vec<u64>,
    ) -> DefaultResult<Vec<SpecialPriceFlagRow>, AppError> {
        let entities = self.fetch_entities(&ids).await?;
        if entities.is_empty() {
            return Ok(Vec::new());
        }
        let children = self.fetch_children(&entities).await?;
        let priced_ids = entities
            .iter()
            .map(|e| e.entity_id)
            .chain(children.values().flatten().copied())
            .collect::<HashSet<u64>>();
        let prices = self.fetch_index_rows(channel_id, priced_ids).await?;
        let flag_of = |pid: u64| prices.get(&pid).is_some_and(PriceIndexRow::has_special_price);

        let rows = entities
            .into_iter()
            .flat_map(|e| {
                let own_flag = flag_of(e.entity_id);
                match children.get(&e.link_id) {
                    Some(c) if !c.is_empty() => c
                        .iter()
                        .map(|child| SpecialPriceFlagRow {
                            entity_id: e.entity_id,
                            identifier: e.link_id,
                            child_id: Some(*child),
                            has_special_price: flag_of(*child) || own_flag,
                        })
                        .collect::<Vec<_>>(),
                    _others => vec![SpecialPriceFlagRow {
                        entity_id: e.entity_id,
                        identifier: e.link_id,
                        child_id: None,
                        has_special_price: own_flag,
                    }],
                }
            })
            .collect();
        Ok(rows)
    } // end of fn fetch_special_price_flags
} // end of impl AbsPriceIndexRepo for PriceIndexInMemRepo
