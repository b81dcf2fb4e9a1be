use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::config::AppInMemoryDbCfg;
use crate::error::{AppError, AppErrorCode};

// application callers are responsible to maintain the structure
// of each row in each table. Each element of a row is stringified
// regardless of its original types (integer, decimal number)
type InnerRow = Vec<String>;
type InnerTable = HashMap<String, InnerRow>;
type AllTable = HashMap<String, InnerTable>;
pub type AppInMemUpdateData = AllTable;
pub type AppInMemDeleteInfo = HashMap<String, Vec<String>>; // list of IDs per table
pub type AppInMemFetchKeys = HashMap<String, Vec<String>>; // list of IDs per table
pub type AppInMemFetchedData = AllTable;
pub type AppInMemFetchedSingleTable = InnerTable;
pub type AppInMemFetchedSingleRow = InnerRow;

pub trait AbsDStoreFilterKeyOp: Send + Sync {
    fn filter(&self, k: &str, v: &[String]) -> bool;
}

#[async_trait]
pub trait AbstInMemoryDStore: Send + Sync {
    fn new(cfg: &AppInMemoryDbCfg) -> Self
    where
        Self: Sized;
    async fn create_table(&self, label: &str) -> DefaultResult<(), AppError>;
    async fn save(&self, data: AppInMemUpdateData) -> DefaultResult<usize, AppError>;
    async fn delete(&self, info: AppInMemDeleteInfo) -> DefaultResult<usize, AppError>;
    async fn fetch(&self, info: AppInMemFetchKeys) -> DefaultResult<AppInMemFetchedData, AppError>;
    async fn filter_keys(
        &self,
        tbl_label: String,
        op: &dyn AbsDStoreFilterKeyOp,
    ) -> DefaultResult<Vec<String>, AppError>;
}

pub struct AppInMemoryDStore {
    max_items_per_table: u32,
    table_map: Mutex<AllTable>,
}

impl AppInMemoryDStore {
    fn try_get_table(&self) -> DefaultResult<MutexGuard<AllTable>, AppError> {
        self.table_map.lock().map_err(|e| AppError {
            detail: Some(e.to_string()),
            code: AppErrorCode::AcquireLockFailure,
        })
    }

    fn _check_table_existence<'a>(
        _map: &AllTable,
        mut labels: impl Iterator<Item = &'a String>,
    ) -> DefaultResult<(), AppError> {
        if let Some(d) = labels.find(|label| !_map.contains_key(label.as_str())) {
            Err(AppError {
                detail: Some(d.to_string()),
                code: AppErrorCode::DataTableNotExist,
            })
        } else {
            Ok(())
        }
    }
} // end of impl AppInMemoryDStore

#[async_trait]
impl AbstInMemoryDStore for AppInMemoryDStore {
    fn new(cfg: &AppInMemoryDbCfg) -> Self {
        Self {
            table_map: Mutex::new(HashMap::new()),
            max_items_per_table: cfg.max_items,
        }
    }

    async fn create_table(&self, label: &str) -> DefaultResult<(), AppError> {
        let mut _map = self.try_get_table()?;
        if !_map.contains_key(label) {
            _map.insert(label.to_string(), HashMap::new());
        }
        Ok(())
    }

    async fn save(&self, data: AppInMemUpdateData) -> DefaultResult<usize, AppError> {
        let mut _map = self.try_get_table()?;
        Self::_check_table_existence(&_map, data.keys())?;
        // the whole batch is rejected if any table would overflow
        let limit = self.max_items_per_table as usize;
        let overflow = data.iter().find(|(label, d_grp)| {
            let table = &_map[label.as_str()];
            let num_new = d_grp.keys().filter(|k| !table.contains_key(*k)).count();
            table.len() + num_new > limit
        });
        if let Some((label, _)) = overflow {
            return Err(AppError {
                detail: Some(format!("table:{}, limit:{}", label, limit)),
                code: AppErrorCode::ExceedingMaxLimit,
            });
        }
        let mut tot_cnt = 0usize;
        for (label, d_grp) in data {
            if let Some(table) = _map.get_mut(label.as_str()) {
                tot_cnt += d_grp.len();
                table.extend(d_grp);
            }
        }
        Ok(tot_cnt)
    } // end of fn save

    async fn delete(&self, info: AppInMemDeleteInfo) -> DefaultResult<usize, AppError> {
        let mut _map = self.try_get_table()?;
        Self::_check_table_existence(&_map, info.keys())?;
        let tot_cnt = info
            .iter()
            .filter_map(|(label, ids)| {
                _map.get_mut(label.as_str())
                    .map(|table| ids.iter().filter_map(|id| table.remove(id)).count())
            })
            .sum();
        Ok(tot_cnt)
    }

    async fn fetch(&self, info: AppInMemFetchKeys) -> DefaultResult<AppInMemFetchedData, AppError> {
        let _map = self.try_get_table()?;
        Self::_check_table_existence(&_map, info.keys())?;
        let out = info
            .into_iter()
            .map(|(label, ids)| {
                let table = &_map[label.as_str()];
                let rs_t = ids
                    .into_iter()
                    .filter_map(|id| table.get(id.as_str()).map(|row| (id, row.clone())))
                    .collect::<InnerTable>();
                (label, rs_t)
            })
            .collect::<AllTable>();
        Ok(out)
    }

    async fn filter_keys(
        &self,
        tbl_label: String,
        op: &dyn AbsDStoreFilterKeyOp,
    ) -> DefaultResult<Vec<String>, AppError> {
        let _map = self.try_get_table()?;
        Self::_check_table_existence(&_map, [&tbl_label].into_iter())?;
        let table = &_map[tbl_label.as_str()];
        let out = table
            .iter()
            .filter(|(k, v)| op.filter(k.as_str(), v.as_slice()))
            .map(|(k, _v)| k.clone())
            .collect();
        Ok(out)
    }
} // end of impl AbstInMemoryDStore for AppInMemoryDStore
