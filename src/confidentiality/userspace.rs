use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::result::Result as DefaultResult;
use std::sync::RwLock;

use serde_json::Value as JsnVal;

use super::AbstractConfidentiality;
use crate::error::{AppError, AppErrorCode};

const SOURCE_SIZE_LIMIT_NBYTES: u64 = 8196;

/// secrets kept in a JSON file of local file system, each payload is addressed
/// by slash-separated path e.g. `backend_apps/databases/catalog_service`
pub struct UserSpaceConfidentiality {
    src_fullpath: String,
    cached: RwLock<HashMap<String, String>>,
}

impl UserSpaceConfidentiality {
    pub fn build(fullpath: String) -> Self {
        Self {
            cached: RwLock::new(HashMap::new()),
            src_fullpath: fullpath,
        }
    }

    fn rawdata_from_source(&self) -> DefaultResult<Vec<u8>, AppError> {
        let mut file = File::open(self.src_fullpath.as_str()).map_err(|e| AppError {
            code: AppErrorCode::IOerror(e.kind()),
            detail: Some(e.to_string()),
        })?;
        let actual_f_sz = file
            .metadata()
            .map_err(|e| AppError {
                code: AppErrorCode::IOerror(e.kind()),
                detail: Some(e.to_string()),
            })?
            .len();
        if actual_f_sz >= SOURCE_SIZE_LIMIT_NBYTES {
            return Err(AppError {
                code: AppErrorCode::ExceedingMaxLimit,
                detail: Some("source-file".to_string()),
            });
        }
        let mut rawbuf = Vec::new();
        file.read_to_end(&mut rawbuf).map_err(|e| AppError {
            code: AppErrorCode::IOerror(e.kind()),
            detail: Some(e.to_string()),
        })?;
        Ok(rawbuf)
    }

    fn search_json_payload<'a>(
        toplvl: &'a JsnVal,
        id_: &str,
    ) -> DefaultResult<&'a JsnVal, AppError> {
        let mut curr_lvl = toplvl;
        for tok in id_.split('/') {
            let nxt = match curr_lvl {
                JsnVal::Object(o) => o.get(tok),
                JsnVal::Array(a) => tok.parse::<usize>().ok().and_then(|i| a.get(i)),
                _others => None,
            };
            curr_lvl = nxt.ok_or_else(|| AppError {
                detail: Some(format!("path-not-found, id:{id_}, token:{tok}")),
                code: AppErrorCode::NoConfidentialityCfg,
            })?;
        }
        Ok(curr_lvl)
    }
} // end of impl UserSpaceConfidentiality

impl AbstractConfidentiality for UserSpaceConfidentiality {
    fn try_get_payload(&self, id_: &str) -> DefaultResult<String, AppError> {
        let lock_err = |e: String| AppError {
            detail: Some(e + ", source: UserSpaceConfidentiality"),
            code: AppErrorCode::AcquireLockFailure,
        };
        if let Some(v) = self
            .cached
            .read()
            .map_err(|e| lock_err(e.to_string()))?
            .get(id_)
        {
            return Ok(v.clone());
        }
        let rawdata = self.rawdata_from_source()?;
        let toplvl = serde_json::from_slice::<JsnVal>(&rawdata).map_err(|e| AppError {
            code: AppErrorCode::InvalidJsonFormat,
            detail: Some(e.to_string()),
        })?;
        let found = Self::search_json_payload(&toplvl, id_)?.to_string();
        let mut wguard = self.cached.write().map_err(|e| lock_err(e.to_string()))?;
        wguard.insert(id_.to_string(), found.clone());
        Ok(found)
    }
}
