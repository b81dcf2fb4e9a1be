use std::collections::{HashMap, HashSet};
use std::result::Result as DefaultResult;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Local as LocalTime};

use super::AbstractResultCache;
use crate::error::{AppError, AppErrorCode};

struct CacheEntry {
    value: Vec<u8>,
    tags: HashSet<String>,
    expiry: DateTime<FixedOffset>,
}

impl CacheEntry {
    fn expired(&self, now: DateTime<FixedOffset>) -> bool {
        self.expiry <= now
    }
}

pub struct InMemResultCache {
    max_items: usize,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl InMemResultCache {
    pub fn new(max_items: u32) -> Self {
        Self {
            max_items: max_items as usize,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn try_lock(&self) -> DefaultResult<MutexGuard<HashMap<String, CacheEntry>>, AppError> {
        self.entries.lock().map_err(|e| AppError {
            code: AppErrorCode::AcquireLockFailure,
            detail: Some(e.to_string() + ", source: InMemResultCache"),
        })
    }

    fn purge_expired(entries: &mut HashMap<String, CacheEntry>, now: DateTime<FixedOffset>) {
        entries.retain(|_k, v| !v.expired(now));
    }
}

#[async_trait]
impl AbstractResultCache for InMemResultCache {
    async fn load(&self, key: &str) -> DefaultResult<Option<Vec<u8>>, AppError> {
        let now = LocalTime::now().fixed_offset();
        let mut guard = self.try_lock()?;
        let expired = match guard.get(key) {
            Some(e) if !e.expired(now) => return Ok(Some(e.value.clone())),
            Some(_e) => true,
            None => false,
        };
        if expired {
            guard.remove(key);
        }
        Ok(None)
    }

    async fn save(
        &self,
        key: &str,
        value: Vec<u8>,
        tags: Vec<String>,
        ttl_secs: u32,
    ) -> DefaultResult<bool, AppError> {
        let now = LocalTime::now().fixed_offset();
        let mut guard = self.try_lock()?;
        if !guard.contains_key(key) && guard.len() >= self.max_items {
            Self::purge_expired(&mut guard, now);
            if guard.len() >= self.max_items {
                return Ok(false);
            }
        }
        let entry = CacheEntry {
            value,
            tags: HashSet::from_iter(tags),
            expiry: now + Duration::seconds(ttl_secs as i64),
        };
        guard.insert(key.to_string(), entry);
        Ok(true)
    }

    async fn clean_by_tags(&self, tags: Vec<String>) -> DefaultResult<usize, AppError> {
        let mut guard = self.try_lock()?;
        let num_before = guard.len();
        guard.retain(|_k, v| !tags.iter().any(|t| v.tags.contains(t)));
        Ok(num_before - guard.len())
    }
} // end of impl AbstractResultCache for InMemResultCache
