use std::collections::{BTreeMap, BTreeSet};
use std::result::Result as DefaultResult;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constant::cache::tags as cache_tags;
use crate::error::{AppError, AppErrorCode};

/// Product entity known to the catalog. `link_id` is the column referenced by
/// parent / child relations of configurable products, for simple products it
/// usually equals `entity_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRef {
    pub entity_id: u64,
    pub link_id: u64,
}

/// relation between a configurable product and one of its purchasable variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductLinkModel {
    pub parent_link_id: u64,
    pub child_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceIndexRow {
    pub product_id: u64,
    pub channel_id: u32,
    pub customer_segment: u32,
    pub final_price: Decimal,
    pub regular_price: Decimal,
}

impl PriceIndexRow {
    // strictly lower, a final price equal to the regular price is not a special price
    pub fn has_special_price(&self) -> bool {
        self.final_price < self.regular_price
    }
}

/// One row of the batched special-price query. A configurable product yields
/// one row per linked child, a simple product exactly one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialPriceFlagRow {
    pub entity_id: u64,
    pub identifier: u64,
    pub child_id: Option<u64>,
    pub has_special_price: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecialPriceMap(BTreeMap<u64, bool>);

impl SpecialPriceMap {
    /// OR-merge, a flag already set to `true` is never downgraded
    pub fn merge(&mut self, entity_id: u64, flag: bool) {
        let saved = self.0.entry(entity_id).or_insert(flag);
        *saved |= flag;
    }

    pub fn get(&self, entity_id: u64) -> Option<bool> {
        self.0.get(&entity_id).copied()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&u64, &bool)> {
        self.0.iter()
    }

    pub fn serialize_bytes(&self) -> DefaultResult<Vec<u8>, AppError> {
        serde_json::to_vec(&self.0).map_err(|e| AppError {
            code: AppErrorCode::InvalidJsonFormat,
            detail: Some(e.to_string()),
        })
    }

    pub fn deserialize_bytes(raw: &[u8]) -> DefaultResult<Self, AppError> {
        serde_json::from_slice::<BTreeMap<u64, bool>>(raw)
            .map(Self)
            .map_err(|e| AppError {
                code: AppErrorCode::DataCorruption,
                detail: Some(e.to_string() + ", special-price-map"),
            })
    }
} // end of impl SpecialPriceMap

impl From<&[SpecialPriceFlagRow]> for SpecialPriceMap {
    fn from(value: &[SpecialPriceFlagRow]) -> Self {
        value.iter().fold(Self::default(), |mut out, row| {
            out.merge(row.entity_id, row.has_special_price);
            out
        })
    }
}

impl<const N: usize> From<[(u64, bool); N]> for SpecialPriceMap {
    fn from(value: [(u64, bool); N]) -> Self {
        Self(BTreeMap::from(value))
    }
}

/// Product IDs of a lookup request, sorted and without duplicates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductIdSet(Vec<u64>);

impl ProductIdSet {
    pub fn new<I: IntoIterator<Item = u64>>(ids: I) -> Self {
        let uniq = ids.into_iter().collect::<BTreeSet<u64>>();
        Self(uniq.into_iter().collect())
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn as_slice(&self) -> &[u64] {
        self.0.as_slice()
    }
    pub fn into_inner(self) -> Vec<u64> {
        self.0
    }

    /// hex-encoded SHA-256 digest over the ordered IDs and the channel,
    /// e.g. IDs `[10, 20]` at channel `1` digest the text `10_20_store_id_1`
    pub fn cache_key(&self, channel_id: u32) -> String {
        let mut parts = self.0.iter().map(u64::to_string).collect::<Vec<_>>();
        parts.push(format!("store_id_{channel_id}"));
        let mut hasher = Sha256::new();
        hasher.update(parts.join("_").as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// invalidation tags of a cached special-price map : a fixed set for category /
/// product / price changes, then one tag per distinct product identifier found
/// in the query result
pub fn special_price_cache_tags(rows: &[SpecialPriceFlagRow]) -> Vec<String> {
    let fixed = [cache_tags::CATEGORY, cache_tags::PRODUCT, cache_tags::PRICE]
        .into_iter()
        .map(String::from);
    let identifiers = rows.iter().map(|r| r.identifier).collect::<BTreeSet<_>>();
    let per_product = identifiers
        .into_iter()
        .map(|id| format!("{}_{}", cache_tags::PRODUCT, id));
    fixed.chain(per_product).collect()
}
