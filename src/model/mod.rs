mod special_price;

pub use special_price::{
    special_price_cache_tags, PriceIndexRow, ProductIdSet, ProductLinkModel, ProductRef,
    SpecialPriceFlagRow, SpecialPriceMap,
};
