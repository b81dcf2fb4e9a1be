mod special_price;

pub use special_price::SpecialPriceBulkResolver;
