pub mod env_vars {
    pub const SYS_BASEPATH: &str = "SYS_BASE_PATH";
    pub const SERVICE_BASEPATH: &str = "SERVICE_BASE_PATH";
    // relative path starting from app / service home folder
    pub const CFG_FILEPATH: &str = "CONFIG_FILE_PATH";
}

pub mod hard_limit {
    pub const MAX_ITEMS_STORED_PER_MODEL: u32 = 65535u32;
    pub const MAX_ITEMS_CACHED: u32 = 16384u32;
    pub const MAX_DB_CONNECTIONS: u32 = 1800u32;
    pub const MAX_SECONDS_DB_IDLE: u16 = 360u16;
}

pub mod price_index {
    /// customer segment of anonymous shoppers, the only segment the special-price
    /// lookup reads from the price index
    pub const DEFAULT_CUSTOMER_SEGMENT: u32 = 0;
}

pub mod cache {
    pub const DEFAULT_TTL_SECS: u32 = 3600;

    pub mod tags {
        pub const CATEGORY: &str = "cat_c";
        pub const PRODUCT: &str = "cat_p";
        pub const PRICE: &str = "price";
    }
}

pub mod logging {
    use serde::Deserialize;

    #[allow(clippy::upper_case_acronyms)]
    #[derive(Deserialize)]
    pub enum Level {
        TRACE,
        DEBUG,
        INFO,
        WARNING,
        ERROR,
        FATAL,
    }

    #[allow(clippy::upper_case_acronyms)]
    #[derive(Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Destination {
        CONSOLE,
        LOCALFS,
    }
}
