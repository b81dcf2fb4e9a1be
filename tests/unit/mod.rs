pub(crate) mod repository;

use std::boxed::Box;
use std::fs::create_dir_all;
use std::result::Result as DefaultResult;

use catalog_price::confidentiality::AbstractConfidentiality;
use catalog_price::constant::hard_limit;
use catalog_price::error::AppError;
use catalog_price::logging::AppLogContext;
use catalog_price::{AppBasepathCfg, AppCfgHardLimit, AppConfig, AppSharedState};

pub(crate) const EXAMPLE_REL_PATH: &str = "tests/unit/examples/";

// both of the base paths point to the root folder of this crate,
// log files of unit tests are written under `tmp/log/`
pub(crate) fn ut_basepath() -> AppBasepathCfg {
    let root = env!("CARGO_MANIFEST_DIR").to_string() + "/";
    let _ = create_dir_all(root.clone() + "tmp/log");
    AppBasepathCfg {
        system: root.clone(),
        service: root,
    }
}

pub(crate) fn ut_example_fullpath(fname: &str) -> String {
    ut_basepath().service + EXAMPLE_REL_PATH + fname
}

pub(crate) fn ut_hard_limit() -> AppCfgHardLimit {
    AppCfgHardLimit {
        nitems_per_inmem_table: hard_limit::MAX_ITEMS_STORED_PER_MODEL,
        nitems_cached: hard_limit::MAX_ITEMS_CACHED,
        num_db_conns: hard_limit::MAX_DB_CONNECTIONS,
        seconds_db_idle: hard_limit::MAX_SECONDS_DB_IDLE,
    }
}

pub(crate) fn ut_load_config(cfg_fname: &str) -> AppConfig {
    let fullpath = ut_example_fullpath(cfg_fname);
    let service = AppConfig::parse_from_file(fullpath, ut_hard_limit()).unwrap();
    AppConfig {
        service,
        basepath: ut_basepath(),
    }
}

pub(crate) fn ut_default_logctx() -> AppLogContext {
    let cfg = ut_load_config("config_ok.json");
    AppLogContext::new(&cfg.basepath, &cfg.service.logging)
}

pub(crate) fn ut_setup_share_state(
    cfg_fname: &str,
    cfdntl: Box<dyn AbstractConfidentiality>,
) -> AppSharedState {
    let cfg = ut_load_config(cfg_fname);
    let logctx = AppLogContext::new(&cfg.basepath, &cfg.service.logging);
    AppSharedState::new(cfg, logctx, cfdntl)
}

pub(crate) struct MockConfidential {}

impl AbstractConfidentiality for MockConfidential {
    fn try_get_payload(&self, _id: &str) -> DefaultResult<String, AppError> {
        Ok("unit-test".to_string())
    }
}
