use std::collections::hash_map::RandomState;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use serde::de::{Error as DeserializeError, Expected};
use serde::Deserialize;

use crate::constant::{cache as const_cache, env_vars, logging as const_log};
use crate::error::{AppCfgError, AppErrorCode};

pub(crate) type AppLogAlias = Arc<String>;

#[derive(Deserialize)]
pub struct AppLogHandlerCfg {
    pub min_level: const_log::Level,
    pub destination: const_log::Destination,
    pub alias: AppLogAlias,
    pub path: Option<String>,
}

#[derive(Deserialize)]
pub struct AppLoggerCfg {
    pub alias: AppLogAlias,
    pub handlers: Vec<String>,
    pub level: Option<const_log::Level>,
}

#[derive(Deserialize)]
pub struct AppLoggingCfg {
    pub handlers: Vec<AppLogHandlerCfg>,
    pub loggers: Vec<AppLoggerCfg>,
}

#[derive(Deserialize)]
#[serde(tag = "source")]
pub enum AppConfidentialCfg {
    UserSpace {
        #[serde(deserialize_with = "jsn_deny_empty_string")]
        sys_path: String,
    },
}

#[derive(Deserialize, Debug, Clone)]
pub enum AppDbServerType {
    MariaDB,
    PostgreSQL,
}

#[derive(Deserialize, Debug)]
pub struct AppInMemoryDbCfg {
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub alias: String,
    pub max_items: u32,
}

#[derive(Deserialize, Debug)]
pub struct AppDbServerCfg {
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub alias: String,
    pub srv_type: AppDbServerType,
    pub max_conns: u32,
    pub acquire_timeout_secs: u16, // for acquiring connection from pool
    pub idle_timeout_secs: u16,
    pub confidentiality_path: String,
    pub db_name: String,
}

#[derive(Deserialize)]
#[serde(tag = "_type")]
pub enum AppDataStoreCfg {
    InMemory(AppInMemoryDbCfg),
    DbServer(AppDbServerCfg),
}

fn default_cache_ttl() -> u32 {
    const_cache::DEFAULT_TTL_SECS
}

#[derive(Deserialize, Debug)]
pub struct AppResultCacheCfg {
    pub enabled: bool,
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u32,
    pub max_items: u32,
}

#[derive(Deserialize)]
pub struct AppCacheCfg {
    pub special_price: AppResultCacheCfg,
}

#[derive(Deserialize)]
pub struct ServiceCfg {
    pub logging: AppLoggingCfg,
    pub data_store: Vec<AppDataStoreCfg>,
    pub cache: AppCacheCfg,
    pub confidentiality: AppConfidentialCfg,
}

pub struct AppBasepathCfg {
    pub system: String,
    pub service: String,
}

pub struct AppConfig {
    pub basepath: AppBasepathCfg,
    pub service: ServiceCfg,
}

pub struct AppCfgHardLimit {
    pub nitems_per_inmem_table: u32,
    pub nitems_cached: u32,
    pub num_db_conns: u32,
    pub seconds_db_idle: u16,
}

pub struct AppCfgInitArgs {
    pub env_var_map: HashMap<String, String, RandomState>,
    pub limit: AppCfgHardLimit,
}

fn cfg_err(code: AppErrorCode, detail: Option<String>) -> AppCfgError {
    AppCfgError { code, detail }
}

impl AppConfig {
    pub fn new(args: AppCfgInitArgs) -> DefaultResult<Self, AppCfgError> {
        let AppCfgInitArgs {
            mut env_var_map,
            limit,
        } = args;
        let mut take_var = |label: &str, code: AppErrorCode| {
            env_var_map
                .remove(label)
                .ok_or_else(|| cfg_err(code, Some(label.to_string())))
        };
        let system = take_var(env_vars::SYS_BASEPATH, AppErrorCode::MissingSysBasePath)? + "/";
        let service = take_var(env_vars::SERVICE_BASEPATH, AppErrorCode::MissingAppBasePath)? + "/";
        let cfg_path = take_var(env_vars::CFG_FILEPATH, AppErrorCode::MissingConfigPath)?;
        let svc_cfg = Self::parse_from_file(service.clone() + &cfg_path, limit)?;
        Ok(Self {
            service: svc_cfg,
            basepath: AppBasepathCfg { system, service },
        })
    }

    pub fn parse_from_file(
        filepath: String,
        limit: AppCfgHardLimit,
    ) -> DefaultResult<ServiceCfg, AppCfgError> {
        let file = File::open(filepath)
            .map_err(|e| cfg_err(AppErrorCode::IOerror(e.kind()), Some(e.to_string())))?;
        let obj = serde_json::from_reader::<_, ServiceCfg>(BufReader::new(file))
            .map_err(|e| cfg_err(AppErrorCode::InvalidJsonFormat, Some(e.to_string())))?;
        Self::_check_logging(&obj.logging)?;
        Self::_check_datastore(&obj.data_store, &limit)?;
        Self::_check_cache(&obj.cache, &limit)?;
        Ok(obj)
    }

    fn _check_logging(obj: &AppLoggingCfg) -> DefaultResult<(), AppCfgError> {
        let err = |code: AppErrorCode, detail: Option<String>| Err(cfg_err(code, detail));
        if obj.handlers.is_empty() {
            return err(AppErrorCode::NoLogHandlerCfg, None);
        }
        if obj.loggers.is_empty() {
            return err(AppErrorCode::NoLoggerCfg, None);
        }
        let mut hdlr_aliases = HashSet::new();
        for h in obj.handlers.iter() {
            if h.alias.is_empty() {
                return err(AppErrorCode::MissingAliasLogHdlerCfg, None);
            }
            // file-type handler has to specify its path
            if matches!(h.destination, const_log::Destination::LOCALFS) && h.path.is_none() {
                let msg = format!("handler:{}, missing-path", h.alias);
                return err(AppErrorCode::InvalidHandlerLoggerCfg, Some(msg));
            }
            hdlr_aliases.insert(h.alias.as_str());
        }
        for lg in obj.loggers.iter() {
            if lg.alias.is_empty() {
                return err(AppErrorCode::MissingAliasLoggerCfg, None);
            }
            if lg.handlers.is_empty() {
                let msg = format!("logger:{}", lg.alias);
                return err(AppErrorCode::NoHandlerInLoggerCfg, Some(msg));
            }
            if let Some(a) = lg.handlers.iter().find(|a| !hdlr_aliases.contains(a.as_str())) {
                let msg = format!("logger:{}, unknown-handler:{}", lg.alias, a);
                return err(AppErrorCode::InvalidHandlerLoggerCfg, Some(msg));
            }
        }
        Ok(())
    } // end of _check_logging

    fn _check_datastore(
        obj: &[AppDataStoreCfg],
        limit: &AppCfgHardLimit,
    ) -> DefaultResult<(), AppCfgError> {
        if obj.is_empty() {
            return Err(cfg_err(AppErrorCode::NoDatabaseCfg, None));
        }
        let exceeded = obj.iter().find_map(|item| match item {
            AppDataStoreCfg::InMemory(c) if c.max_items > limit.nitems_per_inmem_table => Some(
                format!("{}, max-items-limit:{}", c.alias, limit.nitems_per_inmem_table),
            ),
            AppDataStoreCfg::DbServer(c) if c.max_conns > limit.num_db_conns => Some(format!(
                "{}, max-conns-limit:{}",
                c.alias, limit.num_db_conns
            )),
            AppDataStoreCfg::DbServer(c) if c.idle_timeout_secs > limit.seconds_db_idle => Some(
                format!("{}, idle-secs-limit:{}", c.alias, limit.seconds_db_idle),
            ),
            _others => None,
        });
        match exceeded {
            Some(msg) => Err(cfg_err(AppErrorCode::ExceedingMaxLimit, Some(msg))),
            None => Ok(()),
        }
    }

    // ttl and capacity are irrelevant once the cache is disabled
    fn _check_cache(obj: &AppCacheCfg, limit: &AppCfgHardLimit) -> DefaultResult<(), AppCfgError> {
        let c = &obj.special_price;
        if !c.enabled {
            Ok(())
        } else if c.ttl_secs == 0 || c.max_items == 0 {
            let msg = format!("special-price, ttl:{}, max-items:{}", c.ttl_secs, c.max_items);
            Err(cfg_err(AppErrorCode::InvalidCacheCfg, Some(msg)))
        } else if c.max_items > limit.nitems_cached {
            let msg = format!("special-price, max-items-limit:{}", limit.nitems_cached);
            Err(cfg_err(AppErrorCode::ExceedingMaxLimit, Some(msg)))
        } else {
            Ok(())
        }
    }
} // end of impl AppConfig

struct ExpectNonEmptyString {
    min_len: u32,
}

impl Expected for ExpectNonEmptyString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        let msg = format!("minimum string length >= {}", self.min_len);
        formatter.write_str(msg.as_str())
    }
}

fn jsn_deny_empty_string<'de, D>(raw: D) -> DefaultResult<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(raw)?;
    if s.is_empty() {
        let exp = ExpectNonEmptyString { min_len: 1 };
        Err(DeserializeError::invalid_length(s.len(), &exp))
    } else {
        Ok(s)
    }
}
