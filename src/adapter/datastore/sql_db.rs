use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use crate::confidentiality::AbstractConfidentiality;
use crate::config::AppDbServerCfg;
use crate::error::{AppError, AppErrorCode};

#[cfg(feature = "mariadb")]
pub use mysql_pool::AppMariaDbStore;

#[cfg(feature = "mariadb")]
mod mysql_pool {
    use std::time::Duration;

    use serde::Deserialize;
    use sqlx::mysql::MySqlConnectOptions;
    use sqlx::pool::{PoolConnection, PoolOptions};
    use sqlx::{MySql, Pool};

    use super::*;
    use crate::config::AppDbServerType;

    /// credential payload kept in the confidentiality source
    #[derive(Deserialize)]
    struct DbCredential {
        #[serde(rename = "HOST")]
        host: String,
        #[serde(rename = "PORT")]
        port: u16,
        #[serde(rename = "USER")]
        user: String,
        #[serde(rename = "PASSWORD")]
        password: String,
    }

    /// Connection pool to a MariaDB / MySQL server holding the price index.
    /// Connections are established lazily on first acquisition.
    pub struct AppMariaDbStore {
        pub alias: String,
        pool: Pool<MySql>,
    }

    impl AppMariaDbStore {
        pub fn try_build(
            cfg: &AppDbServerCfg,
            confidential: Arc<Box<dyn AbstractConfidentiality>>,
        ) -> DefaultResult<Self, AppError> {
            if !matches!(cfg.srv_type, AppDbServerType::MariaDB) {
                let msg = format!("alias:{}, unsupported:{:?}", cfg.alias, cfg.srv_type);
                return Err(AppError::from((AppErrorCode::InvalidInput, msg)));
            }
            let serial = confidential.try_get_payload(cfg.confidentiality_path.as_str())?;
            let cred = serde_json::from_str::<DbCredential>(serial.as_str()).map_err(|e| {
                let msg = format!("alias:{}, db-credential, {}", cfg.alias, e);
                AppError::from((AppErrorCode::InvalidJsonFormat, msg))
            })?;
            let conn_opts = MySqlConnectOptions::new()
                .host(cred.host.as_str())
                .port(cred.port)
                .username(cred.user.as_str())
                .password(cred.password.as_str())
                .database(cfg.db_name.as_str());
            let pool = PoolOptions::<MySql>::new()
                .min_connections(0)
                .max_connections(cfg.max_conns)
                .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs as u64))
                .idle_timeout(Some(Duration::from_secs(cfg.idle_timeout_secs as u64)))
                .connect_lazy_with(conn_opts);
            Ok(Self {
                pool,
                alias: cfg.alias.clone(),
            })
        }

        pub async fn acquire(&self) -> DefaultResult<PoolConnection<MySql>, AppError> {
            self.pool.acquire().await.map_err(|e| {
                let mut out = AppError::from(e);
                let detail = out.detail.take().unwrap_or_default();
                out.detail = Some(format!("{detail}, pool-size:{}", self.pool.size()));
                out
            })
        }
    } // end of impl AppMariaDbStore
} // end of mod mysql_pool

#[cfg(not(feature = "mariadb"))]
pub struct AppMariaDbStore {}

#[cfg(not(feature = "mariadb"))]
impl AppMariaDbStore {
    pub fn try_build(
        cfg: &AppDbServerCfg,
        _confidential: Arc<Box<dyn AbstractConfidentiality>>,
    ) -> DefaultResult<Self, AppError> {
        let msg = format!("alias:{}, type:{:?}, need feature mariadb", cfg.alias, cfg.srv_type);
        Err(AppError::from((AppErrorCode::FeatureDisabled, msg)))
    }
}
