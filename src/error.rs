use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::io::ErrorKind;

#[derive(Debug, Clone, PartialEq)]
pub enum AppErrorCode {
    // configuration, environment
    MissingSysBasePath,
    MissingAppBasePath,
    MissingConfigPath,
    InvalidJsonFormat,
    NoLogHandlerCfg,
    NoLoggerCfg,
    MissingAliasLogHdlerCfg,
    MissingAliasLoggerCfg,
    NoHandlerInLoggerCfg,
    InvalidHandlerLoggerCfg,
    NoDatabaseCfg,
    InvalidCacheCfg,
    NoConfidentialityCfg,
    FeatureDisabled,
    // data store, cache, database server
    MissingDataStore,
    DataTableNotExist,
    AcquireLockFailure,
    ExceedingMaxLimit,
    DataCorruption,
    RemoteDbServerFailure,
    DatabaseServerBusy,
    IOerror(ErrorKind),
    // callers
    EmptyInputData,
    InvalidInput,
    NotImplemented,
    Unknown,
}

#[derive(Debug, Clone)]
pub struct AppError {
    pub code: AppErrorCode,
    pub detail: Option<String>,
}

/// Error raised while loading or validating configuration, before any log
/// context exists
pub struct AppCfgError {
    pub code: AppErrorCode,
    pub detail: Option<String>,
}

fn fmt_code_detail(
    f: &mut Formatter<'_>,
    prefix: &str,
    code: &AppErrorCode,
    detail: Option<&String>,
) -> FmtResult {
    let detail = detail.map(String::as_str).unwrap_or("none");
    write!(f, "{prefix}code:{:?}, detail:{}", code, detail)
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        fmt_code_detail(f, "", &self.code, self.detail.as_ref())
    }
}

impl Debug for AppCfgError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        fmt_code_detail(f, "cfg-error, ", &self.code, self.detail.as_ref())
    }
}

impl From<AppCfgError> for AppError {
    fn from(value: AppCfgError) -> Self {
        let AppCfgError { code, detail } = value;
        Self { code, detail }
    }
}

impl From<(AppErrorCode, String)> for AppError {
    fn from(value: (AppErrorCode, String)) -> Self {
        let (code, detail) = value;
        Self {
            code,
            detail: Some(detail),
        }
    }
}
