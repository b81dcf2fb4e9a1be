pub(super) mod price_index;

use std::io::ErrorKind;

use sqlx::error::Error;

use crate::error::{AppError, AppErrorCode};

// failures on the connection or the pool, the query itself was never
// evaluated by the server
fn transport_failure(value: &Error) -> Option<AppErrorCode> {
    let code = match value {
        Error::Io(e) => AppErrorCode::IOerror(e.kind()),
        Error::Tls(_) => AppErrorCode::IOerror(ErrorKind::NotConnected),
        Error::Protocol(_) => AppErrorCode::IOerror(ErrorKind::InvalidData),
        Error::PoolTimedOut => AppErrorCode::DatabaseServerBusy,
        Error::PoolClosed | Error::WorkerCrashed => AppErrorCode::Unknown,
        _others => return None,
    };
    Some(code)
}

// rows came back but do not match the shape the repository expects
fn resultset_mismatch(value: &Error) -> Option<AppErrorCode> {
    let code = match value {
        Error::Decode(_) | Error::ColumnDecode { .. } => AppErrorCode::DataCorruption,
        Error::ColumnNotFound(_) | Error::RowNotFound => AppErrorCode::IOerror(ErrorKind::NotFound),
        Error::ColumnIndexOutOfBounds { .. } | Error::TypeNotFound { .. } => {
            AppErrorCode::InvalidInput
        }
        _others => return None,
    };
    Some(code)
}

impl From<Error> for AppError {
    fn from(value: Error) -> Self {
        let code = transport_failure(&value)
            .or_else(|| resultset_mismatch(&value))
            .unwrap_or(match &value {
                Error::Configuration(_) => AppErrorCode::InvalidInput,
                Error::Database(_) => AppErrorCode::RemoteDbServerFailure,
                _others => AppErrorCode::Unknown,
            });
        let detail = match value {
            Error::PoolTimedOut => "mariadb, no-conn-avail".to_string(),
            Error::ColumnDecode { index, source } => format!("mariadb, col:{index}, {source}"),
            e => format!("mariadb, {e}"),
        };
        Self {
            code,
            detail: Some(detail),
        }
    }
}
