//! Classification of sqlx failures.

use crate::domain::foundation::DomainError;

/// Maps a sqlx error to a domain error, separating "the store is unreachable"
/// from "the query failed".
pub(crate) fn map_sqlx_error(context: &str, err: sqlx::Error) -> DomainError {
    if is_unavailable(&err) {
        DomainError::unavailable(format!("{}: {}", context, err))
    } else {
        DomainError::database(format!("{}: {}", context, err))
    }
}

fn is_unavailable(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => true,
        sqlx::Error::Database(db_err) => db_err
            .code()
            .map(|code| is_unavailable_sqlstate(&code))
            .unwrap_or(false),
        _ => false,
    }
}

/// SQLSTATEs for connection failures, server shutdown and connection limits.
fn is_unavailable_sqlstate(code: &str) -> bool {
    code.starts_with("08") || matches!(code, "57P01" | "57P02" | "57P03" | "53300")
}
