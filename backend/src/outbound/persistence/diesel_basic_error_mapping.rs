//! Shared Diesel error mapping for repositories with basic query semantics.

use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map a Diesel error into query/connection constructors, prefixing the
/// message with the failed operation.
///
/// Lost or unusable connections map to `connection`; everything else,
/// including constraint violations, maps to `query`.
pub fn map_basic_diesel_error<E, Q, C>(
    error: diesel::result::Error,
    operation: &str,
    query: Q,
    connection: C,
) -> E
where
    Q: FnOnce(String) -> E,
    C: FnOnce(String) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
        }
        _ => debug!(%error, %operation, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand,
            info,
        ) => connection(format!("{operation}: {}", info.message())),
        DieselError::BrokenTransactionManager => {
            connection(format!("{operation}: transaction manager is broken"))
        }
        DieselError::DatabaseError(_, info) => query(format!("{operation}: {}", info.message())),
        other => query(format!("{operation}: {other}")),
    }
}
