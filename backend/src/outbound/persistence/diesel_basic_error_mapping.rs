//! Shared Diesel error mapping for the chat repositories.

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

/// Map Diesel errors into query/connection constructors.
///
/// Driver details are logged at `debug` and replaced with generic messages
/// so they never reach API clients.
pub fn map_basic_diesel_error<E, Q, C>(error: diesel::result::Error, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) | DieselError::SerializationError(_) => {
            query("database query error")
        }
        DieselError::DeserializationError(_) => query("database returned an unexpected row"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::BrokenTransactionManager => connection("database connection error"),
        _ => query("database error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Query(String),
        Connection(String),
    }

    fn map(error: DieselError) -> Mapped {
        map_basic_diesel_error(
            error,
            |message| Mapped::Query(message.to_owned()),
            |message| Mapped::Connection(message.to_owned()),
        )
    }

    #[rstest]
    fn closed_connections_are_connection_errors() {
        let mapped = map(DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_owned()),
        ));
        assert_eq!(mapped, Mapped::Connection("database connection error".to_owned()));
    }

    #[rstest]
    fn driver_messages_are_not_forwarded() {
        let mapped = map(DieselError::DatabaseError(
            DatabaseErrorKind::CheckViolation,
            Box::new("violates check constraint rooms_private_has_password".to_owned()),
        ));
        assert_eq!(mapped, Mapped::Query("database error".to_owned()));
    }

    #[rstest]
    fn pool_messages_are_kept() {
        let mapped: Mapped = map_basic_pool_error(PoolError::checkout("timed out"), |message| {
            Mapped::Connection(message)
        });
        assert_eq!(mapped, Mapped::Connection("timed out".to_owned()));
    }
}
