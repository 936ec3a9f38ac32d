pub mod connection;
pub mod repositories;
#[cfg(test)]
pub mod test_utils;

pub use connection::DbConnection;

/// Whether a failed statement hit a UNIQUE or PRIMARY KEY constraint
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}
