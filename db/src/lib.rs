pub mod admission;
pub mod models;
pub mod test_utils;

use sea_orm::{Database, DatabaseConnection, DbErr, SqlErr};
use std::path::Path;

/// Opens a connection to the service database.
///
/// `path_or_url` is either a full DSN (`sqlite:`, `postgres://`, ...) or a
/// plain SQLite file path, in which case intermediate directories are
/// created and the path is wrapped into a `sqlite://...?mode=rwc` URL.
pub async fn connect(path_or_url: &str) -> Result<DatabaseConnection, DbErr> {
    let url = if path_or_url.starts_with("sqlite:")
        || path_or_url.starts_with("postgres://")
        || path_or_url.starts_with("mysql://")
    {
        path_or_url.to_owned()
    } else {
        // SQLite won't create intermediate dirs.
        if let Some(parent) = Path::new(path_or_url).parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        format!("sqlite://{path_or_url}?mode=rwc")
    };

    Database::connect(&url).await
}

/// Whether a storage error is a unique-constraint violation.
///
/// The attendance ledger and fence-code allocation both lean on unique keys
/// enforced during the insert itself, so this is how "already exists" is
/// told apart from a genuine storage failure.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
