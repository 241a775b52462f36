use crate::err_from;
use crate::error::EngineError;
use crate::error::*;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

static MIGRATOR: Migrator = sqlx::migrate!();

/// Where the engine's store lives: a database file on disk, or a named
/// in-memory instance (tests and dry runs).
pub enum SqliteStore<'a> {
    File(&'a str),
    Memory(&'a str),
}

/// Open the shared store pool. The pool is capped at a single connection:
/// every worker transaction serializes on it, and a mode=memory database
/// exists only as long as that one connection does.
pub async fn connect_sqlite_store(
    store: SqliteStore<'_>,
    run_migrations: bool,
) -> Result<SqlitePool, EngineError> {
    let options = match store {
        SqliteStore::File(path) => SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true),
        SqliteStore::Memory(name) => {
            SqliteConnectOptions::from_str(&format!("file:{name}?mode=memory"))
                .map_err(err_from!())?
        }
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options.journal_mode(SqliteJournalMode::Off))
        .await
        .map_err(err_from!())?;

    if run_migrations {
        MIGRATOR.run(&pool).await.map_err(err_from!())?;
    }

    Ok(pool)
}
