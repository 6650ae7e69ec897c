use crate::errors::StoreError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Long-lived SQLite pool shared by the bot and the notifier.
#[derive(Clone)]
pub struct DatabaseManager {
    /// Connection pool; every query borrows a connection for its own duration
    pub pool: SqlitePool,
}

impl DatabaseManager {
    /// Opens (creating if needed) the database at `database_url`.
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
            info!("Creating database {}", database_url);
            Sqlite::create_database(database_url).await?;
        }

        // WAL plus a busy timeout lets the bot and a separate notifier process
        // write to the same file.
        let options = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Applies the embedded migrations.
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}
