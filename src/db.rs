//! Storage backend selection and per-table operations.
//!
//! A [`Storage`] is chosen once at startup: the embedded SQLite store by
//! default, or the remote PostgreSQL store when the site-identity indicator is
//! present. Every operation opens a fresh [`Connection`] for one logical
//! database, creates its table if absent, does its work and closes it.

use sqlx::postgres::{PgConnection, PgRow};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqliteRow};
use sqlx::{ConnectOptions, Connection as _, FromRow};
use std::path::{Path, PathBuf};

use crate::config::PortalConfig;
use crate::constants::{LOGS_DB, RECORDINGS_DB};
use crate::credentials::Credentials;
use crate::db_postgres::{self, RemoteTarget};
use crate::models::{
    LogRecord, MovementInput, MovementSample, NewLogRecord, NewPurchase, NewRecording, Purchase,
    Recording,
};
use crate::queries::{ddl, logs, movement, purchases, recordings, Dialect};

type DynError = Box<dyn std::error::Error + Send + Sync>;

/// The storage backend every handler writes through
#[derive(Debug, Clone)]
pub enum Storage {
    /// One SQLite file per logical database under `data_dir`
    Embedded { data_dir: PathBuf },
    /// A managed PostgreSQL database shared by all logical databases
    Remote { url: String, display: String },
}

impl Storage {
    pub fn embedded(data_dir: impl Into<PathBuf>) -> Self {
        Storage::Embedded {
            data_dir: data_dir.into(),
        }
    }

    pub fn remote(target: &RemoteTarget) -> Result<Self, DynError> {
        Ok(Storage::Remote {
            url: db_postgres::build_postgres_url(target)?,
            display: format!("{}:{}/{}", target.server, target.port, target.database),
        })
    }

    /// Pick the backend from the site-identity indicator
    pub fn select<F>(
        config: &PortalConfig,
        credentials: &Option<Credentials>,
        lookup: F,
    ) -> Result<Self, DynError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if config.remote.is_selected(&lookup) {
            let target = RemoteTarget::resolve(&config.remote, credentials)?;
            Self::remote(&target)
        } else {
            Ok(Self::embedded(config.data_dir.clone()))
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Storage::Embedded { .. } => Dialect::Sqlite,
            Storage::Remote { .. } => Dialect::Postgres,
        }
    }

    /// Human readable location, without credentials
    pub fn describe(&self) -> String {
        match self {
            Storage::Embedded { data_dir } => format!("embedded SQLite in {}", data_dir.display()),
            Storage::Remote { display, .. } => format!("remote PostgreSQL at {}", display),
        }
    }

    /// Open a fresh connection for a logical database
    ///
    /// The embedded backend creates the data directory and the database file
    /// if they do not exist yet.
    pub async fn connection_for(&self, database: &str) -> Result<Connection, sqlx::Error> {
        match self {
            Storage::Embedded { data_dir } => {
                std::fs::create_dir_all(data_dir)?;
                let conn = open_database_connection(data_dir, database).await?;
                Ok(Connection::Embedded(conn))
            }
            Storage::Remote { url, .. } => {
                let conn = db_postgres::open_postgres_connection(url).await?;
                Ok(Connection::Remote(conn))
            }
        }
    }
}

/// Open a file-based database connection, creating the file if missing
/// Enables WAL mode
pub async fn open_database_connection(
    data_dir: &Path,
    name: &str,
) -> Result<SqliteConnection, sqlx::Error> {
    let db_path = data_dir.join(format!("{}.sqlite", name));
    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);
    let conn = options.connect().await?;
    Ok(conn)
}

/// An open connection to either backend
pub enum Connection {
    Embedded(SqliteConnection),
    Remote(PgConnection),
}

impl Connection {
    pub fn dialect(&self) -> Dialect {
        match self {
            Connection::Embedded(_) => Dialect::Sqlite,
            Connection::Remote(_) => Dialect::Postgres,
        }
    }

    /// Execute a statement, returning the number of affected rows
    pub async fn execute(&mut self, sql: &str) -> Result<u64, sqlx::Error> {
        let result = match self {
            Connection::Embedded(c) => sqlx::query(sql).execute(&mut *c).await?.rows_affected(),
            Connection::Remote(c) => sqlx::query(sql).execute(&mut *c).await?.rows_affected(),
        };
        Ok(result)
    }

    /// Fetch every row of a query as `T`
    pub async fn fetch_all<T>(&mut self, sql: &str) -> Result<Vec<T>, sqlx::Error>
    where
        T: Send + Unpin + for<'r> FromRow<'r, SqliteRow> + for<'r> FromRow<'r, PgRow>,
    {
        match self {
            Connection::Embedded(c) => {
                sqlx::query_as::<sqlx::Sqlite, T>(sql)
                    .fetch_all(&mut *c)
                    .await
            }
            Connection::Remote(c) => {
                sqlx::query_as::<sqlx::Postgres, T>(sql)
                    .fetch_all(&mut *c)
                    .await
            }
        }
    }

    pub async fn close(self) -> Result<(), sqlx::Error> {
        match self {
            Connection::Embedded(c) => c.close().await,
            Connection::Remote(c) => c.close().await,
        }
    }
}

// ============================================================================
// Table creation (idempotent, issued before first use by every call-site)
// ============================================================================

pub async fn ensure_recordings_table(conn: &mut Connection) -> Result<(), sqlx::Error> {
    let sql = match conn.dialect() {
        Dialect::Sqlite => ddl::create_recordings_table(),
        Dialect::Postgres => ddl::create_recordings_table_pg(),
    };
    conn.execute(&sql).await?;
    Ok(())
}

pub async fn ensure_movement_table(conn: &mut Connection) -> Result<(), sqlx::Error> {
    let sql = match conn.dialect() {
        Dialect::Sqlite => ddl::create_movement_table(),
        Dialect::Postgres => ddl::create_movement_table_pg(),
    };
    conn.execute(&sql).await?;
    Ok(())
}

pub async fn ensure_purchases_table(conn: &mut Connection) -> Result<(), sqlx::Error> {
    let sql = match conn.dialect() {
        Dialect::Sqlite => ddl::create_purchases_table(),
        Dialect::Postgres => ddl::create_purchases_table_pg(),
    };
    conn.execute(&sql).await?;
    Ok(())
}

pub async fn ensure_logs_table(conn: &mut Connection) -> Result<(), sqlx::Error> {
    let sql = match conn.dialect() {
        Dialect::Sqlite => ddl::create_logs_table(),
        Dialect::Postgres => ddl::create_logs_table_pg(),
    };
    conn.execute(&sql).await?;
    Ok(())
}

// ============================================================================
// One connection per operation
// ============================================================================

pub async fn save_recording(storage: &Storage, recording: &NewRecording) -> Result<(), sqlx::Error> {
    let mut conn = storage.connection_for(RECORDINGS_DB).await?;
    ensure_recordings_table(&mut conn).await?;
    let sql = recordings::insert(conn.dialect(), recording);
    conn.execute(&sql).await?;
    conn.close().await
}

pub async fn list_recordings(storage: &Storage) -> Result<Vec<Recording>, sqlx::Error> {
    let mut conn = storage.connection_for(RECORDINGS_DB).await?;
    ensure_recordings_table(&mut conn).await?;
    let sql = recordings::select_all_newest_first(conn.dialect());
    let rows = conn.fetch_all::<Recording>(&sql).await?;
    conn.close().await?;
    Ok(rows)
}

/// Insert a batch of samples over one connection
///
/// Not wrapped in a transaction: a failure mid-batch leaves the earlier
/// samples in place.
pub async fn save_movement_batch(
    storage: &Storage,
    samples: &[MovementInput],
) -> Result<usize, sqlx::Error> {
    let mut conn = storage.connection_for(RECORDINGS_DB).await?;
    ensure_movement_table(&mut conn).await?;
    for sample in samples {
        let sql = movement::insert(conn.dialect(), sample);
        conn.execute(&sql).await?;
    }
    conn.close().await?;
    Ok(samples.len())
}

pub async fn list_movement(storage: &Storage) -> Result<Vec<MovementSample>, sqlx::Error> {
    let mut conn = storage.connection_for(RECORDINGS_DB).await?;
    ensure_movement_table(&mut conn).await?;
    let sql = movement::select_all_newest_first(conn.dialect());
    let rows = conn.fetch_all::<MovementSample>(&sql).await?;
    conn.close().await?;
    Ok(rows)
}

pub async fn save_purchase(storage: &Storage, purchase: &NewPurchase) -> Result<(), sqlx::Error> {
    let mut conn = storage.connection_for(RECORDINGS_DB).await?;
    ensure_purchases_table(&mut conn).await?;
    let sql = purchases::insert(conn.dialect(), purchase);
    conn.execute(&sql).await?;
    conn.close().await
}

pub async fn list_purchases(storage: &Storage) -> Result<Vec<Purchase>, sqlx::Error> {
    let mut conn = storage.connection_for(RECORDINGS_DB).await?;
    ensure_purchases_table(&mut conn).await?;
    let sql = purchases::select_all_newest_first(conn.dialect());
    let rows = conn.fetch_all::<Purchase>(&sql).await?;
    conn.close().await?;
    Ok(rows)
}

/// Write a batch of log records to the logs database
pub async fn save_log_records(storage: &Storage, records: &[NewLogRecord]) -> Result<(), sqlx::Error> {
    let mut conn = storage.connection_for(LOGS_DB).await?;
    ensure_logs_table(&mut conn).await?;
    for record in records {
        let sql = logs::insert(conn.dialect(), record);
        conn.execute(&sql).await?;
    }
    conn.close().await
}

pub async fn list_logs(storage: &Storage, limit: u64) -> Result<Vec<LogRecord>, sqlx::Error> {
    let mut conn = storage.connection_for(LOGS_DB).await?;
    ensure_logs_table(&mut conn).await?;
    let sql = logs::select_recent(conn.dialect(), limit);
    let rows = conn.fetch_all::<LogRecord>(&sql).await?;
    conn.close().await?;
    Ok(rows)
}
