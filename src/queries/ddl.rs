use sea_query::{ColumnDef, PostgresQueryBuilder, SqliteQueryBuilder, Table};

use crate::schema::{Logs, Movement, Purchases, Recordings};

/// CREATE TABLE IF NOT EXISTS recordings (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     date TEXT NOT NULL,
///     filename TEXT NOT NULL,
///     length REAL NOT NULL,
///     transcription TEXT NOT NULL DEFAULT ''
/// )
pub fn create_recordings_table() -> String {
    Table::create()
        .table(Recordings::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Recordings::Id)
                .integer()
                .primary_key()
                .auto_increment(),
        )
        .col(ColumnDef::new(Recordings::Date).text().not_null())
        .col(ColumnDef::new(Recordings::Filename).text().not_null())
        .col(ColumnDef::new(Recordings::Length).double().not_null())
        .col(
            ColumnDef::new(Recordings::Transcription)
                .text()
                .not_null()
                .default(""),
        )
        .to_string(SqliteQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS movement (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     timestamp INTEGER NOT NULL,
///     lat REAL, lon REAL, gx REAL, gy REAL, gz REAL
/// )
pub fn create_movement_table() -> String {
    Table::create()
        .table(Movement::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Movement::Id)
                .integer()
                .primary_key()
                .auto_increment(),
        )
        .col(ColumnDef::new(Movement::Timestamp).big_integer().not_null())
        .col(ColumnDef::new(Movement::Lat).double().not_null())
        .col(ColumnDef::new(Movement::Lon).double().not_null())
        .col(ColumnDef::new(Movement::Gx).double().not_null())
        .col(ColumnDef::new(Movement::Gy).double().not_null())
        .col(ColumnDef::new(Movement::Gz).double().not_null())
        .to_string(SqliteQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS purchases (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     timestamp TEXT NOT NULL,
///     apples INTEGER, bananas INTEGER,
///     name TEXT, address TEXT, email TEXT,
///     total_eur REAL, total_btc REAL,
///     tx_hash TEXT NOT NULL
/// )
pub fn create_purchases_table() -> String {
    Table::create()
        .table(Purchases::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Purchases::Id)
                .integer()
                .primary_key()
                .auto_increment(),
        )
        .col(ColumnDef::new(Purchases::Timestamp).text().not_null())
        .col(ColumnDef::new(Purchases::Apples).big_integer().not_null())
        .col(ColumnDef::new(Purchases::Bananas).big_integer().not_null())
        .col(ColumnDef::new(Purchases::Name).text().not_null())
        .col(ColumnDef::new(Purchases::Address).text().not_null())
        .col(ColumnDef::new(Purchases::Email).text().not_null())
        .col(ColumnDef::new(Purchases::TotalEur).double().not_null())
        .col(ColumnDef::new(Purchases::TotalBtc).double().not_null())
        .col(ColumnDef::new(Purchases::TxHash).text().not_null())
        .to_string(SqliteQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS logs (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     timestamp TEXT NOT NULL,
///     level TEXT NOT NULL,
///     message TEXT NOT NULL
/// )
pub fn create_logs_table() -> String {
    Table::create()
        .table(Logs::Table)
        .if_not_exists()
        .col(ColumnDef::new(Logs::Id).integer().primary_key().auto_increment())
        .col(ColumnDef::new(Logs::Timestamp).text().not_null())
        .col(ColumnDef::new(Logs::Level).text().not_null())
        .col(ColumnDef::new(Logs::Message).text().not_null())
        .to_string(SqliteQueryBuilder)
}

// ============================================================================
// PostgreSQL variants
// The remote store keeps its own column shapes (bounded VARCHARs for short
// fields, BIGSERIAL ids) rather than mirroring the SQLite ones.
// ============================================================================

/// CREATE TABLE IF NOT EXISTS recordings - PostgreSQL
pub fn create_recordings_table_pg() -> String {
    Table::create()
        .table(Recordings::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Recordings::Id)
                .big_integer()
                .primary_key()
                .auto_increment(),
        )
        .col(ColumnDef::new(Recordings::Date).string_len(50).not_null())
        .col(ColumnDef::new(Recordings::Filename).string_len(255).not_null())
        .col(ColumnDef::new(Recordings::Length).double().not_null())
        .col(
            ColumnDef::new(Recordings::Transcription)
                .text()
                .not_null()
                .default(""),
        )
        .to_string(PostgresQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS movement - PostgreSQL
pub fn create_movement_table_pg() -> String {
    Table::create()
        .table(Movement::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Movement::Id)
                .big_integer()
                .primary_key()
                .auto_increment(),
        )
        .col(ColumnDef::new(Movement::Timestamp).big_integer().not_null())
        .col(ColumnDef::new(Movement::Lat).double().not_null())
        .col(ColumnDef::new(Movement::Lon).double().not_null())
        .col(ColumnDef::new(Movement::Gx).double().not_null())
        .col(ColumnDef::new(Movement::Gy).double().not_null())
        .col(ColumnDef::new(Movement::Gz).double().not_null())
        .to_string(PostgresQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS purchases - PostgreSQL
pub fn create_purchases_table_pg() -> String {
    Table::create()
        .table(Purchases::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Purchases::Id)
                .big_integer()
                .primary_key()
                .auto_increment(),
        )
        .col(ColumnDef::new(Purchases::Timestamp).string_len(50).not_null())
        .col(ColumnDef::new(Purchases::Apples).big_integer().not_null())
        .col(ColumnDef::new(Purchases::Bananas).big_integer().not_null())
        .col(ColumnDef::new(Purchases::Name).string_len(255).not_null())
        .col(ColumnDef::new(Purchases::Address).string_len(255).not_null())
        .col(ColumnDef::new(Purchases::Email).string_len(255).not_null())
        .col(ColumnDef::new(Purchases::TotalEur).double().not_null())
        .col(ColumnDef::new(Purchases::TotalBtc).double().not_null())
        .col(ColumnDef::new(Purchases::TxHash).string_len(64).not_null())
        .to_string(PostgresQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS logs - PostgreSQL
pub fn create_logs_table_pg() -> String {
    Table::create()
        .table(Logs::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Logs::Id)
                .big_integer()
                .primary_key()
                .auto_increment(),
        )
        .col(ColumnDef::new(Logs::Timestamp).string_len(50).not_null())
        .col(ColumnDef::new(Logs::Level).string_len(20).not_null())
        .col(ColumnDef::new(Logs::Message).text().not_null())
        .to_string(PostgresQueryBuilder)
}
