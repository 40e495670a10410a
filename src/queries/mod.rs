//! SQL generation for both backends.
//!
//! DDL is written per backend in [`ddl`] because the column shapes differ.
//! DML is shared and rendered for the active backend through [`Dialect`].

use sea_query::{PostgresQueryBuilder, QueryStatementWriter, SqliteQueryBuilder};

pub mod ddl;
pub mod logs;
pub mod movement;
pub mod purchases;
pub mod recordings;

/// SQL dialect of the active storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

impl Dialect {
    /// Render a query statement with values inlined for this dialect
    pub fn render<S: QueryStatementWriter>(self, stmt: &S) -> String {
        match self {
            Dialect::Sqlite => stmt.to_string(SqliteQueryBuilder),
            Dialect::Postgres => stmt.to_string(PostgresQueryBuilder),
        }
    }
}
