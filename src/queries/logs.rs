use sea_query::{Order, Query};

use super::Dialect;
use crate::models::NewLogRecord;
use crate::schema::Logs;

/// INSERT INTO logs (timestamp, level, message) VALUES (?, ?, ?)
pub fn insert(dialect: Dialect, record: &NewLogRecord) -> String {
    dialect.render(
        Query::insert()
            .into_table(Logs::Table)
            .columns([Logs::Timestamp, Logs::Level, Logs::Message])
            .values_panic([
                record.timestamp.as_str().into(),
                record.level.as_str().into(),
                record.message.as_str().into(),
            ]),
    )
}

/// SELECT id, timestamp, level, message FROM logs ORDER BY id DESC LIMIT ?
pub fn select_recent(dialect: Dialect, limit: u64) -> String {
    dialect.render(
        Query::select()
            .columns([Logs::Id, Logs::Timestamp, Logs::Level, Logs::Message])
            .from(Logs::Table)
            .order_by(Logs::Id, Order::Desc)
            .limit(limit),
    )
}
