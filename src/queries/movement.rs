use sea_query::{Order, Query};

use super::Dialect;
use crate::models::MovementInput;
use crate::schema::Movement;

/// INSERT INTO movement (timestamp, lat, lon, gx, gy, gz) VALUES (?, ?, ?, ?, ?, ?)
pub fn insert(dialect: Dialect, sample: &MovementInput) -> String {
    dialect.render(
        Query::insert()
            .into_table(Movement::Table)
            .columns([
                Movement::Timestamp,
                Movement::Lat,
                Movement::Lon,
                Movement::Gx,
                Movement::Gy,
                Movement::Gz,
            ])
            .values_panic([
                sample.timestamp.into(),
                sample.lat.into(),
                sample.lon.into(),
                sample.gx.into(),
                sample.gy.into(),
                sample.gz.into(),
            ]),
    )
}

/// SELECT id, timestamp, lat, lon, gx, gy, gz FROM movement ORDER BY id DESC
pub fn select_all_newest_first(dialect: Dialect) -> String {
    dialect.render(
        Query::select()
            .columns([
                Movement::Id,
                Movement::Timestamp,
                Movement::Lat,
                Movement::Lon,
                Movement::Gx,
                Movement::Gy,
                Movement::Gz,
            ])
            .from(Movement::Table)
            .order_by(Movement::Id, Order::Desc),
    )
}
