use sea_query::{Order, Query};

use super::Dialect;
use crate::models::NewPurchase;
use crate::schema::Purchases;

/// INSERT INTO purchases (timestamp, apples, bananas, name, address, email, total_eur, total_btc, tx_hash)
/// VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
pub fn insert(dialect: Dialect, purchase: &NewPurchase) -> String {
    dialect.render(
        Query::insert()
            .into_table(Purchases::Table)
            .columns([
                Purchases::Timestamp,
                Purchases::Apples,
                Purchases::Bananas,
                Purchases::Name,
                Purchases::Address,
                Purchases::Email,
                Purchases::TotalEur,
                Purchases::TotalBtc,
                Purchases::TxHash,
            ])
            .values_panic([
                purchase.timestamp.as_str().into(),
                purchase.apples.into(),
                purchase.bananas.into(),
                purchase.name.as_str().into(),
                purchase.address.as_str().into(),
                purchase.email.as_str().into(),
                purchase.total_eur.into(),
                purchase.total_btc.into(),
                purchase.tx_hash.as_str().into(),
            ]),
    )
}

/// SELECT * FROM purchases ORDER BY id DESC
pub fn select_all_newest_first(dialect: Dialect) -> String {
    dialect.render(
        Query::select()
            .columns([
                Purchases::Id,
                Purchases::Timestamp,
                Purchases::Apples,
                Purchases::Bananas,
                Purchases::Name,
                Purchases::Address,
                Purchases::Email,
                Purchases::TotalEur,
                Purchases::TotalBtc,
                Purchases::TxHash,
            ])
            .from(Purchases::Table)
            .order_by(Purchases::Id, Order::Desc),
    )
}
