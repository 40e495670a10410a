use sea_query::{Order, Query};

use super::Dialect;
use crate::models::NewRecording;
use crate::schema::Recordings;

/// INSERT INTO recordings (date, filename, length, transcription) VALUES (?, ?, ?, ?)
pub fn insert(dialect: Dialect, recording: &NewRecording) -> String {
    dialect.render(
        Query::insert()
            .into_table(Recordings::Table)
            .columns([
                Recordings::Date,
                Recordings::Filename,
                Recordings::Length,
                Recordings::Transcription,
            ])
            .values_panic([
                recording.date.as_str().into(),
                recording.filename.as_str().into(),
                recording.length.into(),
                recording.transcription.as_str().into(),
            ]),
    )
}

/// SELECT id, date, filename, length, transcription FROM recordings ORDER BY id DESC
pub fn select_all_newest_first(dialect: Dialect) -> String {
    dialect.render(
        Query::select()
            .columns([
                Recordings::Id,
                Recordings::Date,
                Recordings::Filename,
                Recordings::Length,
                Recordings::Transcription,
            ])
            .from(Recordings::Table)
            .order_by(Recordings::Id, Order::Desc),
    )
}
