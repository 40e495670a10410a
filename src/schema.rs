use sea_query::Iden;

/// Recordings table - one row per recorded audio message
#[derive(Iden)]
pub enum Recordings {
    Table,
    Id,
    Date,
    Filename,
    Length,
    Transcription,
}

/// Movement table - device position and orientation samples
#[derive(Iden)]
pub enum Movement {
    Table,
    Id,
    Timestamp,
    Lat,
    Lon,
    Gx,
    Gy,
    Gz,
}

/// Purchases table - completed checkouts
#[derive(Iden)]
pub enum Purchases {
    Table,
    Id,
    Timestamp,
    Apples,
    Bananas,
    Name,
    Address,
    Email,
    TotalEur,
    TotalBtc,
    TxHash,
}

/// Logs table - mirrored application log records
#[derive(Iden)]
pub enum Logs {
    Table,
    Id,
    Timestamp,
    Level,
    Message,
}
