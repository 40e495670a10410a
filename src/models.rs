//! Rows stored by the portal and the payloads that create them.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Recorded audio message metadata
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Recording {
    pub id: i64,
    pub date: String,
    pub filename: String,
    pub length: f64,
    pub transcription: String,
}

#[derive(Debug, Clone)]
pub struct NewRecording {
    /// ISO-8601 local time of the upload
    pub date: String,
    pub filename: String,
    /// Seconds, 0 when the duration could not be determined
    pub length: f64,
    pub transcription: String,
}

/// One sensor sample as posted by the browser
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovementInput {
    pub timestamp: i64,
    pub lat: f64,
    pub lon: f64,
    pub gx: f64,
    pub gy: f64,
    pub gz: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MovementSample {
    pub id: i64,
    pub timestamp: i64,
    pub lat: f64,
    pub lon: f64,
    pub gx: f64,
    pub gy: f64,
    pub gz: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Purchase {
    pub id: i64,
    pub timestamp: String,
    pub apples: i64,
    pub bananas: i64,
    pub name: String,
    pub address: String,
    pub email: String,
    pub total_eur: f64,
    pub total_btc: f64,
    pub tx_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub timestamp: String,
    pub apples: i64,
    pub bananas: i64,
    pub name: String,
    pub address: String,
    pub email: String,
    pub total_eur: f64,
    pub total_btc: f64,
    pub tx_hash: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LogRecord {
    pub id: i64,
    pub timestamp: String,
    pub level: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLogRecord {
    pub timestamp: String,
    pub level: String,
    pub message: String,
}
