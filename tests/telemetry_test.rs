//! # Telemetry Tests
//!
//! Movement batches through the HTTP surface and idempotent table creation
//! on a fresh embedded store.

mod common;

use common::start_portal;
use personal_portal::db;
use personal_portal::models::MovementInput;
use personal_portal::Storage;
use reqwest::StatusCode;
use serde_json::{json, Value};

fn sample(i: i64) -> MovementInput {
    MovementInput {
        timestamp: 1_700_000_000_000 + i * 1000,
        lat: 52.37 + i as f64 * 0.001,
        lon: 4.89 - i as f64 * 0.001,
        gx: i as f64 * 0.5,
        gy: -(i as f64),
        gz: 9.81,
    }
}

fn to_json(sample: &MovementInput) -> Value {
    json!({
        "timestamp": sample.timestamp,
        "lat": sample.lat,
        "lon": sample.lon,
        "gx": sample.gx,
        "gy": sample.gy,
        "gz": sample.gz,
    })
}

#[tokio::test]
async fn test_movement_batch_reads_back_newest_first() {
    let portal = start_portal().await;
    let cookie = portal.login().await;
    let samples: Vec<MovementInput> = (0..5).map(sample).collect();

    let response = portal
        .client
        .post(portal.at("/record_movement"))
        .header(reqwest::header::COOKIE, &cookie)
        .json(&json!({ "data": samples.iter().map(to_json).collect::<Vec<_>>() }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let response = portal
        .client
        .get(portal.at("/get_movement"))
        .header(reqwest::header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let records = body["records"].as_array().unwrap();
    assert_eq!(records.len(), 5);

    for (record, expected) in records.iter().zip(samples.iter().rev()) {
        assert_eq!(record["timestamp"].as_i64().unwrap(), expected.timestamp);
        assert_eq!(record["lat"].as_f64().unwrap(), expected.lat);
        assert_eq!(record["lon"].as_f64().unwrap(), expected.lon);
        assert_eq!(record["gx"].as_f64().unwrap(), expected.gx);
        assert_eq!(record["gy"].as_f64().unwrap(), expected.gy);
        assert_eq!(record["gz"].as_f64().unwrap(), expected.gz);
    }
}

#[tokio::test]
async fn test_empty_batch_is_accepted() {
    let portal = start_portal().await;
    let cookie = portal.login().await;

    let response = portal
        .client
        .post(portal.at("/record_movement"))
        .header(reqwest::header::COOKIE, &cookie)
        .json(&json!({ "data": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(db::list_movement(&portal.storage).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_batch_is_rejected() {
    let portal = start_portal().await;
    let cookie = portal.login().await;

    let response = portal
        .client
        .post(portal.at("/record_movement"))
        .header(reqwest::header::COOKIE, &cookie)
        .json(&json!({ "data": [{ "timestamp": "soon" }] }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());
    assert!(db::list_movement(&portal.storage).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_batches_accumulate_across_requests() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::embedded(dir.path());

    let first: Vec<_> = (0..3).map(sample).collect();
    let second: Vec<_> = (3..5).map(sample).collect();
    assert_eq!(db::save_movement_batch(&storage, &first).await.unwrap(), 3);
    assert_eq!(db::save_movement_batch(&storage, &second).await.unwrap(), 2);

    let rows = db::list_movement(&storage).await.unwrap();
    let timestamps: Vec<i64> = rows.iter().map(|r| r.timestamp).collect();
    let expected: Vec<i64> = (0..5).rev().map(|i| sample(i).timestamp).collect();
    assert_eq!(timestamps, expected);
}

#[tokio::test]
async fn test_table_creation_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::embedded(dir.path().join("fresh"));

    for _ in 0..2 {
        let mut conn = storage.connection_for("recordings").await.unwrap();
        db::ensure_recordings_table(&mut conn).await.unwrap();
        db::ensure_movement_table(&mut conn).await.unwrap();
        db::ensure_purchases_table(&mut conn).await.unwrap();
        conn.close().await.unwrap();

        let mut conn = storage.connection_for("logs").await.unwrap();
        db::ensure_logs_table(&mut conn).await.unwrap();
        conn.close().await.unwrap();
    }

    assert!(dir.path().join("fresh").join("recordings.sqlite").exists());
    assert!(dir.path().join("fresh").join("logs.sqlite").exists());
}
