//! # Log Sink Tests
//!
//! Installs the global logger once for this test binary and checks that
//! records reach the logs database through the background writer.

use log::{debug, info, warn};
use personal_portal::db;
use personal_portal::log_sink;
use personal_portal::Storage;
use std::time::Duration;

#[tokio::test]
async fn test_records_are_flushed_in_background() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::embedded(dir.path());
    log_sink::install(storage.clone(), 64).unwrap();

    info!("sink test info");
    warn!("sink test warn");
    debug!("sink test debug");

    let mut messages = Vec::new();
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let rows = db::list_logs(&storage, 10).await.unwrap();
        messages = rows.into_iter().map(|r| (r.level, r.message)).collect::<Vec<_>>();
        if messages.len() >= 2 {
            break;
        }
    }

    assert_eq!(
        messages,
        vec![
            ("WARN".to_string(), "sink test warn".to_string()),
            ("INFO".to_string(), "sink test info".to_string()),
        ]
    );
}
