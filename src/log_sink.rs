//! Mirror of application log records into the logs database.
//!
//! Records at INFO or above are pushed onto a bounded queue and written by a
//! background thread in batches. When the queue is full the oldest record is
//! dropped so a slow database never blocks a request. Write failures are
//! swallowed; the console output from env_logger is unaffected.

use chrono::Local;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::db::{self, Storage};
use crate::models::NewLogRecord;

/// Largest number of records written over one connection
const FLUSH_BATCH: usize = 256;

/// Targets never mirrored: the driver would log its own inserts
const SKIPPED_TARGETS: &[&str] = &["sqlx", "personal_portal::log_sink"];

/// Bounded queue that drops the oldest record on overflow
pub struct LogQueue {
    tx: Sender<NewLogRecord>,
    rx: Receiver<NewLogRecord>,
    dropped: AtomicU64,
}

impl LogQueue {
    pub fn new(capacity: usize) -> Arc<Self> {
        let (tx, rx) = bounded(capacity.max(1));
        Arc::new(Self {
            tx,
            rx,
            dropped: AtomicU64::new(0),
        })
    }

    /// Enqueue without blocking
    pub fn push(&self, mut record: NewLogRecord) {
        loop {
            match self.tx.try_send(record) {
                Ok(()) => return,
                Err(TrySendError::Full(rejected)) => {
                    if self.rx.try_recv().is_ok() {
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                    }
                    record = rejected;
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }

    /// Take up to `max` queued records
    pub fn drain(&self, max: usize) -> Vec<NewLogRecord> {
        self.rx.try_iter().take(max).collect()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Records discarded because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Block until at least one record is queued or the timeout elapses
    fn wait(&self, timeout: Duration) -> Option<NewLogRecord> {
        match self.rx.recv_timeout(timeout) {
            Ok(record) => Some(record),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Write everything currently queued; returns the number of records taken
///
/// A failed batch is discarded.
pub async fn flush(queue: &LogQueue, storage: &Storage) -> usize {
    flush_from(queue, storage, Vec::new()).await
}

async fn flush_from(queue: &LogQueue, storage: &Storage, mut batch: Vec<NewLogRecord>) -> usize {
    let mut taken = 0;
    loop {
        batch.extend(queue.drain(FLUSH_BATCH.saturating_sub(batch.len())));
        if batch.is_empty() {
            return taken;
        }
        taken += batch.len();
        let _ = db::save_log_records(storage, &batch).await;
        batch.clear();
    }
}

/// Start the background writer thread
pub fn spawn_flusher(queue: Arc<LogQueue>, storage: Storage) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                eprintln!("[LogSink] Failed to create runtime, database logging disabled: {}", e);
                return;
            }
        };
        loop {
            let Some(first) = queue.wait(Duration::from_secs(1)) else {
                continue;
            };
            rt.block_on(flush_from(&queue, &storage, vec![first]));
        }
    })
}

/// Logger that prints through env_logger and queues records for the database
pub struct StoreLogger {
    inner: env_logger::Logger,
    queue: Arc<LogQueue>,
}

impl StoreLogger {
    pub fn new(inner: env_logger::Logger, queue: Arc<LogQueue>) -> Self {
        Self { inner, queue }
    }

    /// Level filter covering both the console filter and mirrored records
    pub fn max_level(&self) -> LevelFilter {
        self.inner.filter().max(LevelFilter::Info)
    }

    fn mirrors(record: &Record) -> bool {
        record.level() <= Level::Info
            && !SKIPPED_TARGETS
                .iter()
                .any(|skipped| record.target().starts_with(skipped))
    }
}

impl Log for StoreLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.inner.enabled(metadata) || metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if self.inner.matches(record) {
            self.inner.log(record);
        }
        if Self::mirrors(record) {
            self.queue.push(NewLogRecord {
                timestamp: Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
                level: record.level().to_string(),
                message: record.args().to_string(),
            });
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Install the global logger and start its database writer
///
/// Console output follows `RUST_LOG` (default `info`).
pub fn install(storage: Storage, capacity: usize) -> Result<Arc<LogQueue>, SetLoggerError> {
    let inner = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .build();
    let queue = LogQueue::new(capacity);
    let logger = StoreLogger::new(inner, Arc::clone(&queue));
    let max_level = logger.max_level();

    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(max_level);
    spawn_flusher(Arc::clone(&queue), storage);
    Ok(queue)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(message: &str) -> NewLogRecord {
        NewLogRecord {
            timestamp: "2024-01-01T00:00:00.000000".to_string(),
            level: "INFO".to_string(),
            message: message.to_string(),
        }
    }

    fn quiet_logger(queue: Arc<LogQueue>) -> StoreLogger {
        let inner = env_logger::Builder::new()
            .filter_level(LevelFilter::Off)
            .build();
        StoreLogger::new(inner, queue)
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let queue = LogQueue::new(3);
        for i in 0..5 {
            queue.push(record(&format!("m{}", i)));
        }

        let kept: Vec<_> = queue.drain(10).into_iter().map(|r| r.message).collect();
        assert_eq!(kept, vec!["m2", "m3", "m4"]);
        assert_eq!(queue.dropped(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_zero_capacity_still_holds_one() {
        let queue = LogQueue::new(0);
        queue.push(record("a"));
        queue.push(record("b"));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain(10)[0].message, "b");
    }

    #[test]
    fn test_only_info_and_above_are_mirrored() {
        let queue = LogQueue::new(16);
        let logger = quiet_logger(Arc::clone(&queue));

        for level in [Level::Error, Level::Warn, Level::Info, Level::Debug, Level::Trace] {
            logger.log(
                &Record::builder()
                    .level(level)
                    .target("personal_portal::serve")
                    .args(format_args!("at {}", level))
                    .build(),
            );
        }

        let levels: Vec<_> = queue.drain(16).into_iter().map(|r| r.level).collect();
        assert_eq!(levels, vec!["ERROR", "WARN", "INFO"]);
    }

    #[test]
    fn test_driver_records_are_not_mirrored() {
        let queue = LogQueue::new(16);
        let logger = quiet_logger(Arc::clone(&queue));

        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("sqlx::query")
                .args(format_args!("INSERT INTO logs"))
                .build(),
        );
        assert!(queue.is_empty());
        assert_eq!(logger.max_level(), LevelFilter::Info);
    }

    #[tokio::test]
    async fn test_flush_writes_rows() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::embedded(dir.path());
        let queue = LogQueue::new(16);
        queue.push(record("first"));
        queue.push(record("second"));

        assert_eq!(flush(&queue, &storage).await, 2);
        assert_eq!(flush(&queue, &storage).await, 0);

        let rows = db::list_logs(&storage, 10).await.unwrap();
        let messages: Vec<_> = rows.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
    }
}
