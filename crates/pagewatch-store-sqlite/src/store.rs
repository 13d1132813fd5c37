// crates/pagewatch-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Metrics Store
// Description: Durable MetricsStore backed by SQLite WAL.
// Purpose: Persist one JSON document per collection run, keyed by (pk, sk).
// Dependencies: pagewatch-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Each record is serialized to JSON and written with `INSERT OR REPLACE`,
//! giving the unconditional upsert the collection run requires: two runs
//! sharing a sort key overwrite rather than fail. Scans use keyset
//! pagination over the sort key so result ordering is independent of page
//! size.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use pagewatch_core::CollectError;
use pagewatch_core::METRICS_PARTITION;
use pagewatch_core::MetricsRecord;
use pagewatch_core::MetricsStore;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default number of records fetched per scan page.
const DEFAULT_SCAN_PAGE_SIZE: u32 = 100;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for the `SQLite` metrics store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqliteMetricsStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Records fetched per scan page.
    #[serde(default = "default_scan_page_size")]
    pub scan_page_size: u32,
}

impl SqliteMetricsStoreConfig {
    /// Creates a configuration with defaults for the given database path.
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            scan_page_size: DEFAULT_SCAN_PAGE_SIZE,
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default scan page size.
const fn default_scan_page_size() -> u32 {
    DEFAULT_SCAN_PAGE_SIZE
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` metrics store errors.
#[derive(Debug, Error)]
pub enum SqliteMetricsStoreError {
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored document failed to deserialize.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteMetricsStoreError> for CollectError {
    fn from(error: SqliteMetricsStoreError) -> Self {
        match error {
            SqliteMetricsStoreError::Db(message) => Self::StoreUnavailable(message),
            SqliteMetricsStoreError::Invalid(message) => Self::InvalidInput(message),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed metrics store with WAL support.
#[derive(Clone)]
pub struct SqliteMetricsStore {
    /// Store configuration.
    config: SqliteMetricsStoreConfig,
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteMetricsStore {
    /// Opens an `SQLite`-backed metrics store, creating the schema if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteMetricsStoreError`] when the database cannot be
    /// opened or initialized.
    pub fn new(config: SqliteMetricsStoreConfig) -> Result<Self, SqliteMetricsStoreError> {
        let connection = open_connection(&config)?;
        initialize_schema(&connection)?;
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Writes one record as an unconditional keyed upsert.
    fn put_record(&self, record: &MetricsRecord) -> Result<(), SqliteMetricsStoreError> {
        let document = serde_json::to_string(record)
            .map_err(|err| SqliteMetricsStoreError::Invalid(err.to_string()))?;
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteMetricsStoreError::Db("mutex poisoned".to_string()))?;
        guard
            .execute(
                "INSERT OR REPLACE INTO metrics_records (pk, sk, record_json) VALUES (?1, ?2, \
                 ?3)",
                params![record.pk, record.sk, document],
            )
            .map_err(|err| SqliteMetricsStoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Reads every record in ascending sort-key order via keyset pages.
    fn scan_records(&self) -> Result<Vec<MetricsRecord>, SqliteMetricsStoreError> {
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteMetricsStoreError::Db("mutex poisoned".to_string()))?;
        let mut statement = guard
            .prepare(
                "SELECT sk, record_json FROM metrics_records WHERE pk = ?1 AND sk > ?2 ORDER BY \
                 sk ASC LIMIT ?3",
            )
            .map_err(|err| SqliteMetricsStoreError::Db(err.to_string()))?;

        let mut records = Vec::new();
        let mut cursor = String::new();
        loop {
            let page: Vec<(String, String)> = statement
                .query_map(
                    params![METRICS_PARTITION, cursor, self.config.scan_page_size],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .map_err(|err| SqliteMetricsStoreError::Db(err.to_string()))?
                .collect::<Result<_, _>>()
                .map_err(|err| SqliteMetricsStoreError::Db(err.to_string()))?;

            let Some((last_key, _)) = page.last() else {
                break;
            };
            cursor = last_key.clone();
            for (_, document) in &page {
                let record: MetricsRecord = serde_json::from_str(document)
                    .map_err(|err| SqliteMetricsStoreError::Invalid(err.to_string()))?;
                records.push(record);
            }
        }
        Ok(records)
    }
}

impl MetricsStore for SqliteMetricsStore {
    fn put(&self, record: &MetricsRecord) -> Result<(), CollectError> {
        self.put_record(record).map_err(CollectError::from)
    }

    fn scan_all(&self) -> Result<Vec<MetricsRecord>, CollectError> {
        self.scan_records().map_err(CollectError::from)
    }
}

// ============================================================================
// SECTION: Connection Helpers
// ============================================================================

/// Opens the `SQLite` connection with durability pragmas applied.
fn open_connection(
    config: &SqliteMetricsStoreConfig,
) -> Result<Connection, SqliteMetricsStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteMetricsStoreError::Db(err.to_string()))?;
    connection
        .execute_batch("PRAGMA journal_mode = wal;")
        .map_err(|err| SqliteMetricsStoreError::Db(err.to_string()))?;
    connection
        .execute_batch("PRAGMA synchronous = full;")
        .map_err(|err| SqliteMetricsStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteMetricsStoreError::Db(err.to_string()))?;
    Ok(connection)
}

/// Creates the records table when absent.
fn initialize_schema(connection: &Connection) -> Result<(), SqliteMetricsStoreError> {
    connection
        .execute_batch(
            "CREATE TABLE IF NOT EXISTS metrics_records (
                pk TEXT NOT NULL,
                sk TEXT NOT NULL,
                record_json TEXT NOT NULL,
                PRIMARY KEY (pk, sk)
            );",
        )
        .map_err(|err| SqliteMetricsStoreError::Db(err.to_string()))?;
    Ok(())
}
