//! Persistent storage for battery history.
//!
//! Uses SQLite with WAL mode so a running recorder and a one-shot
//! `batlog history` invocation can share the file. Within a process, a
//! single connection behind a mutex makes every append atomic with respect
//! to every scan.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use batlog_model::HistoryRecord;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const CURRENT_SCHEMA_VERSION: i32 = 2;
pub const DATABASE_NAME: &str = "history.db";

/// Errors that can occur during history storage operations
#[derive(Debug, thiserror::Error)]
pub enum HistoryStoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database schema version {found} is newer than supported version {supported}")]
    UnsupportedSchema { found: i32, supported: i32 },
}

pub type Result<T> = std::result::Result<T, HistoryStoreError>;

/// Append-only, time-ordered battery history backed by SQLite.
pub struct HistoryStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl HistoryStore {
    /// Open or create the history database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA busy_timeout=5000;",
        )?;

        Self::with_connection(conn, Some(path.to_path_buf()))
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, None)
    }

    fn with_connection(mut conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        initialize_schema(&mut conn)?;
        debug!(path = ?path, "History store opened");
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-statement leaves nothing half-written (SQLite rolls the
        // statement back), so the connection is still usable.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Persist a record and return its assigned id. The record's own `id`
    /// is ignored.
    pub fn append(&self, record: &HistoryRecord) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO battery_records (timestamp, percentage, cycle_count, voltage, temperature)
             VALUES (?, ?, ?, ?, ?)",
            params![
                record.timestamp.timestamp_millis(),
                record.percentage,
                record.cycle_count,
                record.voltage,
                record.temperature,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Every record, oldest first. Records sharing a timestamp keep their
    /// append order.
    pub fn list_all(&self) -> Result<Vec<HistoryRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare_cached(
            "SELECT id, timestamp, percentage, cycle_count, voltage, temperature
             FROM battery_records
             ORDER BY timestamp ASC, id ASC",
        )?;

        let records = stmt
            .query_map([], record_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Remove a record. Returns whether it existed; a missing id is not an
    /// error.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn()
            .execute("DELETE FROM battery_records WHERE id = ?", [id])?;
        Ok(deleted > 0)
    }

    /// Get the database file size in bytes (0 for in-memory stores)
    pub fn size_bytes(&self) -> Result<u64> {
        match &self.path {
            Some(path) => Ok(std::fs::metadata(path)?.len()),
            None => Ok(0),
        }
    }

    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let (record_count, oldest, newest): (i64, Option<i64>, Option<i64>) =
            self.conn().query_row(
                "SELECT COUNT(*), MIN(timestamp), MAX(timestamp) FROM battery_records",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;

        Ok(DatabaseStats {
            record_count: record_count as u64,
            oldest_record: oldest.and_then(DateTime::from_timestamp_millis),
            newest_record: newest.and_then(DateTime::from_timestamp_millis),
            size_bytes: self.size_bytes()?,
        })
    }

    #[cfg(test)]
    pub(crate) fn execute_batch_for_test(&self, sql: &str) -> Result<()> {
        self.conn().execute_batch(sql)?;
        Ok(())
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<HistoryRecord> {
    let millis: i64 = row.get(1)?;
    let timestamp = DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(1, millis))?;

    Ok(HistoryRecord {
        id: Some(row.get(0)?),
        timestamp,
        percentage: row.get(2)?,
        cycle_count: row.get(3)?,
        voltage: row.get(4)?,
        temperature: row.get(5)?,
    })
}

/// Initialize or migrate the database schema
fn initialize_schema(conn: &mut Connection) -> Result<()> {
    let version = get_schema_version(conn)?;

    if version > CURRENT_SCHEMA_VERSION {
        return Err(HistoryStoreError::UnsupportedSchema {
            found: version,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if version == 0 {
        create_initial_schema(conn)?;
    } else if version < CURRENT_SCHEMA_VERSION {
        run_migrations(conn, version)?;
    }

    Ok(())
}

/// Get the current schema version (0 if not initialized)
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()?
        .unwrap_or(0);

    Ok(version)
}

fn create_initial_schema(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;

    tx.execute_batch(
        r#"
        CREATE TABLE schema_version (
            version INTEGER NOT NULL
        );

        -- One row per successful sampling tick; timestamps in Unix millis
        CREATE TABLE battery_records (
            id INTEGER PRIMARY KEY,
            timestamp INTEGER NOT NULL,
            percentage INTEGER NOT NULL,
            cycle_count INTEGER NOT NULL DEFAULT 0,
            voltage REAL NOT NULL DEFAULT 0,
            temperature REAL NOT NULL DEFAULT 0
        );

        CREATE INDEX idx_battery_records_timestamp ON battery_records(timestamp);
        "#,
    )?;

    tx.execute(
        "INSERT INTO schema_version (version) VALUES (?)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    tx.commit()?;
    Ok(())
}

fn run_migrations(conn: &mut Connection, from_version: i32) -> Result<()> {
    let tx = conn.transaction()?;

    if from_version < 2 {
        // Version 1 stored the charge level as `current_charge`.
        tx.execute_batch(
            r#"
            ALTER TABLE battery_records RENAME COLUMN current_charge TO percentage;
            CREATE INDEX IF NOT EXISTS idx_battery_records_timestamp ON battery_records(timestamp);
            "#,
        )?;
    }

    tx.execute(
        "UPDATE schema_version SET version = ?",
        [CURRENT_SCHEMA_VERSION],
    )?;

    tx.commit()?;
    info!(from_version, to_version = CURRENT_SCHEMA_VERSION, "Migrated history schema");
    Ok(())
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub record_count: u64,
    pub oldest_record: Option<DateTime<Utc>>,
    pub newest_record: Option<DateTime<Utc>>,
    pub size_bytes: u64,
}

impl DatabaseStats {
    /// Format size as human-readable string
    pub fn size_formatted(&self) -> String {
        bytesize::ByteSize::b(self.size_bytes).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    use chrono::{Duration, TimeZone};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 11, 9, 0, 0).unwrap()
    }

    fn make_record(minutes: i64, percentage: u8) -> HistoryRecord {
        HistoryRecord {
            id: None,
            timestamp: base_time() + Duration::minutes(minutes),
            percentage,
            cycle_count: 100 + percentage as u32,
            voltage: percentage as f64 / 10.0,
            temperature: 20.0 + percentage as f64 / 4.0,
        }
    }

    #[test]
    fn test_append_assigns_ids() {
        let store = HistoryStore::open_in_memory().unwrap();
        let first = store.append(&make_record(0, 80)).unwrap();
        let second = store.append(&make_record(5, 79)).unwrap();

        assert_ne!(first, second);

        let records = store.list_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, Some(first));
        assert_eq!(records[1].id, Some(second));
    }

    #[test]
    fn test_list_all_is_ordered_by_timestamp() {
        let store = HistoryStore::open_in_memory().unwrap();
        store.append(&make_record(10, 3)).unwrap();
        store.append(&make_record(0, 1)).unwrap();
        store.append(&make_record(5, 2)).unwrap();
        store.append(&make_record(5, 4)).unwrap();

        let percentages: Vec<u8> = store
            .list_all()
            .unwrap()
            .iter()
            .map(|r| r.percentage)
            .collect();
        assert_eq!(percentages, vec![1, 2, 4, 3]);
    }

    #[test]
    fn test_record_fields_survive_storage() {
        let store = HistoryStore::open_in_memory().unwrap();
        let mut record = make_record(0, 55);
        record.timestamp += Duration::milliseconds(123);
        let id = store.append(&record).unwrap();

        let stored = store.list_all().unwrap().remove(0);
        record.id = Some(id);
        assert_eq!(stored, record);
    }

    #[test]
    fn test_delete_existing_record() {
        let store = HistoryStore::open_in_memory().unwrap();
        let keep = store.append(&make_record(0, 80)).unwrap();
        let remove = store.append(&make_record(1, 70)).unwrap();

        assert!(store.delete(remove).unwrap());

        let ids: Vec<_> = store.list_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![Some(keep)]);
    }

    #[test]
    fn test_delete_missing_record_is_noop() {
        let store = HistoryStore::open_in_memory().unwrap();
        let id = store.append(&make_record(0, 80)).unwrap();
        let before = store.list_all().unwrap();

        assert!(!store.delete(id + 1000).unwrap());
        assert_eq!(store.list_all().unwrap(), before);

        assert!(store.delete(id).unwrap());
        assert!(!store.delete(id).unwrap());

        assert_eq!(before.len(), 1);
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_stats() {
        let store = HistoryStore::open_in_memory().unwrap();
        let empty = store.get_stats().unwrap();
        assert_eq!(empty.record_count, 0);
        assert_eq!(empty.oldest_record, None);
        assert_eq!(empty.size_bytes, 0);

        store.append(&make_record(30, 60)).unwrap();
        store.append(&make_record(0, 61)).unwrap();

        let stats = store.get_stats().unwrap();
        assert_eq!(stats.record_count, 2);
        assert_eq!(stats.oldest_record, Some(base_time()));
        assert_eq!(stats.newest_record, Some(base_time() + Duration::minutes(30)));
    }

    #[test]
    fn test_on_disk_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join(DATABASE_NAME);

        {
            let store = HistoryStore::open(&path).unwrap();
            store.append(&make_record(0, 42)).unwrap();
        }

        let store = HistoryStore::open(&path).unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
        assert_eq!(store.list_all().unwrap()[0].percentage, 42);
        assert!(store.get_stats().unwrap().size_bytes > 0);
    }

    #[test]
    fn test_migrates_legacy_charge_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DATABASE_NAME);

        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                r#"
                CREATE TABLE schema_version (version INTEGER NOT NULL);
                INSERT INTO schema_version (version) VALUES (1);
                CREATE TABLE battery_records (
                    id INTEGER PRIMARY KEY,
                    timestamp INTEGER NOT NULL,
                    current_charge INTEGER NOT NULL,
                    cycle_count INTEGER NOT NULL DEFAULT 0,
                    voltage REAL NOT NULL DEFAULT 0,
                    temperature REAL NOT NULL DEFAULT 0
                );
                INSERT INTO battery_records (timestamp, current_charge, cycle_count, voltage, temperature)
                VALUES (1762851600000, 88, 12, 12.5, 30.25),
                       (1762851900000, 86, 12, 12.4, 30.5);
                "#,
            )
            .unwrap();
        }

        let store = HistoryStore::open(&path).unwrap();
        let records = store.list_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].percentage, 88);
        assert_eq!(records[1].percentage, 86);
        assert_eq!(records[1].temperature, 30.5);

        store.append(&make_record(60, 70)).unwrap();
        drop(store);

        let reopened = HistoryStore::open(&path).unwrap();
        assert_eq!(reopened.list_all().unwrap().len(), 3);
    }

    #[test]
    fn test_rejects_newer_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DATABASE_NAME);
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE schema_version (version INTEGER NOT NULL);
                 INSERT INTO schema_version (version) VALUES (99);",
            )
            .unwrap();
        }

        assert!(matches!(
            HistoryStore::open(&path),
            Err(HistoryStoreError::UnsupportedSchema { found: 99, .. })
        ));
    }

    #[test]
    fn test_scan_never_sees_partial_records() {
        let store = Arc::new(HistoryStore::open_in_memory().unwrap());
        const APPENDS: i64 = 200;

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..APPENDS {
                    store.append(&make_record(i, (i % 101) as u8)).unwrap();
                }
            })
        };

        let mut last_len = 0;
        while last_len < APPENDS as usize {
            let records = store.list_all().unwrap();
            assert!(records.len() >= last_len);
            for record in &records {
                let pct = record.percentage;
                assert!(record.id.is_some());
                assert_eq!(record.cycle_count, 100 + pct as u32);
                assert_eq!(record.voltage, pct as f64 / 10.0);
                assert_eq!(record.temperature, 20.0 + pct as f64 / 4.0);
            }
            last_len = records.len();
        }

        writer.join().unwrap();
        assert_eq!(store.list_all().unwrap().len(), APPENDS as usize);
    }
}
