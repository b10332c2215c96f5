//! Append-only query log backed by SQLite.
//!
//! One row per lookup in `case_queries`. The payload JSON is written to both
//! `raw_response` and `parsed_data` so databases created by earlier
//! deployments keep the same layout; reads use `parsed_data`.
//!
//! Older rows carry SQLite's `YYYY-MM-DD HH:MM:SS` timestamps while new rows
//! are RFC 3339, so ordering goes through `julianday()` rather than text.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};

use crate::types::{CasePayload, CaseQuery, LookupError, LookupResult, QueryRecord, RecordId};

/// Durable log of lookups and the payloads returned for them.
pub trait RecordStore: Send + Sync {
    /// Append a record and return its id.
    fn append(&self, query: &CaseQuery, payload: &CasePayload) -> LookupResult<RecordId>;

    /// At most `limit` records, newest first.
    fn recent(&self, limit: usize) -> LookupResult<Vec<QueryRecord>>;

    /// Total number of records.
    fn count(&self) -> LookupResult<usize>;
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS case_queries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    case_type TEXT,
    case_number TEXT,
    filing_year TEXT,
    query_timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
    raw_response TEXT,
    parsed_data TEXT
);
CREATE INDEX IF NOT EXISTS idx_case_queries_timestamp ON case_queries (query_timestamp);";

/// SQLite record store. Writes are serialized through one connection.
pub struct SqliteRecordStore {
    db: Mutex<Connection>,
}

impl SqliteRecordStore {
    /// Open or create a store at `path`.
    pub fn open(path: &Path) -> LookupResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    LookupError::StoreUnavailable(format!("{}: {e}", parent.display()))
                })?;
            }
        }
        let db = Connection::open(path).map_err(|e| {
            LookupError::StoreUnavailable(format!("failed to open {}: {e}", path.display()))
        })?;
        Self::init(db)
    }

    /// A throwaway store, for tests and dry runs.
    pub fn in_memory() -> LookupResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(db: Connection) -> LookupResult<Self> {
        db.execute_batch(SCHEMA)?;
        Ok(Self { db: Mutex::new(db) })
    }

    fn conn(&self) -> LookupResult<MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|_| LookupError::StoreUnavailable("connection lock poisoned".to_string()))
    }
}

impl RecordStore for SqliteRecordStore {
    fn append(&self, query: &CaseQuery, payload: &CasePayload) -> LookupResult<RecordId> {
        let json = serde_json::to_string(payload)?;
        let timestamp = query.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true);

        let db = self.conn()?;
        db.execute(
            "INSERT INTO case_queries
                 (case_type, case_number, filing_year, query_timestamp, raw_response, parsed_data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                query.case_type,
                query.case_number,
                query.filing_year,
                timestamp,
                json
            ],
        )?;
        Ok(db.last_insert_rowid())
    }

    fn recent(&self, limit: usize) -> LookupResult<Vec<QueryRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let db = self.conn()?;
        let mut stmt = db.prepare(
            "SELECT id, case_type, case_number, filing_year, query_timestamp,
                    COALESCE(parsed_data, raw_response)
             FROM case_queries
             ORDER BY julianday(query_timestamp) DESC, query_timestamp DESC, id DESC
             LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(RawRow {
                    id: row.get(0)?,
                    case_type: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    case_number: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    filing_year: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    timestamp: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    payload: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawRow::into_record).collect()
    }

    fn count(&self) -> LookupResult<usize> {
        let n: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM case_queries", [], |row| row.get(0))?;
        Ok(usize::try_from(n).unwrap_or_default())
    }
}

struct RawRow {
    id: RecordId,
    case_type: String,
    case_number: String,
    filing_year: String,
    timestamp: String,
    payload: Option<String>,
}

impl RawRow {
    fn into_record(self) -> LookupResult<QueryRecord> {
        let payload_json = self.payload.ok_or_else(|| {
            LookupError::StoreUnavailable(format!("record {} has no payload", self.id))
        })?;
        let payload: CasePayload = serde_json::from_str(&payload_json)?;
        let timestamp = parse_timestamp(&self.timestamp).ok_or_else(|| {
            LookupError::StoreUnavailable(format!(
                "record {} has an unreadable timestamp '{}'",
                self.id, self.timestamp
            ))
        })?;

        Ok(QueryRecord {
            id: self.id,
            query: CaseQuery {
                case_type: self.case_type,
                case_number: self.case_number,
                filing_year: self.filing_year,
                timestamp,
            },
            payload,
        })
    }
}

/// RFC 3339, or SQLite's `CURRENT_TIMESTAMP` format for rows written by older deployments.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CaseOrder, Parties};
    use chrono::Duration;
    use tempfile::TempDir;

    fn query_at(number: &str, offset_secs: i64) -> CaseQuery {
        let mut q = CaseQuery::new("civil", number, "2024").unwrap();
        q.timestamp += Duration::seconds(offset_secs);
        q
    }

    fn sample_payload() -> CasePayload {
        CasePayload {
            parties: Parties {
                petitioner: Some("A".to_string()),
                respondent: None,
            },
            filing_date: Some("2024-02-02".to_string()),
            next_hearing: None,
            case_status: "Disposed".to_string(),
            orders: vec![CaseOrder {
                date: "2024-03-03".to_string(),
                title: "Judgment".to_string(),
                pdf_link: None,
            }],
        }
    }

    #[test]
    fn test_append_then_recent_round_trips() {
        let store = SqliteRecordStore::in_memory().unwrap();
        let q = query_at("123", 0);
        let id = store.append(&q, &sample_payload()).unwrap();

        let records = store.recent(1).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].query, q);
        assert_eq!(records[0].payload, sample_payload());
    }

    #[test]
    fn test_recent_is_bounded_and_newest_first() {
        let store = SqliteRecordStore::in_memory().unwrap();
        assert!(store.recent(10).unwrap().is_empty());

        // Inserted out of timestamp order on purpose.
        for (number, offset) in [("1", 10), ("2", 30), ("3", 20)] {
            store.append(&query_at(number, offset), &sample_payload()).unwrap();
        }

        let all = store.recent(10).unwrap();
        let numbers: Vec<&str> = all.iter().map(|r| r.query.case_number.as_str()).collect();
        assert_eq!(numbers, vec!["2", "3", "1"]);

        assert_eq!(store.recent(2).unwrap().len(), 2);
        assert!(store.recent(0).unwrap().is_empty());
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_ids_increase() {
        let store = SqliteRecordStore::in_memory().unwrap();
        let a = store.append(&query_at("1", 0), &sample_payload()).unwrap();
        let b = store.append(&query_at("2", 0), &sample_payload()).unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_reopen_file_keeps_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("court_data.db");
        {
            let store = SqliteRecordStore::open(&path).unwrap();
            store.append(&query_at("9", 0), &sample_payload()).unwrap();
        }
        let store = SqliteRecordStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.recent(1).unwrap()[0].query.case_number, "9");
    }

    #[test]
    fn test_reads_rows_with_sqlite_default_timestamp() {
        let store = SqliteRecordStore::in_memory().unwrap();
        store
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO case_queries (case_type, case_number, filing_year, raw_response, parsed_data)
                 VALUES ('civil', '7', '2023', ?1, ?1)",
                params![serde_json::to_string(&sample_payload()).unwrap()],
            )
            .unwrap();

        let records = store.recent(5).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].query.filing_year, "2023");
    }

    #[test]
    fn test_recent_orders_mixed_timestamp_formats_by_time() {
        let store = SqliteRecordStore::in_memory().unwrap();
        store
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO case_queries
                     (case_type, case_number, filing_year, query_timestamp, raw_response, parsed_data)
                 VALUES ('civil', 'legacy_late', '2024', '2024-07-15 23:00:00', ?1, ?1)",
                params![serde_json::to_string(&sample_payload()).unwrap()],
            )
            .unwrap();

        let mut early = CaseQuery::new("civil", "new_early", "2024").unwrap();
        early.timestamp = DateTime::parse_from_rfc3339("2024-07-15T01:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        store.append(&early, &sample_payload()).unwrap();

        let mut latest = CaseQuery::new("civil", "new_latest", "2024").unwrap();
        latest.timestamp = DateTime::parse_from_rfc3339("2024-07-16T00:00:00.5Z")
            .unwrap()
            .with_timezone(&Utc);
        store.append(&latest, &sample_payload()).unwrap();

        let numbers: Vec<String> = store
            .recent(10)
            .unwrap()
            .into_iter()
            .map(|r| r.query.case_number)
            .collect();
        assert_eq!(numbers, vec!["new_latest", "legacy_late", "new_early"]);
    }

    #[test]
    fn test_concurrent_appends() {
        let store = std::sync::Arc::new(SqliteRecordStore::in_memory().unwrap());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || {
                    store
                        .append(&query_at(&i.to_string(), 0), &sample_payload())
                        .unwrap()
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.count().unwrap(), 8);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-07-15T10:00:00.123456789Z").is_some());
        assert!(parse_timestamp("2024-07-15 10:00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
